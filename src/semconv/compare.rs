//! Attribute key sets and the set-difference comparator.

use serde::Serialize;
use std::collections::HashSet;

/// Set of attribute keys, iterated in first-insertion order.
///
/// Values never matter for compliance, so only keys are stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AttributeSet {
    keys: Vec<String>,
    #[serde(skip)]
    index: HashSet<String>,
}

impl AttributeSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from keys; duplicates collapse onto the first occurrence.
    pub fn from_keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = Self::new();
        for key in keys {
            set.insert(key.as_ref());
        }
        set
    }

    /// Insert a key. Returns false if it was already present.
    pub fn insert(&mut self, key: &str) -> bool {
        if self.index.contains(key) {
            return false;
        }
        self.index.insert(key.to_string());
        self.keys.push(key.to_string());
        true
    }

    /// Union `other` into this set, keeping this set's order first.
    pub fn extend_from(&mut self, other: &AttributeSet) {
        for key in other.iter() {
            self.insert(key);
        }
    }

    /// Check membership.
    pub fn contains(&self, key: &str) -> bool {
        self.index.contains(key)
    }

    /// Iterate keys in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl<S: AsRef<str>> FromIterator<S> for AttributeSet {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self::from_keys(iter)
    }
}

/// Outcome of comparing one entity against its required attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ComparisonResult {
    /// Required keys the entity did not carry.
    pub missing: Vec<String>,
    /// Keys the entity carried that nothing required.
    pub extra: Vec<String>,
}

impl ComparisonResult {
    /// True when nothing is missing and nothing is extra.
    pub fn is_empty(&self) -> bool {
        self.missing.is_empty() && self.extra.is_empty()
    }

    /// Append another result (used to collapse per-data-point checks).
    pub fn append(&mut self, mut other: ComparisonResult) {
        self.missing.append(&mut other.missing);
        self.extra.append(&mut other.extra);
    }
}

/// Compare required keys against observed keys.
///
/// `missing = required - observed`, `extra = observed - required`, both
/// with `ignore` removed. An absent observed set behaves as an empty one.
/// Output order follows `required` for `missing` and `observed` for `extra`.
pub fn compare(
    required: &AttributeSet,
    observed: Option<&AttributeSet>,
    ignore: &AttributeSet,
) -> ComparisonResult {
    let empty = AttributeSet::new();
    let observed = observed.unwrap_or(&empty);

    let missing = required
        .iter()
        .filter(|key| !observed.contains(key) && !ignore.contains(key))
        .map(str::to_string)
        .collect();
    let extra = observed
        .iter()
        .filter(|key| !required.contains(key) && !ignore.contains(key))
        .map(str::to_string)
        .collect();

    ComparisonResult { missing, extra }
}

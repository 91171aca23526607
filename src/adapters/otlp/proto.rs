//! Protobuf encoding for OTLP metrics types.
//!
//! Manual `prost::Message` implementations for the subset of
//! `opentelemetry.proto.collector.metrics.v1` and
//! `opentelemetry.proto.metrics.v1` the checker reads, without proto codegen.
//! Metric shapes the checker does not inspect (histograms, exponential
//! histograms, summaries) are carried as opaque encoded bytes so they
//! survive decode and re-encode untouched.

use prost::{DecodeError, Message};

// ============================================================================
// AnyValue / KeyValue
// ============================================================================

/// Value variants of `opentelemetry.proto.common.v1.AnyValue`.
#[derive(Clone, Debug, PartialEq)]
pub enum AnyValueKind {
    String(String),    // field 1
    Bool(bool),        // field 2
    Int(i64),          // field 3
    Double(f64),       // field 4
    Array(Vec<u8>),    // field 5 (opaque ArrayValue)
    KvList(Vec<u8>),   // field 6 (opaque KeyValueList)
    Bytes(Vec<u8>),    // field 7
}

/// Wire-format AnyValue.
#[derive(Clone, Default, Debug, PartialEq)]
pub struct AnyValue {
    pub value: Option<AnyValueKind>,
}

impl Message for AnyValue {
    fn encode_raw(&self, buf: &mut impl prost::bytes::BufMut)
    where
        Self: Sized,
    {
        match &self.value {
            Some(AnyValueKind::String(v)) => prost::encoding::string::encode(1, v, buf),
            Some(AnyValueKind::Bool(v)) => prost::encoding::bool::encode(2, v, buf),
            Some(AnyValueKind::Int(v)) => prost::encoding::int64::encode(3, v, buf),
            Some(AnyValueKind::Double(v)) => prost::encoding::double::encode(4, v, buf),
            Some(AnyValueKind::Array(v)) => prost::encoding::bytes::encode(5, v, buf),
            Some(AnyValueKind::KvList(v)) => prost::encoding::bytes::encode(6, v, buf),
            Some(AnyValueKind::Bytes(v)) => prost::encoding::bytes::encode(7, v, buf),
            None => {}
        }
    }

    fn merge_field(
        &mut self,
        tag: u32,
        wire_type: prost::encoding::WireType,
        buf: &mut impl prost::bytes::Buf,
        ctx: prost::encoding::DecodeContext,
    ) -> Result<(), DecodeError>
    where
        Self: Sized,
    {
        match tag {
            1 => {
                let mut v = String::new();
                prost::encoding::string::merge(wire_type, &mut v, buf, ctx)?;
                self.value = Some(AnyValueKind::String(v));
                Ok(())
            }
            2 => {
                let mut v = false;
                prost::encoding::bool::merge(wire_type, &mut v, buf, ctx)?;
                self.value = Some(AnyValueKind::Bool(v));
                Ok(())
            }
            3 => {
                let mut v = 0i64;
                prost::encoding::int64::merge(wire_type, &mut v, buf, ctx)?;
                self.value = Some(AnyValueKind::Int(v));
                Ok(())
            }
            4 => {
                let mut v = 0f64;
                prost::encoding::double::merge(wire_type, &mut v, buf, ctx)?;
                self.value = Some(AnyValueKind::Double(v));
                Ok(())
            }
            5 | 6 | 7 => {
                let mut v = Vec::new();
                prost::encoding::bytes::merge(wire_type, &mut v, buf, ctx)?;
                self.value = Some(match tag {
                    5 => AnyValueKind::Array(v),
                    6 => AnyValueKind::KvList(v),
                    _ => AnyValueKind::Bytes(v),
                });
                Ok(())
            }
            _ => prost::encoding::skip_field(wire_type, tag, buf, ctx),
        }
    }

    fn encoded_len(&self) -> usize {
        match &self.value {
            Some(AnyValueKind::String(v)) => prost::encoding::string::encoded_len(1, v),
            Some(AnyValueKind::Bool(v)) => prost::encoding::bool::encoded_len(2, v),
            Some(AnyValueKind::Int(v)) => prost::encoding::int64::encoded_len(3, v),
            Some(AnyValueKind::Double(v)) => prost::encoding::double::encoded_len(4, v),
            Some(AnyValueKind::Array(v)) => prost::encoding::bytes::encoded_len(5, v),
            Some(AnyValueKind::KvList(v)) => prost::encoding::bytes::encoded_len(6, v),
            Some(AnyValueKind::Bytes(v)) => prost::encoding::bytes::encoded_len(7, v),
            None => 0,
        }
    }

    fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Wire-format KeyValue matching `opentelemetry.proto.common.v1.KeyValue`.
#[derive(Clone, Default, Debug, PartialEq)]
pub struct KeyValue {
    pub key: String,             // field 1
    pub value: Option<AnyValue>, // field 2
}

impl KeyValue {
    /// Attribute with a string value.
    pub fn string(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: Some(AnyValue {
                value: Some(AnyValueKind::String(value.into())),
            }),
        }
    }

    /// Attribute with an integer value.
    pub fn int(key: impl Into<String>, value: i64) -> Self {
        Self {
            key: key.into(),
            value: Some(AnyValue {
                value: Some(AnyValueKind::Int(value)),
            }),
        }
    }
}

impl Message for KeyValue {
    fn encode_raw(&self, buf: &mut impl prost::bytes::BufMut)
    where
        Self: Sized,
    {
        if !self.key.is_empty() {
            prost::encoding::string::encode(1, &self.key, buf);
        }
        if let Some(ref value) = self.value {
            prost::encoding::message::encode(2, value, buf);
        }
    }

    fn merge_field(
        &mut self,
        tag: u32,
        wire_type: prost::encoding::WireType,
        buf: &mut impl prost::bytes::Buf,
        ctx: prost::encoding::DecodeContext,
    ) -> Result<(), DecodeError>
    where
        Self: Sized,
    {
        match tag {
            1 => prost::encoding::string::merge(wire_type, &mut self.key, buf, ctx),
            2 => {
                let mut value = self.value.take().unwrap_or_default();
                prost::encoding::message::merge(wire_type, &mut value, buf, ctx)?;
                self.value = Some(value);
                Ok(())
            }
            _ => prost::encoding::skip_field(wire_type, tag, buf, ctx),
        }
    }

    fn encoded_len(&self) -> usize {
        let mut len = 0;
        if !self.key.is_empty() {
            len += prost::encoding::string::encoded_len(1, &self.key);
        }
        if let Some(ref value) = self.value {
            len += prost::encoding::message::encoded_len(2, value);
        }
        len
    }

    fn clear(&mut self) {
        *self = Self::default();
    }
}

// ============================================================================
// Resource / InstrumentationScope
// ============================================================================

/// Wire-format Resource matching `opentelemetry.proto.resource.v1.Resource`.
#[derive(Clone, Default, Debug, PartialEq)]
pub struct Resource {
    pub attributes: Vec<KeyValue>,     // field 1
    pub dropped_attributes_count: u32, // field 2
}

impl Message for Resource {
    fn encode_raw(&self, buf: &mut impl prost::bytes::BufMut)
    where
        Self: Sized,
    {
        for attr in &self.attributes {
            prost::encoding::message::encode(1, attr, buf);
        }
        if self.dropped_attributes_count != 0 {
            prost::encoding::uint32::encode(2, &self.dropped_attributes_count, buf);
        }
    }

    fn merge_field(
        &mut self,
        tag: u32,
        wire_type: prost::encoding::WireType,
        buf: &mut impl prost::bytes::Buf,
        ctx: prost::encoding::DecodeContext,
    ) -> Result<(), DecodeError>
    where
        Self: Sized,
    {
        match tag {
            1 => prost::encoding::message::merge_repeated(wire_type, &mut self.attributes, buf, ctx),
            2 => prost::encoding::uint32::merge(
                wire_type,
                &mut self.dropped_attributes_count,
                buf,
                ctx,
            ),
            _ => prost::encoding::skip_field(wire_type, tag, buf, ctx),
        }
    }

    fn encoded_len(&self) -> usize {
        let mut len = prost::encoding::message::encoded_len_repeated(1, &self.attributes);
        if self.dropped_attributes_count != 0 {
            len += prost::encoding::uint32::encoded_len(2, &self.dropped_attributes_count);
        }
        len
    }

    fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Wire-format InstrumentationScope.
#[derive(Clone, Default, Debug, PartialEq)]
pub struct InstrumentationScope {
    pub name: String,                  // field 1
    pub version: String,               // field 2
    pub attributes: Vec<KeyValue>,     // field 3
    pub dropped_attributes_count: u32, // field 4
}

impl Message for InstrumentationScope {
    fn encode_raw(&self, buf: &mut impl prost::bytes::BufMut)
    where
        Self: Sized,
    {
        if !self.name.is_empty() {
            prost::encoding::string::encode(1, &self.name, buf);
        }
        if !self.version.is_empty() {
            prost::encoding::string::encode(2, &self.version, buf);
        }
        for attr in &self.attributes {
            prost::encoding::message::encode(3, attr, buf);
        }
        if self.dropped_attributes_count != 0 {
            prost::encoding::uint32::encode(4, &self.dropped_attributes_count, buf);
        }
    }

    fn merge_field(
        &mut self,
        tag: u32,
        wire_type: prost::encoding::WireType,
        buf: &mut impl prost::bytes::Buf,
        ctx: prost::encoding::DecodeContext,
    ) -> Result<(), DecodeError>
    where
        Self: Sized,
    {
        match tag {
            1 => prost::encoding::string::merge(wire_type, &mut self.name, buf, ctx),
            2 => prost::encoding::string::merge(wire_type, &mut self.version, buf, ctx),
            3 => prost::encoding::message::merge_repeated(wire_type, &mut self.attributes, buf, ctx),
            4 => prost::encoding::uint32::merge(
                wire_type,
                &mut self.dropped_attributes_count,
                buf,
                ctx,
            ),
            _ => prost::encoding::skip_field(wire_type, tag, buf, ctx),
        }
    }

    fn encoded_len(&self) -> usize {
        let mut len = 0;
        if !self.name.is_empty() {
            len += prost::encoding::string::encoded_len(1, &self.name);
        }
        if !self.version.is_empty() {
            len += prost::encoding::string::encoded_len(2, &self.version);
        }
        len += prost::encoding::message::encoded_len_repeated(3, &self.attributes);
        if self.dropped_attributes_count != 0 {
            len += prost::encoding::uint32::encoded_len(4, &self.dropped_attributes_count);
        }
        len
    }

    fn clear(&mut self) {
        *self = Self::default();
    }
}

// ============================================================================
// NumberDataPoint / Gauge / Sum
// ============================================================================

/// Numeric value of a data point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum NumberValue {
    Double(f64), // field 4
    Int(i64),    // field 6 (sfixed64)
}

/// Wire-format NumberDataPoint.
#[derive(Clone, Default, Debug, PartialEq)]
pub struct NumberDataPoint {
    pub attributes: Vec<KeyValue>,  // field 7
    pub start_time_unix_nano: u64,  // field 2 (fixed64)
    pub time_unix_nano: u64,        // field 3 (fixed64)
    pub value: Option<NumberValue>, // fields 4 / 6
    pub flags: u32,                 // field 8
}

impl NumberDataPoint {
    /// Data point carrying only attributes.
    pub fn with_attributes(attributes: Vec<KeyValue>) -> Self {
        Self {
            attributes,
            ..Default::default()
        }
    }
}

impl Message for NumberDataPoint {
    fn encode_raw(&self, buf: &mut impl prost::bytes::BufMut)
    where
        Self: Sized,
    {
        if self.start_time_unix_nano != 0 {
            prost::encoding::fixed64::encode(2, &self.start_time_unix_nano, buf);
        }
        if self.time_unix_nano != 0 {
            prost::encoding::fixed64::encode(3, &self.time_unix_nano, buf);
        }
        match &self.value {
            Some(NumberValue::Double(v)) => prost::encoding::double::encode(4, v, buf),
            Some(NumberValue::Int(v)) => prost::encoding::sfixed64::encode(6, v, buf),
            None => {}
        }
        for attr in &self.attributes {
            prost::encoding::message::encode(7, attr, buf);
        }
        if self.flags != 0 {
            prost::encoding::uint32::encode(8, &self.flags, buf);
        }
    }

    fn merge_field(
        &mut self,
        tag: u32,
        wire_type: prost::encoding::WireType,
        buf: &mut impl prost::bytes::Buf,
        ctx: prost::encoding::DecodeContext,
    ) -> Result<(), DecodeError>
    where
        Self: Sized,
    {
        match tag {
            2 => prost::encoding::fixed64::merge(wire_type, &mut self.start_time_unix_nano, buf, ctx),
            3 => prost::encoding::fixed64::merge(wire_type, &mut self.time_unix_nano, buf, ctx),
            4 => {
                let mut v = 0f64;
                prost::encoding::double::merge(wire_type, &mut v, buf, ctx)?;
                self.value = Some(NumberValue::Double(v));
                Ok(())
            }
            6 => {
                let mut v = 0i64;
                prost::encoding::sfixed64::merge(wire_type, &mut v, buf, ctx)?;
                self.value = Some(NumberValue::Int(v));
                Ok(())
            }
            7 => prost::encoding::message::merge_repeated(wire_type, &mut self.attributes, buf, ctx),
            8 => prost::encoding::uint32::merge(wire_type, &mut self.flags, buf, ctx),
            _ => prost::encoding::skip_field(wire_type, tag, buf, ctx),
        }
    }

    fn encoded_len(&self) -> usize {
        let mut len = 0;
        if self.start_time_unix_nano != 0 {
            len += prost::encoding::fixed64::encoded_len(2, &self.start_time_unix_nano);
        }
        if self.time_unix_nano != 0 {
            len += prost::encoding::fixed64::encoded_len(3, &self.time_unix_nano);
        }
        match &self.value {
            Some(NumberValue::Double(v)) => len += prost::encoding::double::encoded_len(4, v),
            Some(NumberValue::Int(v)) => len += prost::encoding::sfixed64::encoded_len(6, v),
            None => {}
        }
        len += prost::encoding::message::encoded_len_repeated(7, &self.attributes);
        if self.flags != 0 {
            len += prost::encoding::uint32::encoded_len(8, &self.flags);
        }
        len
    }

    fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Wire-format Gauge.
#[derive(Clone, Default, Debug, PartialEq)]
pub struct Gauge {
    pub data_points: Vec<NumberDataPoint>, // field 1
}

impl Message for Gauge {
    fn encode_raw(&self, buf: &mut impl prost::bytes::BufMut)
    where
        Self: Sized,
    {
        for point in &self.data_points {
            prost::encoding::message::encode(1, point, buf);
        }
    }

    fn merge_field(
        &mut self,
        tag: u32,
        wire_type: prost::encoding::WireType,
        buf: &mut impl prost::bytes::Buf,
        ctx: prost::encoding::DecodeContext,
    ) -> Result<(), DecodeError>
    where
        Self: Sized,
    {
        match tag {
            1 => prost::encoding::message::merge_repeated(wire_type, &mut self.data_points, buf, ctx),
            _ => prost::encoding::skip_field(wire_type, tag, buf, ctx),
        }
    }

    fn encoded_len(&self) -> usize {
        prost::encoding::message::encoded_len_repeated(1, &self.data_points)
    }

    fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Wire-format Sum.
#[derive(Clone, Default, Debug, PartialEq)]
pub struct Sum {
    pub data_points: Vec<NumberDataPoint>, // field 1
    pub aggregation_temporality: i32,      // field 2 (enum)
    pub is_monotonic: bool,                // field 3
}

impl Message for Sum {
    fn encode_raw(&self, buf: &mut impl prost::bytes::BufMut)
    where
        Self: Sized,
    {
        for point in &self.data_points {
            prost::encoding::message::encode(1, point, buf);
        }
        if self.aggregation_temporality != 0 {
            prost::encoding::int32::encode(2, &self.aggregation_temporality, buf);
        }
        if self.is_monotonic {
            prost::encoding::bool::encode(3, &self.is_monotonic, buf);
        }
    }

    fn merge_field(
        &mut self,
        tag: u32,
        wire_type: prost::encoding::WireType,
        buf: &mut impl prost::bytes::Buf,
        ctx: prost::encoding::DecodeContext,
    ) -> Result<(), DecodeError>
    where
        Self: Sized,
    {
        match tag {
            1 => prost::encoding::message::merge_repeated(wire_type, &mut self.data_points, buf, ctx),
            2 => prost::encoding::int32::merge(
                wire_type,
                &mut self.aggregation_temporality,
                buf,
                ctx,
            ),
            3 => prost::encoding::bool::merge(wire_type, &mut self.is_monotonic, buf, ctx),
            _ => prost::encoding::skip_field(wire_type, tag, buf, ctx),
        }
    }

    fn encoded_len(&self) -> usize {
        let mut len = prost::encoding::message::encoded_len_repeated(1, &self.data_points);
        if self.aggregation_temporality != 0 {
            len += prost::encoding::int32::encoded_len(2, &self.aggregation_temporality);
        }
        if self.is_monotonic {
            len += prost::encoding::bool::encoded_len(3, &self.is_monotonic);
        }
        len
    }

    fn clear(&mut self) {
        *self = Self::default();
    }
}

// ============================================================================
// Metric
// ============================================================================

/// The `data` oneof of a Metric.
#[derive(Clone, Debug, PartialEq)]
pub enum MetricData {
    Gauge(Gauge),                        // field 5
    Sum(Sum),                            // field 7
    Histogram(Vec<u8>),                  // field 9 (opaque)
    ExponentialHistogram(Vec<u8>),       // field 10 (opaque)
    Summary(Vec<u8>),                    // field 11 (opaque)
}

impl MetricData {
    /// Short name of the shape, used in log events.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Gauge(_) => "gauge",
            Self::Sum(_) => "sum",
            Self::Histogram(_) => "histogram",
            Self::ExponentialHistogram(_) => "exponential_histogram",
            Self::Summary(_) => "summary",
        }
    }
}

/// Wire-format Metric.
#[derive(Clone, Default, Debug, PartialEq)]
pub struct Metric {
    pub name: String,              // field 1
    pub description: String,       // field 2
    pub unit: String,              // field 3
    pub data: Option<MetricData>,  // fields 5, 7, 9, 10, 11
    pub metadata: Vec<KeyValue>,   // field 12
}

impl Metric {
    /// Gauge metric with the given points.
    pub fn gauge(name: impl Into<String>, data_points: Vec<NumberDataPoint>) -> Self {
        Self {
            name: name.into(),
            data: Some(MetricData::Gauge(Gauge { data_points })),
            ..Default::default()
        }
    }

    /// Cumulative monotonic sum metric with the given points.
    pub fn sum(name: impl Into<String>, data_points: Vec<NumberDataPoint>) -> Self {
        Self {
            name: name.into(),
            data: Some(MetricData::Sum(Sum {
                data_points,
                aggregation_temporality: 2,
                is_monotonic: true,
            })),
            ..Default::default()
        }
    }
}

impl Message for Metric {
    fn encode_raw(&self, buf: &mut impl prost::bytes::BufMut)
    where
        Self: Sized,
    {
        if !self.name.is_empty() {
            prost::encoding::string::encode(1, &self.name, buf);
        }
        if !self.description.is_empty() {
            prost::encoding::string::encode(2, &self.description, buf);
        }
        if !self.unit.is_empty() {
            prost::encoding::string::encode(3, &self.unit, buf);
        }
        match &self.data {
            Some(MetricData::Gauge(g)) => prost::encoding::message::encode(5, g, buf),
            Some(MetricData::Sum(s)) => prost::encoding::message::encode(7, s, buf),
            Some(MetricData::Histogram(raw)) => prost::encoding::bytes::encode(9, raw, buf),
            Some(MetricData::ExponentialHistogram(raw)) => {
                prost::encoding::bytes::encode(10, raw, buf)
            }
            Some(MetricData::Summary(raw)) => prost::encoding::bytes::encode(11, raw, buf),
            None => {}
        }
        for kv in &self.metadata {
            prost::encoding::message::encode(12, kv, buf);
        }
    }

    fn merge_field(
        &mut self,
        tag: u32,
        wire_type: prost::encoding::WireType,
        buf: &mut impl prost::bytes::Buf,
        ctx: prost::encoding::DecodeContext,
    ) -> Result<(), DecodeError>
    where
        Self: Sized,
    {
        match tag {
            1 => prost::encoding::string::merge(wire_type, &mut self.name, buf, ctx),
            2 => prost::encoding::string::merge(wire_type, &mut self.description, buf, ctx),
            3 => prost::encoding::string::merge(wire_type, &mut self.unit, buf, ctx),
            5 => {
                let mut gauge = match self.data.take() {
                    Some(MetricData::Gauge(g)) => g,
                    _ => Gauge::default(),
                };
                prost::encoding::message::merge(wire_type, &mut gauge, buf, ctx)?;
                self.data = Some(MetricData::Gauge(gauge));
                Ok(())
            }
            7 => {
                let mut sum = match self.data.take() {
                    Some(MetricData::Sum(s)) => s,
                    _ => Sum::default(),
                };
                prost::encoding::message::merge(wire_type, &mut sum, buf, ctx)?;
                self.data = Some(MetricData::Sum(sum));
                Ok(())
            }
            9 | 10 | 11 => {
                let mut raw = Vec::new();
                prost::encoding::bytes::merge(wire_type, &mut raw, buf, ctx)?;
                self.data = Some(match tag {
                    9 => MetricData::Histogram(raw),
                    10 => MetricData::ExponentialHistogram(raw),
                    _ => MetricData::Summary(raw),
                });
                Ok(())
            }
            12 => prost::encoding::message::merge_repeated(wire_type, &mut self.metadata, buf, ctx),
            _ => prost::encoding::skip_field(wire_type, tag, buf, ctx),
        }
    }

    fn encoded_len(&self) -> usize {
        let mut len = 0;
        if !self.name.is_empty() {
            len += prost::encoding::string::encoded_len(1, &self.name);
        }
        if !self.description.is_empty() {
            len += prost::encoding::string::encoded_len(2, &self.description);
        }
        if !self.unit.is_empty() {
            len += prost::encoding::string::encoded_len(3, &self.unit);
        }
        len += match &self.data {
            Some(MetricData::Gauge(g)) => prost::encoding::message::encoded_len(5, g),
            Some(MetricData::Sum(s)) => prost::encoding::message::encoded_len(7, s),
            Some(MetricData::Histogram(raw)) => prost::encoding::bytes::encoded_len(9, raw),
            Some(MetricData::ExponentialHistogram(raw)) => {
                prost::encoding::bytes::encoded_len(10, raw)
            }
            Some(MetricData::Summary(raw)) => prost::encoding::bytes::encoded_len(11, raw),
            None => 0,
        };
        len += prost::encoding::message::encoded_len_repeated(12, &self.metadata);
        len
    }

    fn clear(&mut self) {
        *self = Self::default();
    }
}

// ============================================================================
// ScopeMetrics / ResourceMetrics
// ============================================================================

/// Wire-format ScopeMetrics.
#[derive(Clone, Default, Debug, PartialEq)]
pub struct ScopeMetrics {
    pub scope: Option<InstrumentationScope>, // field 1
    pub metrics: Vec<Metric>,                // field 2
    pub schema_url: String,                  // field 3
}

impl Message for ScopeMetrics {
    fn encode_raw(&self, buf: &mut impl prost::bytes::BufMut)
    where
        Self: Sized,
    {
        if let Some(ref scope) = self.scope {
            prost::encoding::message::encode(1, scope, buf);
        }
        for metric in &self.metrics {
            prost::encoding::message::encode(2, metric, buf);
        }
        if !self.schema_url.is_empty() {
            prost::encoding::string::encode(3, &self.schema_url, buf);
        }
    }

    fn merge_field(
        &mut self,
        tag: u32,
        wire_type: prost::encoding::WireType,
        buf: &mut impl prost::bytes::Buf,
        ctx: prost::encoding::DecodeContext,
    ) -> Result<(), DecodeError>
    where
        Self: Sized,
    {
        match tag {
            1 => {
                let mut scope = self.scope.take().unwrap_or_default();
                prost::encoding::message::merge(wire_type, &mut scope, buf, ctx)?;
                self.scope = Some(scope);
                Ok(())
            }
            2 => prost::encoding::message::merge_repeated(wire_type, &mut self.metrics, buf, ctx),
            3 => prost::encoding::string::merge(wire_type, &mut self.schema_url, buf, ctx),
            _ => prost::encoding::skip_field(wire_type, tag, buf, ctx),
        }
    }

    fn encoded_len(&self) -> usize {
        let mut len = 0;
        if let Some(ref scope) = self.scope {
            len += prost::encoding::message::encoded_len(1, scope);
        }
        len += prost::encoding::message::encoded_len_repeated(2, &self.metrics);
        if !self.schema_url.is_empty() {
            len += prost::encoding::string::encoded_len(3, &self.schema_url);
        }
        len
    }

    fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Wire-format ResourceMetrics.
#[derive(Clone, Default, Debug, PartialEq)]
pub struct ResourceMetrics {
    pub resource: Option<Resource>,        // field 1
    pub scope_metrics: Vec<ScopeMetrics>,  // field 2
    pub schema_url: String,                // field 3
}

impl Message for ResourceMetrics {
    fn encode_raw(&self, buf: &mut impl prost::bytes::BufMut)
    where
        Self: Sized,
    {
        if let Some(ref resource) = self.resource {
            prost::encoding::message::encode(1, resource, buf);
        }
        for scope in &self.scope_metrics {
            prost::encoding::message::encode(2, scope, buf);
        }
        if !self.schema_url.is_empty() {
            prost::encoding::string::encode(3, &self.schema_url, buf);
        }
    }

    fn merge_field(
        &mut self,
        tag: u32,
        wire_type: prost::encoding::WireType,
        buf: &mut impl prost::bytes::Buf,
        ctx: prost::encoding::DecodeContext,
    ) -> Result<(), DecodeError>
    where
        Self: Sized,
    {
        match tag {
            1 => {
                let mut resource = self.resource.take().unwrap_or_default();
                prost::encoding::message::merge(wire_type, &mut resource, buf, ctx)?;
                self.resource = Some(resource);
                Ok(())
            }
            2 => prost::encoding::message::merge_repeated(
                wire_type,
                &mut self.scope_metrics,
                buf,
                ctx,
            ),
            3 => prost::encoding::string::merge(wire_type, &mut self.schema_url, buf, ctx),
            _ => prost::encoding::skip_field(wire_type, tag, buf, ctx),
        }
    }

    fn encoded_len(&self) -> usize {
        let mut len = 0;
        if let Some(ref resource) = self.resource {
            len += prost::encoding::message::encoded_len(1, resource);
        }
        len += prost::encoding::message::encoded_len_repeated(2, &self.scope_metrics);
        if !self.schema_url.is_empty() {
            len += prost::encoding::string::encoded_len(3, &self.schema_url);
        }
        len
    }

    fn clear(&mut self) {
        *self = Self::default();
    }
}

// ============================================================================
// Export request / response
// ============================================================================

/// Wire-format ExportMetricsServiceRequest.
#[derive(Clone, Default, Debug, PartialEq)]
pub struct ExportMetricsServiceRequest {
    pub resource_metrics: Vec<ResourceMetrics>, // field 1
}

impl Message for ExportMetricsServiceRequest {
    fn encode_raw(&self, buf: &mut impl prost::bytes::BufMut)
    where
        Self: Sized,
    {
        for rm in &self.resource_metrics {
            prost::encoding::message::encode(1, rm, buf);
        }
    }

    fn merge_field(
        &mut self,
        tag: u32,
        wire_type: prost::encoding::WireType,
        buf: &mut impl prost::bytes::Buf,
        ctx: prost::encoding::DecodeContext,
    ) -> Result<(), DecodeError>
    where
        Self: Sized,
    {
        match tag {
            1 => prost::encoding::message::merge_repeated(
                wire_type,
                &mut self.resource_metrics,
                buf,
                ctx,
            ),
            _ => prost::encoding::skip_field(wire_type, tag, buf, ctx),
        }
    }

    fn encoded_len(&self) -> usize {
        prost::encoding::message::encoded_len_repeated(1, &self.resource_metrics)
    }

    fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Wire-format ExportMetricsPartialSuccess.
#[derive(Clone, Default, Debug, PartialEq)]
pub struct ExportMetricsPartialSuccess {
    pub rejected_data_points: i64, // field 1
    pub error_message: String,     // field 2
}

impl Message for ExportMetricsPartialSuccess {
    fn encode_raw(&self, buf: &mut impl prost::bytes::BufMut)
    where
        Self: Sized,
    {
        if self.rejected_data_points != 0 {
            prost::encoding::int64::encode(1, &self.rejected_data_points, buf);
        }
        if !self.error_message.is_empty() {
            prost::encoding::string::encode(2, &self.error_message, buf);
        }
    }

    fn merge_field(
        &mut self,
        tag: u32,
        wire_type: prost::encoding::WireType,
        buf: &mut impl prost::bytes::Buf,
        ctx: prost::encoding::DecodeContext,
    ) -> Result<(), DecodeError>
    where
        Self: Sized,
    {
        match tag {
            1 => prost::encoding::int64::merge(wire_type, &mut self.rejected_data_points, buf, ctx),
            2 => prost::encoding::string::merge(wire_type, &mut self.error_message, buf, ctx),
            _ => prost::encoding::skip_field(wire_type, tag, buf, ctx),
        }
    }

    fn encoded_len(&self) -> usize {
        let mut len = 0;
        if self.rejected_data_points != 0 {
            len += prost::encoding::int64::encoded_len(1, &self.rejected_data_points);
        }
        if !self.error_message.is_empty() {
            len += prost::encoding::string::encoded_len(2, &self.error_message);
        }
        len
    }

    fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Wire-format ExportMetricsServiceResponse.
#[derive(Clone, Default, Debug, PartialEq)]
pub struct ExportMetricsServiceResponse {
    pub partial_success: Option<ExportMetricsPartialSuccess>, // field 1
}

impl Message for ExportMetricsServiceResponse {
    fn encode_raw(&self, buf: &mut impl prost::bytes::BufMut)
    where
        Self: Sized,
    {
        if let Some(ref partial) = self.partial_success {
            prost::encoding::message::encode(1, partial, buf);
        }
    }

    fn merge_field(
        &mut self,
        tag: u32,
        wire_type: prost::encoding::WireType,
        buf: &mut impl prost::bytes::Buf,
        ctx: prost::encoding::DecodeContext,
    ) -> Result<(), DecodeError>
    where
        Self: Sized,
    {
        match tag {
            1 => {
                let mut partial = self.partial_success.take().unwrap_or_default();
                prost::encoding::message::merge(wire_type, &mut partial, buf, ctx)?;
                self.partial_success = Some(partial);
                Ok(())
            }
            _ => prost::encoding::skip_field(wire_type, tag, buf, ctx),
        }
    }

    fn encoded_len(&self) -> usize {
        self.partial_success
            .as_ref()
            .map(|p| prost::encoding::message::encoded_len(1, p))
            .unwrap_or(0)
    }

    fn clear(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_request() -> ExportMetricsServiceRequest {
        ExportMetricsServiceRequest {
            resource_metrics: vec![ResourceMetrics {
                resource: Some(Resource {
                    attributes: vec![KeyValue::string("service.name", "checkout")],
                    dropped_attributes_count: 0,
                }),
                scope_metrics: vec![ScopeMetrics {
                    scope: Some(InstrumentationScope {
                        name: "io.opentelemetry.http".to_string(),
                        version: "1.0.0".to_string(),
                        ..Default::default()
                    }),
                    metrics: vec![
                        Metric::gauge(
                            "http.server.duration",
                            vec![NumberDataPoint {
                                attributes: vec![
                                    KeyValue::string("http.method", "GET"),
                                    KeyValue::int("http.status_code", 200),
                                ],
                                time_unix_nano: 1_700_000_000_000_000_000,
                                value: Some(NumberValue::Double(12.5)),
                                ..Default::default()
                            }],
                        ),
                        Metric::sum(
                            "http.server.requests",
                            vec![NumberDataPoint {
                                value: Some(NumberValue::Int(-3)),
                                ..Default::default()
                            }],
                        ),
                    ],
                    schema_url: "https://opentelemetry.io/schemas/1.24.0".to_string(),
                }],
                schema_url: "https://opentelemetry.io/schemas/1.24.0".to_string(),
            }],
        }
    }

    #[test]
    fn test_export_request_roundtrip() {
        let req = sample_request();
        let encoded = req.encode_to_vec();
        let decoded = ExportMetricsServiceRequest::decode(&encoded[..]).unwrap();
        assert_eq!(decoded, req);
    }

    #[test]
    fn test_opaque_histogram_survives() {
        let metric = Metric {
            name: "http.server.request.size".to_string(),
            data: Some(MetricData::Histogram(
                Gauge {
                    data_points: vec![NumberDataPoint::default()],
                }
                .encode_to_vec(),
            )),
            ..Default::default()
        };
        let decoded = Metric::decode(&metric.encode_to_vec()[..]).unwrap();
        assert_eq!(decoded.data.as_ref().map(MetricData::kind), Some("histogram"));
        assert_eq!(decoded, metric);
    }

    #[test]
    fn test_partial_success_response() {
        let resp = ExportMetricsServiceResponse {
            partial_success: Some(ExportMetricsPartialSuccess {
                rejected_data_points: 4,
                error_message: "missing attributes".to_string(),
            }),
        };
        let decoded =
            ExportMetricsServiceResponse::decode(&resp.encode_to_vec()[..]).unwrap();
        let partial = decoded.partial_success.unwrap();
        assert_eq!(partial.rejected_data_points, 4);
        assert_eq!(partial.error_message, "missing attributes");

        assert!(ExportMetricsServiceResponse::default()
            .encode_to_vec()
            .is_empty());
    }
}

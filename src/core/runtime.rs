//! Main runtime orchestration.
//!
//! The runtime coordinates component lifecycle:
//! - Start order: catalog → match table → export service → listener
//! - Shutdown order: listener → service
//!
//! Rule compilation happens in [`Runtime::new`], so a bad pattern or an
//! unknown group stops the process before any listener binds.

use crate::adapters::otlp::service::{MetricsService, VerdictSink};
use crate::core::config::Config;
use crate::engine::match_table::CompiledRules;
use crate::engine::traversal::Checker;
use crate::engine::verdict::Verdict;
use crate::ops::telemetry::{ExportStats, ExportStatsSnapshot};
use crate::semconv::catalog::{GroupCatalog, SchemaCatalog};
use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::{oneshot, watch};
#[cfg(feature = "grpc")]
use tokio::task::JoinHandle;

/// Component health status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentHealth {
    /// Component is starting.
    Starting,
    /// Component is healthy and operational.
    Healthy,
    /// Component has failed.
    Failed,
    /// Component has stopped.
    Stopped,
}

/// Health status aggregated from all components.
#[derive(Debug, Clone)]
pub struct RuntimeHealth {
    /// Compiled rules.
    pub rules: ComponentHealth,
    /// gRPC listener.
    pub listener: ComponentHealth,
}

impl Default for RuntimeHealth {
    fn default() -> Self {
        Self {
            rules: ComponentHealth::Starting,
            listener: ComponentHealth::Starting,
        }
    }
}

impl RuntimeHealth {
    /// Check if the runtime is ready to accept export calls.
    pub fn is_ready(&self) -> bool {
        self.rules == ComponentHealth::Healthy && self.listener == ComponentHealth::Healthy
    }
}

/// How [`Runtime::run`] ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Shut down by signal or listener exit.
    Stopped,
    /// One-shot mode received its verdict.
    OneShot(Verdict),
}

/// Checker runtime holding all component handles.
pub struct Runtime {
    /// Configuration.
    config: Arc<Config>,

    /// Export handler shared with the listener.
    service: MetricsService,

    /// Counters from the export handler.
    stats: Arc<ExportStats>,

    /// First verdict in one-shot mode.
    verdict_rx: Option<oneshot::Receiver<Verdict>>,

    /// Runtime health status.
    health: RuntimeHealth,

    /// Shutdown signal sender.
    shutdown_tx: watch::Sender<bool>,

    /// Shutdown signal receiver.
    shutdown_rx: watch::Receiver<bool>,

    /// gRPC server task handle.
    #[cfg(feature = "grpc")]
    grpc_handle: Option<JoinHandle<crate::core::error::CheckerResult<()>>>,
}

impl Runtime {
    /// Create a runtime, loading the catalog named by the configuration.
    pub fn new(config: Config) -> Result<Self> {
        let catalog = GroupCatalog::from_file(Path::new(&config.catalog.path))?;
        Self::with_catalog(config, &catalog)
    }

    /// Create a runtime over an already-loaded catalog.
    pub fn with_catalog(config: Config, catalog: &dyn SchemaCatalog) -> Result<Self> {
        config.validate().context("invalid configuration")?;

        let rules = CompiledRules::compile(&config, catalog).context("invalid match rules")?;
        tracing::info!(
            rules = rules.metrics.len(),
            expected_version = %rules.resource.expected_version,
            one_shot = config.server.one_shot,
            "match table compiled"
        );

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let mut service = MetricsService::new(Checker::new(rules)).with_shutdown(shutdown_rx.clone());
        let verdict_rx = if config.server.one_shot {
            let (sink, rx) = VerdictSink::channel();
            service = service.with_one_shot(sink);
            Some(rx)
        } else {
            None
        };

        let health = RuntimeHealth {
            rules: ComponentHealth::Healthy,
            ..Default::default()
        };

        Ok(Self {
            config: Arc::new(config),
            stats: service.stats(),
            service,
            verdict_rx,
            health,
            shutdown_tx,
            shutdown_rx,
            #[cfg(feature = "grpc")]
            grpc_handle: None,
        })
    }

    /// Get the configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Export handler used by the listener.
    pub fn service(&self) -> &MetricsService {
        &self.service
    }

    /// Get the current health status.
    pub fn health(&self) -> &RuntimeHealth {
        &self.health
    }

    /// Export counters so far.
    pub fn stats(&self) -> ExportStatsSnapshot {
        self.stats.snapshot()
    }

    /// Get a shutdown receiver for graceful shutdown coordination.
    pub fn shutdown_receiver(&self) -> watch::Receiver<bool> {
        self.shutdown_rx.clone()
    }

    /// Start the gRPC listener.
    pub async fn start(&mut self) -> Result<()> {
        #[cfg(feature = "grpc")]
        {
            use crate::adapters::otlp::grpc::MetricsGrpcServer;

            let bind_addr = self.config.bind_addr()?;
            let server =
                MetricsGrpcServer::new(bind_addr, self.service.clone(), self.shutdown_rx.clone())
                    .with_max_message_bytes(self.config.server.max_message_bytes);
            self.grpc_handle = Some(tokio::spawn(async move { server.run().await }));
            self.health.listener = ComponentHealth::Healthy;
            tracing::info!(bind = %bind_addr, "OTLP listener started");
            Ok(())
        }

        #[cfg(not(feature = "grpc"))]
        {
            self.health.listener = ComponentHealth::Failed;
            anyhow::bail!("built without the grpc feature; use `check` for offline validation")
        }
    }

    /// Trigger graceful shutdown.
    pub fn shutdown(&self) {
        tracing::info!("shutdown requested");
        let _ = self.shutdown_tx.send(true);
    }

    /// Run until shutdown, or until the one-shot verdict arrives.
    ///
    /// A listener that fails (for example on bind) is an error, not a stop.
    pub async fn run(&mut self) -> Result<RunOutcome> {
        self.start().await?;

        let verdict_rx = self.verdict_rx.take();
        let mut shutdown_rx = self.shutdown_rx.clone();
        let mut listener_exited = false;

        #[cfg(feature = "grpc")]
        let mut handle = self.grpc_handle.take();
        #[cfg(feature = "grpc")]
        let listener = async {
            match handle.as_mut() {
                Some(handle) => handle.await,
                None => std::future::pending().await,
            }
        };
        #[cfg(not(feature = "grpc"))]
        let listener = std::future::pending::<
            Result<crate::core::error::CheckerResult<()>, tokio::task::JoinError>,
        >();

        let outcome: Result<RunOutcome> = tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::warn!("shutdown signal received (SIGINT)");
                Ok(RunOutcome::Stopped)
            }
            _ = async {
                while !*shutdown_rx.borrow() {
                    if shutdown_rx.changed().await.is_err() {
                        break;
                    }
                }
            } => {
                tracing::info!("shutdown requested by component");
                Ok(RunOutcome::Stopped)
            }
            verdict = async {
                match verdict_rx {
                    Some(rx) => rx.await.ok(),
                    None => std::future::pending().await,
                }
            } => {
                match verdict {
                    Some(verdict) => {
                        tracing::info!(
                            violations = verdict.violation_count,
                            "one-shot verdict received"
                        );
                        Ok(RunOutcome::OneShot(verdict))
                    }
                    None => Ok(RunOutcome::Stopped),
                }
            }
            result = listener => {
                listener_exited = true;
                match result {
                    Ok(Ok(())) => {
                        tracing::info!("gRPC server stopped normally");
                        Ok(RunOutcome::Stopped)
                    }
                    Ok(Err(e)) => {
                        tracing::error!(error = %e, "gRPC server failed");
                        Err(anyhow::Error::new(e).context("OTLP listener failed"))
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "gRPC server task panicked");
                        Err(anyhow::Error::new(e).context("OTLP listener task failed"))
                    }
                }
            }
        };

        if listener_exited {
            self.health.listener = ComponentHealth::Failed;
        } else {
            // Still serving; stop() waits for in-flight calls to drain.
            #[cfg(feature = "grpc")]
            {
                self.grpc_handle = handle;
            }
        }

        self.stop().await;
        outcome
    }

    /// Signal shutdown and wait for the listener to drain.
    async fn stop(&mut self) {
        self.shutdown();

        #[cfg(feature = "grpc")]
        if let Some(handle) = self.grpc_handle.take() {
            if let Err(e) = handle.await {
                tracing::warn!(error = %e, "gRPC server task ended abnormally");
            }
        }

        if self.health.listener != ComponentHealth::Failed {
            self.health.listener = ComponentHealth::Stopped;
        }
        let stats = self.stats.snapshot();
        tracing::info!(
            exports = stats.exports,
            rejected = stats.rejected,
            violations = stats.violations,
            failed = stats.failed,
            "checker stopped"
        );
    }
}

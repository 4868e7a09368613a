use crate::{config::Config, playlist::SchedulerStatus};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;

/// Application state shared across all handlers
///
/// Handlers only see persisted files and the published scheduler status;
/// the engine itself stays private to the scheduler.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<Config>,
    /// Latest status published by the scheduler
    pub status: watch::Receiver<SchedulerStatus>,
    /// Prometheus handle, when a recorder is installed
    pub metrics: Option<PrometheusHandle>,
    /// Server start time for uptime tracking
    pub started_at: Instant,
}

impl AppState {
    /// Create a new AppState with the given configuration
    pub fn new(
        config: Config,
        status: watch::Receiver<SchedulerStatus>,
        metrics: Option<PrometheusHandle>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            status,
            metrics,
            started_at: Instant::now(),
        }
    }
}

use loopcast::{
    config::Config,
    playlist::{PlaylistEngine, Scheduler},
    server::{self, state::AppState},
};
use metrics_exporter_prometheus::PrometheusBuilder;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    // Setup logging
    tracing_subscriber::fmt::init();

    info!("Starting Loopcast - looping HLS origin with ad insertion");

    let metrics = match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => Some(handle),
        Err(e) => {
            warn!("Prometheus recorder unavailable, /metrics disabled: {}", e);
            None
        }
    };

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    let engine = match PlaylistEngine::bootstrap(&config).await {
        Ok(engine) => engine,
        Err(e) => {
            error!("Initialization failed: {}", e);
            std::process::exit(1);
        }
    };

    let (scheduler, status) = Scheduler::new(engine, config.tick_interval, config.startup_delay);
    if config.prime_window {
        scheduler.prime().await;
    }
    tokio::spawn(scheduler.run());

    // Start HTTP server
    if let Err(e) = server::start(AppState::new(config, status, metrics)).await {
        error!("Failed to start server: {}", e);
        std::process::exit(1);
    }
}

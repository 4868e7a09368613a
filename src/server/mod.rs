pub mod handlers;
pub mod path_validation;
pub mod state;

use axum::{Router, routing::get};
use state::AppState;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

/// Build the router serving persisted manifests and segment files
pub fn build_router(state: AppState) -> Router {
    // CORS layer: permissive in dev mode for testing with external players
    let cors = if state.config.is_dev {
        info!("CORS: Permissive mode (dev)");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        info!("CORS: Restrictive mode (prod)");
        CorsLayer::new()
    };

    // `{rendition}` doubles as the manifest file name on the single-segment route.
    // Content segments may sit in subdirectories of the rendition directory.
    let vod = Router::new()
        .route("/{rendition}", get(handlers::manifest::serve_manifest))
        .route(
            "/{rendition}/{*segment}",
            get(handlers::segment::serve_content_segment),
        )
        .route(
            "/ads/{rendition}/{segment}",
            get(handlers::segment::serve_ad_segment),
        );

    let prefix = state.config.uri_prefix.clone();
    let router = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/metrics", get(handlers::metrics::serve_metrics));

    let router = if prefix.is_empty() {
        router.merge(vod)
    } else {
        router.nest(&prefix, vod)
    };

    router.layer(cors).with_state(state)
}

/// Start the Axum HTTP server
pub async fn start(state: AppState) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("0.0.0.0:{}", state.config.port);
    let prefix = state.config.uri_prefix.clone();

    let app = build_router(state);

    // Bind TCP listener
    let listener = match tokio::net::TcpListener::bind(addr.as_str()).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind to address {}: {}", addr, e);
            return Err(e.into());
        }
    };

    info!("Server listening on http://{}", addr);
    info!("Master manifest: http://{}{}/master.m3u8", addr, prefix);

    // Start serving
    if let Err(e) = axum::serve(listener, app).await {
        error!("Server error: {}", e);
        return Err(e.into());
    }

    Ok(())
}

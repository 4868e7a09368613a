use crate::{
    error::{LoopcastError, Result},
    metrics,
    server::{handlers::read_served_file, path_validation, state::AppState},
};
use axum::{
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use std::time::Instant;
use tracing::debug;

/// Serve a persisted manifest (`master.m3u8` or `<rendition>.m3u8`)
///
/// Manifests are read back from the manifest directory, so a request always
/// sees the last fully written tick.
pub async fn serve_manifest(
    Path(file_name): Path<String>,
    State(state): State<AppState>,
) -> Result<Response> {
    let start = Instant::now();
    debug!("Serving manifest: {}", file_name);

    if !file_name.ends_with(".m3u8") {
        metrics::record_request("manifest", 404);
        return Err(LoopcastError::NotFound(file_name));
    }

    let path = path_validation::resolve(&state.config.manifest_dir, &[&file_name])?;
    let body = match read_served_file(&path).await {
        Ok(body) => body,
        Err(e) => {
            metrics::record_request("manifest", 404);
            return Err(e);
        }
    };

    metrics::record_request("manifest", 200);
    metrics::record_duration("manifest", start);

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/vnd.apple.mpegurl"),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        body,
    )
        .into_response())
}

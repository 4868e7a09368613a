use crate::{
    error::Result,
    metrics,
    server::{handlers::read_served_file, path_validation, state::AppState},
};
use axum::{
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use std::path::Path as FsPath;
use std::time::Instant;
use tracing::debug;

/// Serve a content segment from `<content_dir>/<rendition>/<segment>`
///
/// `segment` may span several path components, each validated on its own.
pub async fn serve_content_segment(
    Path((rendition, segment)): Path<(String, String)>,
    State(state): State<AppState>,
) -> Result<Response> {
    let mut components = vec![rendition.as_str()];
    components.extend(segment.split('/'));
    serve_file("segment", &state.config.content_dir, &components).await
}

/// Serve an ad segment from `<ad_dir>/<rendition>/<segment>`
pub async fn serve_ad_segment(
    Path((rendition, segment)): Path<(String, String)>,
    State(state): State<AppState>,
) -> Result<Response> {
    serve_file("ad_segment", &state.config.ad_dir, &[rendition.as_str(), segment.as_str()]).await
}

async fn serve_file(endpoint: &str, base: &FsPath, components: &[&str]) -> Result<Response> {
    let start = Instant::now();
    debug!("Serving {}: {}", endpoint, components.join("/"));

    let path = path_validation::resolve(base, components)?;
    let body = match read_served_file(&path).await {
        Ok(body) => body,
        Err(e) => {
            metrics::record_request(endpoint, 404);
            return Err(e);
        }
    };

    metrics::record_request(endpoint, 200);
    metrics::record_duration(endpoint, start);

    Ok((
        StatusCode::OK,
        [(
            header::CONTENT_TYPE,
            content_type_for(components.last().copied().unwrap_or_default()),
        )],
        body,
    )
        .into_response())
}

/// Content type by segment file extension
pub fn content_type_for(segment: &str) -> &'static str {
    match segment.rsplit_once('.').map(|(_, ext)| ext) {
        Some("ts") => "video/MP2T",
        Some("m4s") => "video/iso.segment",
        Some("mp4") => "video/mp4",
        Some("aac") => "audio/aac",
        _ => "application/octet-stream",
    }
}

use crate::{
    error::{LoopcastError, Result},
    server::state::AppState,
};
use axum::{
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};

/// Serve Prometheus metrics in text exposition format
///
/// Responds 404 when no recorder was installed at startup.
pub async fn serve_metrics(State(state): State<AppState>) -> Result<Response> {
    let handle = state
        .metrics
        .as_ref()
        .ok_or_else(|| LoopcastError::NotFound("metrics recorder not installed".to_string()))?;

    Ok((
        StatusCode::OK,
        [(
            header::CONTENT_TYPE,
            "text/plain; version=0.0.4; charset=utf-8",
        )],
        handle.render(),
    )
        .into_response())
}

use crate::server::state::AppState;
use axum::{Json, extract::State, response::IntoResponse};
use serde::Serialize;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub uptime_seconds: u64,
    pub ticks: u64,
    pub content_pointer: u64,
    pub in_ad_break: bool,
}

/// Health check endpoint returning structured JSON diagnostics
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let uptime = state.started_at.elapsed().as_secs();
    let status = state.status.borrow().clone();

    Json(HealthResponse {
        status: "ok",
        version: VERSION,
        uptime_seconds: uptime,
        ticks: status.ticks,
        content_pointer: status.content_pointer,
        in_ad_break: status.in_ad_break,
    })
}

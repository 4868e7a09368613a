use metrics::{counter, gauge, histogram};
use std::time::Instant;

// ── Metric names ────────────────────────────────────────────────────────

/// Total HTTP requests by endpoint and status
pub const REQUESTS_TOTAL: &str = "loopcast_requests_total";
/// Request duration in seconds
pub const REQUEST_DURATION: &str = "loopcast_request_duration_seconds";
/// Scheduler ticks completed
pub const TICKS_TOTAL: &str = "loopcast_ticks_total";
/// Current (unwrapped) content pointer
pub const CONTENT_POINTER: &str = "loopcast_content_pointer";
/// 1 while an ad break is running, 0 otherwise
pub const IN_AD_BREAK: &str = "loopcast_in_ad_break";
/// Ad breaks started
pub const AD_BREAKS_STARTED: &str = "loopcast_ad_breaks_started_total";
/// Ad segment ticks
pub const AD_SEGMENTS_INSERTED: &str = "loopcast_ad_segments_inserted_total";
/// Manifest writes by rendition and result (ok, error)
pub const MANIFEST_WRITES: &str = "loopcast_manifest_writes_total";

// ── Recording helpers ───────────────────────────────────────────────────

/// Record an incoming request
pub fn record_request(endpoint: &str, status: u16) {
    counter!(REQUESTS_TOTAL, "endpoint" => endpoint.to_string(), "status" => status.to_string())
        .increment(1);
}

/// Record request duration
pub fn record_duration(endpoint: &str, start: Instant) {
    let duration = start.elapsed().as_secs_f64();
    histogram!(REQUEST_DURATION, "endpoint" => endpoint.to_string()).record(duration);
}

/// Record a completed scheduler tick
pub fn record_tick(content_pointer: u64, in_ad_break: bool) {
    counter!(TICKS_TOTAL).increment(1);
    gauge!(CONTENT_POINTER).set(content_pointer as f64);
    gauge!(IN_AD_BREAK).set(if in_ad_break { 1.0 } else { 0.0 });
}

/// Record the start of an ad break
pub fn record_ad_break() {
    counter!(AD_BREAKS_STARTED).increment(1);
}

/// Record an ad segment tick
pub fn record_ad_segment() {
    counter!(AD_SEGMENTS_INSERTED).increment(1);
}

/// Record a manifest write attempt
pub fn record_manifest_write(rendition: &str, ok: bool) {
    let result = if ok { "ok" } else { "error" };
    counter!(MANIFEST_WRITES, "rendition" => rendition.to_string(), "result" => result)
        .increment(1);
}

//! Loopcast: looping pseudo-live HLS origin with cue-driven ad insertion
//!
//! Library interface for benchmarks and integration tests.
//! The binary entry point is in main.rs.

pub mod ad;
pub mod config;
pub mod error;
pub mod hls;
pub mod metrics;
pub mod playlist;
pub mod server;

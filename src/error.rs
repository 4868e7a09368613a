use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::path::PathBuf;
use thiserror::Error;

/// Domain-specific error types for Loopcast
#[derive(Error, Debug)]
pub enum LoopcastError {
    #[error("Failed to read source playlist {path}: {source}")]
    SourceUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse HLS playlist: {0}")]
    PlaylistParseError(String),

    #[error("Failed to serialize playlist: {0}")]
    PlaylistModifyError(String),

    #[error("Failed to persist manifest {path}: {source}")]
    ManifestWriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to convert data: {0}")]
    ConversionError(String),

    #[error("Invalid path component: {0}")]
    InvalidPath(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

// Implement IntoResponse for LoopcastError to handle HTTP responses
impl IntoResponse for LoopcastError {
    fn into_response(self) -> Response {
        let status = match self {
            LoopcastError::NotFound(ref e) => {
                tracing::warn!("Not found: {}", e);
                StatusCode::NOT_FOUND
            }
            LoopcastError::InvalidPath(ref e) => {
                tracing::warn!("Rejected path component: {}", e);
                StatusCode::BAD_REQUEST
            }
            LoopcastError::Io(ref e) => {
                tracing::error!("I/O error while serving: {}", e);
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ref other => {
                tracing::error!("Internal error: {}", other);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (status, self.to_string()).into_response()
    }
}

// Convenience type alias for Results
pub type Result<T> = std::result::Result<T, LoopcastError>;

pub mod health;
pub mod manifest;
pub mod metrics;
pub mod segment;

use crate::error::{LoopcastError, Result};
use std::io::ErrorKind;
use std::path::Path;

/// Read a file the facade serves, mapping a missing file to 404
pub(crate) async fn read_served_file(path: &Path) -> Result<Vec<u8>> {
    tokio::fs::read(path).await.map_err(|e| match e.kind() {
        ErrorKind::NotFound => LoopcastError::NotFound(path.display().to_string()),
        _ => LoopcastError::Io(e),
    })
}

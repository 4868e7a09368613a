use crate::error::LoopcastError;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Validate a single path component taken from a request URL.
///
/// Accepts plain file or directory names only, so a request can never
/// escape the directory it is resolved against.
///
/// # Errors
/// Returns [`LoopcastError::InvalidPath`] for:
/// - Empty components, `.` and `..`
/// - Components containing `/`, `\` or NUL
/// - Hidden names (leading `.`)
pub fn validate_component(component: &str) -> Result<&str, LoopcastError> {
    let rejected = component.is_empty()
        || component.starts_with('.')
        || component.contains(['/', '\\', '\0']);

    if rejected {
        warn!("Rejected path component {:?}", component);
        return Err(LoopcastError::InvalidPath(component.to_string()));
    }

    Ok(component)
}

/// Join validated components onto a base directory
pub fn resolve(base: &Path, components: &[&str]) -> Result<PathBuf, LoopcastError> {
    let mut path = base.to_path_buf();
    for component in components {
        path.push(validate_component(component)?);
    }
    Ok(path)
}

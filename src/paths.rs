//! Relative path validation shared by the asset finder and cache store

use crate::error::{ProximaError, ProximaResult};

/// Validate that a site-relative path is safe to join onto a root directory.
///
/// Rejects empty paths, absolute paths, `..` segments, empty segments and NUL bytes.
pub fn validate_relative(path: &str) -> ProximaResult<()> {
    if path.is_empty() {
        return Err(ProximaError::path_invalid(path, "path cannot be empty"));
    }
    if path.contains('\0') || path.contains('\\') {
        return Err(ProximaError::path_invalid(
            path,
            "must not contain NUL or backslash characters",
        ));
    }
    for segment in path.split('/') {
        match segment {
            "" => {
                return Err(ProximaError::path_invalid(
                    path,
                    "must be relative and contain no empty segments",
                ))
            }
            "." | ".." => {
                return Err(ProximaError::path_invalid(
                    path,
                    "must not contain '.' or '..' segments",
                ))
            }
            _ => {}
        }
    }
    Ok(())
}

//! Persistent cache for proxied assets
//!
//! Provides content-addressed caching keyed by proxy fingerprints.
//! Entries are never mutated in place: a different request produces a
//! different fingerprint, and so a different path.
//!
//! # Cache States
//!
//! | State | Description |
//! |-------|-------------|
//! | Miss | No file at the digest path, proxies will run |
//! | Hit | File present, served without running proxies |

pub mod fingerprint;
pub mod record;
pub mod store;

pub use fingerprint::{digest_path, fingerprint};
pub use record::CacheRecord;
pub use store::{CacheEntry, CacheStore};

use serde::Serialize;
use std::fmt;

/// How a resolution was satisfied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheState {
    /// Proxies ran and the result was persisted
    Miss,
    /// Served from an existing cache file
    Hit,
}

impl fmt::Display for CacheState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Miss => write!(f, "miss"),
            Self::Hit => write!(f, "hit"),
        }
    }
}

/// Format bytes as human-readable size (e.g., "1.5 MB")
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_display() {
        assert_eq!(CacheState::Hit.to_string(), "hit");
        assert_eq!(CacheState::Miss.to_string(), "miss");
    }

    #[test]
    fn format_bytes_units() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(1536), "1.5 KB");
        assert_eq!(format_bytes(5 * 1024 * 1024), "5.0 MB");
    }
}

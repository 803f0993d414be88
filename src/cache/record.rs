//! Side records stored next to cached files
//!
//! A record keeps what cannot be recovered from the cached bytes alone,
//! chiefly the content type after the proxy chain ran.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Metadata persisted for one cache entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheRecord {
    /// Fingerprint of the proxy request
    pub fingerprint: String,
    /// Canonical proxy description the fingerprint was computed from
    pub proxies: String,
    /// Logical path of the base asset
    pub base_logical_path: String,
    /// Content type after the proxy chain
    pub content_type: String,
    /// SHA256 of the cached bytes
    pub content_digest: String,
    /// When the entry was materialized
    pub created_at: DateTime<Utc>,
}

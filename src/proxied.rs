//! Proxied assets
//!
//! Binds one base asset and one proxy request to one cached output.
//!
//! # Resolution
//!
//! 1. Compute the fingerprint and digest path
//! 2. If a file exists at the digest path, serve it (hit)
//! 3. Otherwise run the proxy chain on a working copy staged in a scratch
//!    file beside the target (miss)
//! 4. Persist the side record, then the content; the content file is the
//!    commit point, so a failed chain leaves nothing behind
//!
//! The externally visible logical path *is* the digest path, so each
//! distinct request for each distinct asset gets its own file.

use crate::asset::{content_digest, Asset, WorkingAsset};
use crate::cache::{digest_path, fingerprint, CacheRecord, CacheState, CacheStore};
use crate::env::Env;
use crate::error::{ProximaError, ProximaResult};
use crate::proxy::ProxyChain;
use crate::tag::{ProxyArgs, TagArgs};
use chrono::Utc;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Fingerprint and cache location for a request, computed without running it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyKey {
    /// Hash of the proxy description
    pub fingerprint: String,
    /// Cache-relative path, also the logical path of the result
    pub digest_path: String,
}

impl ProxyKey {
    /// Key for `args` applied to the asset at `logical_path`
    pub fn new(logical_path: &str, args: &ProxyArgs) -> Self {
        let fingerprint = fingerprint(args);
        let digest_path = digest_path(logical_path, &fingerprint);
        Self {
            fingerprint,
            digest_path,
        }
    }
}

/// A resolved, cached proxy result
#[derive(Debug, Clone)]
pub struct ProxiedAsset {
    base_logical_path: String,
    key: ProxyKey,
    filename: PathBuf,
    source: Vec<u8>,
    content_type: String,
    content_digest: String,
    state: CacheState,
    store: CacheStore,
}

impl ProxiedAsset {
    /// Fingerprint and digest path for `args` on `asset`, without resolving
    pub fn probe(asset: &Asset, args: &TagArgs) -> ProxyKey {
        ProxyKey::new(&asset.logical_path, args.args())
    }

    /// Resolve `args` against `asset`, serving from cache when possible
    pub fn resolve(asset: &Asset, args: &TagArgs, env: &Env) -> ProximaResult<Self> {
        let key = Self::probe(asset, args);
        let store = env.store();
        let filename = store.path(&key.digest_path)?;

        if store.exists(&key.digest_path) {
            match Self::load(asset, &key, &filename, store)? {
                Some(hit) => return Ok(hit),
                None => debug!("Cache entry {} unusable, recomputing", key.digest_path),
            }
        }

        debug!(
            "Cache miss for {} with [{}]",
            asset.logical_path,
            args.args()
        );

        // Proxies see a scratch file; the digest path only ever holds results
        let scratch = store.scratch(&key.digest_path)?;
        let working = WorkingAsset::staged(asset, scratch.path().to_path_buf()).map_err(|e| {
            ProximaError::io(format!("staging {}", scratch.path().display()), e)
        })?;
        let (source, content_type) = ProxyChain::new(env.registry())
            .run(working, args)?
            .into_parts();
        drop(scratch);
        let content_digest = content_digest(&source);

        let record = CacheRecord {
            fingerprint: key.fingerprint.clone(),
            proxies: args.args().canonical(),
            base_logical_path: asset.logical_path.clone(),
            content_type: content_type.clone(),
            content_digest: content_digest.clone(),
            created_at: Utc::now(),
        };
        store.write_record(&key.digest_path, &record)?;
        store.write(&key.digest_path, &source)?;

        info!("Cached {} ({})", key.digest_path, content_type);

        Ok(Self {
            base_logical_path: asset.logical_path.clone(),
            key,
            filename,
            source,
            content_type,
            content_digest,
            state: CacheState::Miss,
            store: store.clone(),
        })
    }

    /// Load an existing entry; `None` means it vanished or no longer matches
    fn load(
        asset: &Asset,
        key: &ProxyKey,
        filename: &Path,
        store: &CacheStore,
    ) -> ProximaResult<Option<Self>> {
        let source = match store.read(&key.digest_path) {
            Ok(source) => source,
            Err(ProximaError::NotFound(_)) => return Ok(None),
            Err(e) => return Err(e),
        };
        let digest = content_digest(&source);

        let content_type = match store.read_record(&key.digest_path)? {
            Some(record) if record.content_digest != digest => {
                warn!(
                    "Cached file {} does not match its record, recomputing",
                    key.digest_path
                );
                return Ok(None);
            }
            Some(record) => record.content_type,
            None => {
                warn!(
                    "No record for {}, assuming content type {}",
                    key.digest_path, asset.content_type
                );
                asset.content_type.clone()
            }
        };

        debug!("Cache hit for {}", key.digest_path);

        Ok(Some(Self {
            base_logical_path: asset.logical_path.clone(),
            key: key.clone(),
            filename: filename.to_path_buf(),
            source,
            content_type,
            content_digest: digest,
            state: CacheState::Hit,
            store: store.clone(),
        }))
    }

    /// Content bytes of the resolved artifact
    pub fn source(&self) -> &[u8] {
        &self.source
    }

    /// Fingerprint of the proxy request (not of the bytes)
    pub fn digest(&self) -> &str {
        &self.key.fingerprint
    }

    /// Cache-relative path derived from the fingerprint
    pub fn digest_path(&self) -> &str {
        &self.key.digest_path
    }

    /// Externally visible path; always equal to [`Self::digest_path`]
    pub fn logical_path(&self) -> &str {
        &self.key.digest_path
    }

    /// Absolute path of the cached file
    pub fn filename(&self) -> &Path {
        &self.filename
    }

    /// Content type after the proxy chain
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// SHA256 of the cached bytes
    pub fn content_digest(&self) -> &str {
        &self.content_digest
    }

    /// Logical path of the base asset
    pub fn base_logical_path(&self) -> &str {
        &self.base_logical_path
    }

    /// Whether this resolution was served from cache
    pub fn state(&self) -> CacheState {
        self.state
    }

    /// Whether this resolution was served without running proxies
    pub fn was_hit(&self) -> bool {
        self.state == CacheState::Hit
    }

    /// Whether the cached file exists right now
    pub fn is_cached(&self) -> bool {
        self.store.exists(&self.key.digest_path)
    }

    /// Reference for rendered output, e.g. `/assets/ruby-<digest>.png`
    pub fn url(&self, prefix: &str) -> String {
        format!("{}/{}", prefix.trim_end_matches('/'), self.logical_path())
    }
}

//! Resolution environment
//!
//! Bundles the collaborators a resolution needs: where assets come from,
//! which proxies exist, and where results are cached. An `Env` is shared
//! read-only, so many resolutions can run against it at once.

use crate::asset::{Asset, AssetFinder};
use crate::cache::CacheStore;
use crate::config::Config;
use crate::error::ProximaResult;
use crate::proxied::{ProxiedAsset, ProxyKey};
use crate::proxy::{register_configured, ProxyRegistry};
use crate::tag::TagArgs;
use std::path::{Path, PathBuf};

/// Asset finder, proxy registry and cache store
#[derive(Debug, Clone)]
pub struct Env {
    finder: AssetFinder,
    registry: ProxyRegistry,
    store: CacheStore,
}

impl Env {
    /// Create an environment from its parts
    pub fn new(finder: AssetFinder, registry: ProxyRegistry, store: CacheStore) -> Self {
        Self {
            finder,
            registry,
            store,
        }
    }

    /// Build from configuration, resolving relative paths against `root`
    pub fn from_config(config: &Config, root: &Path) -> ProximaResult<Self> {
        let mut registry = ProxyRegistry::new();
        register_configured(&mut registry, &config.proxies)?;

        Ok(Self::new(
            AssetFinder::new(config.source_dirs(root)),
            registry,
            CacheStore::new(config.cache_dir(root)),
        ))
    }

    /// Find a source asset by name
    pub fn find_asset(&self, name: &str) -> ProximaResult<Asset> {
        self.finder.find_asset(name)
    }

    /// Absolute path of a cache-relative path
    pub fn in_cache_dir(&self, rel: &str) -> PathBuf {
        self.store.root().join(rel)
    }

    /// Parse a tag body, find its asset and resolve it
    pub fn resolve_tag(&self, tag: &str, body: &str) -> ProximaResult<ProxiedAsset> {
        let args = TagArgs::parse(tag, body)?;
        let asset = self.find_asset(&args.asset)?;
        ProxiedAsset::resolve(&asset, &args, self)
    }

    /// Compute the cache key for a tag body without running any proxy
    pub fn probe_tag(&self, tag: &str, body: &str) -> ProximaResult<(TagArgs, ProxyKey)> {
        let args = TagArgs::parse(tag, body)?;
        let asset = self.find_asset(&args.asset)?;
        let key = ProxiedAsset::probe(&asset, &args);
        Ok((args, key))
    }

    /// The proxy registry
    pub fn registry(&self) -> &ProxyRegistry {
        &self.registry
    }

    /// Mutable access for registering proxies at setup time
    pub fn registry_mut(&mut self) -> &mut ProxyRegistry {
        &mut self.registry
    }

    /// The cache store
    pub fn store(&self) -> &CacheStore {
        &self.store
    }

    /// The asset finder
    pub fn finder(&self) -> &AssetFinder {
        &self.finder
    }
}

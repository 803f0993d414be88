//! Proxy registry
//!
//! Maps `(group, name)` to a factory that builds a [`Transform`] for one
//! asset and one invocation. Populated at setup time, read-only while
//! resolving.

use crate::asset::WorkingAsset;
use crate::error::{ProximaError, ProximaResult, TransformError};
use crate::tag::TagArgs;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

/// A constructed proxy, ready to run once against the working asset
pub trait Transform {
    /// Consume the transform, returning the (possibly changed) asset
    fn process(self: Box<Self>, asset: WorkingAsset) -> Result<WorkingAsset, TransformError>;
}

impl<F> Transform for F
where
    F: FnOnce(WorkingAsset) -> Result<WorkingAsset, TransformError>,
{
    fn process(self: Box<Self>, asset: WorkingAsset) -> Result<WorkingAsset, TransformError> {
        (*self)(asset)
    }
}

/// Box a closure as a [`Transform`]
pub fn transform<F>(f: F) -> Box<dyn Transform>
where
    F: FnOnce(WorkingAsset) -> Result<WorkingAsset, TransformError> + 'static,
{
    Box::new(f)
}

/// Builds transforms for one registered proxy
pub trait ProxyFactory: Send + Sync {
    /// Construct a transform for `asset`.
    ///
    /// `opts` are the invocation's inline options, `args` the whole tag.
    /// Construction must not materialize output.
    fn construct(
        &self,
        asset: &WorkingAsset,
        opts: Option<&str>,
        args: &TagArgs,
    ) -> Result<Box<dyn Transform>, TransformError>;
}

/// Adapter turning a closure into a [`ProxyFactory`]
struct FnFactory<F>(F);

impl<F> ProxyFactory for FnFactory<F>
where
    F: Fn(&WorkingAsset, Option<&str>, &TagArgs) -> Result<Box<dyn Transform>, TransformError>
        + Send
        + Sync,
{
    fn construct(
        &self,
        asset: &WorkingAsset,
        opts: Option<&str>,
        args: &TagArgs,
    ) -> Result<Box<dyn Transform>, TransformError> {
        (self.0)(asset, opts, args)
    }
}

/// One registered proxy
#[derive(Clone)]
pub struct Registration {
    /// Proxy group
    pub group: String,
    /// Short name within the group
    pub name: String,
    /// Tags allowed to use this proxy (empty = all)
    pub tags: Vec<String>,
    factory: Arc<dyn ProxyFactory>,
}

impl Registration {
    /// Whether `tag` may invoke this proxy
    pub fn allows_tag(&self, tag: &str) -> bool {
        self.tags.is_empty() || self.tags.iter().any(|t| t == tag)
    }

    /// The factory building transforms for this proxy
    pub fn factory(&self) -> &dyn ProxyFactory {
        self.factory.as_ref()
    }
}

impl std::fmt::Debug for Registration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registration")
            .field("group", &self.group)
            .field("name", &self.name)
            .field("tags", &self.tags)
            .finish()
    }
}

/// Lookup table of proxies keyed by `(group, name)`
#[derive(Debug, Clone, Default)]
pub struct ProxyRegistry {
    entries: BTreeMap<(String, String), Registration>,
}

impl ProxyRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory under `group:name`
    pub fn register(
        &mut self,
        group: &str,
        name: &str,
        tags: &[&str],
        factory: impl ProxyFactory + 'static,
    ) -> ProximaResult<()> {
        let key = (group.to_string(), name.to_string());
        if self.entries.contains_key(&key) {
            return Err(ProximaError::ProxyExists {
                group: group.to_string(),
                name: name.to_string(),
            });
        }

        debug!("Registered proxy {}:{} (tags: {:?})", group, name, tags);
        self.entries.insert(
            key,
            Registration {
                group: group.to_string(),
                name: name.to_string(),
                tags: tags.iter().map(|t| t.to_string()).collect(),
                factory: Arc::new(factory),
            },
        );
        Ok(())
    }

    /// Register a closure factory under `group:name`
    pub fn register_fn<F>(
        &mut self,
        group: &str,
        name: &str,
        tags: &[&str],
        factory: F,
    ) -> ProximaResult<()>
    where
        F: Fn(&WorkingAsset, Option<&str>, &TagArgs) -> Result<Box<dyn Transform>, TransformError>
            + Send
            + Sync
            + 'static,
    {
        self.register(group, name, tags, FnFactory(factory))
    }

    /// Find the proxy `group:name` usable from `tag`
    pub fn lookup(&self, group: &str, name: &str, tag: &str) -> ProximaResult<&Registration> {
        self.entries
            .get(&(group.to_string(), name.to_string()))
            .filter(|r| r.allows_tag(tag))
            .ok_or_else(|| ProximaError::UnknownProxy {
                group: group.to_string(),
                name: name.to_string(),
                tag: tag.to_string(),
            })
    }

    /// All registrations, sorted by group then name
    pub fn iter(&self) -> impl Iterator<Item = &Registration> {
        self.entries.values()
    }

    /// Number of registered proxies
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no proxies are registered
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn passthrough(
        _asset: &WorkingAsset,
        _opts: Option<&str>,
        _args: &TagArgs,
    ) -> Result<Box<dyn Transform>, TransformError> {
        Ok(transform(Ok))
    }

    #[test]
    fn register_and_lookup() {
        let mut registry = ProxyRegistry::new();
        registry.register_fn("test", "hello", &["img"], passthrough).unwrap();

        let reg = registry.lookup("test", "hello", "img").unwrap();
        assert_eq!(reg.group, "test");
        assert_eq!(reg.name, "hello");
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn lookup_unknown_proxy() {
        let registry = ProxyRegistry::new();
        let err = registry.lookup("nope", "none", "img").unwrap_err();
        assert!(matches!(err, ProximaError::UnknownProxy { .. }));
    }

    #[test]
    fn lookup_respects_tags() {
        let mut registry = ProxyRegistry::new();
        registry.register_fn("test", "hello", &["img"], passthrough).unwrap();
        registry.register_fn("any", "thing", &[], passthrough).unwrap();

        assert!(registry.lookup("test", "hello", "css").is_err());
        assert!(registry.lookup("any", "thing", "css").is_ok());
    }

    #[test]
    fn duplicate_registration_errors() {
        let mut registry = ProxyRegistry::new();
        registry.register_fn("test", "hello", &[], passthrough).unwrap();
        let err = registry
            .register_fn("test", "hello", &[], passthrough)
            .unwrap_err();
        assert!(matches!(err, ProximaError::ProxyExists { .. }));
    }

    #[test]
    fn iter_is_sorted() {
        let mut registry = ProxyRegistry::new();
        registry.register_fn("b", "x", &[], passthrough).unwrap();
        registry.register_fn("a", "y", &[], passthrough).unwrap();
        let names: Vec<_> = registry.iter().map(|r| r.group.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
    }
}

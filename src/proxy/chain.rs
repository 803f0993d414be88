//! Proxy chain runner
//!
//! Runs each invocation in order. Invocation *n* is constructed from and
//! processes the output of invocation *n-1*. The runner never writes cache
//! entries, only a staged asset's scratch file; a failing step aborts the
//! whole chain and nothing is persisted.

use crate::asset::WorkingAsset;
use crate::error::{ProximaError, ProximaResult, ProxyStage};
use crate::proxy::registry::ProxyRegistry;
use crate::tag::TagArgs;
use tracing::debug;

/// Executes proxy invocations against a working asset
pub struct ProxyChain<'a> {
    registry: &'a ProxyRegistry,
}

impl<'a> ProxyChain<'a> {
    /// Create a runner resolving proxies from `registry`
    pub fn new(registry: &'a ProxyRegistry) -> Self {
        Self { registry }
    }

    /// Run every proxy in `args.proxies` against `asset`, in order
    pub fn run(&self, mut asset: WorkingAsset, args: &TagArgs) -> ProximaResult<WorkingAsset> {
        for invocation in args.args() {
            let registration = self
                .registry
                .lookup(invocation.group(), invocation.name(), &args.tag)?;

            let execution_error = |stage, source| ProximaError::ProxyExecution {
                group: invocation.group().to_string(),
                name: invocation.name().to_string(),
                stage,
                source,
            };

            debug!("Running proxy {} on {}", invocation, asset.logical_path());

            let transform = registration
                .factory()
                .construct(&asset, invocation.opts(), args)
                .map_err(|e| execution_error(ProxyStage::Construct, e))?;

            asset
                .flush()
                .map_err(|e| execution_error(ProxyStage::Process, e.into()))?;
            asset = transform
                .process(asset)
                .map_err(|e| execution_error(ProxyStage::Process, e))?;
            asset
                .reload()
                .map_err(|e| execution_error(ProxyStage::Process, e.into()))?;
        }

        Ok(asset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::Asset;
    use crate::error::TransformError;
    use crate::proxy::registry::{transform, Transform};
    use std::path::PathBuf;

    fn working() -> WorkingAsset {
        let asset = Asset::new("ruby.png", PathBuf::from("/src/ruby.png"), b"png".to_vec());
        WorkingAsset::from_asset(&asset, PathBuf::from("/cache/ruby-x.png"))
    }

    fn appender(
        _asset: &WorkingAsset,
        opts: Option<&str>,
        _args: &TagArgs,
    ) -> Result<Box<dyn Transform>, TransformError> {
        let suffix = opts.unwrap_or("").to_string();
        Ok(transform(move |mut asset: WorkingAsset| {
            let mut content = asset.content().to_vec();
            content.extend_from_slice(suffix.as_bytes());
            asset.set_content(content);
            Ok(asset)
        }))
    }

    fn registry() -> ProxyRegistry {
        let mut registry = ProxyRegistry::new();
        registry.register_fn("text", "append", &[], appender).unwrap();
        registry
            .register_fn("mime", "plain", &[], |_asset, _opts, _args| {
                Ok(transform(|mut asset: WorkingAsset| {
                    asset.set_content_type("text/plain");
                    Ok(asset)
                }))
            })
            .unwrap();
        registry
            .register_fn("fail", "construct", &[], |_asset, _opts, _args| {
                Err("no target".into())
            })
            .unwrap();
        registry
            .register_fn("fail", "process", &[], |_asset, _opts, _args| {
                Ok(transform(|_asset: WorkingAsset| Err("exploded".into())))
            })
            .unwrap();
        registry
    }

    #[test]
    fn runs_in_order_and_composes() {
        let registry = registry();
        let args = TagArgs::parse("img", "ruby.png text:append=A text:append=B").unwrap();
        let out = ProxyChain::new(&registry).run(working(), &args).unwrap();
        assert_eq!(out.content(), b"pngAB");

        let args = TagArgs::parse("img", "ruby.png text:append=B text:append=A").unwrap();
        let out = ProxyChain::new(&registry).run(working(), &args).unwrap();
        assert_eq!(out.content(), b"pngBA");
    }

    #[test]
    fn content_type_mutation_survives() {
        let registry = registry();
        let args = TagArgs::parse("img", "ruby.png mime:plain text:append=!").unwrap();
        let out = ProxyChain::new(&registry).run(working(), &args).unwrap();
        assert_eq!(out.content_type(), "text/plain");
    }

    #[test]
    fn empty_chain_is_identity() {
        let registry = registry();
        let args = TagArgs::parse("img", "ruby.png").unwrap();
        let out = ProxyChain::new(&registry).run(working(), &args).unwrap();
        assert_eq!(out, working());
    }

    #[test]
    fn unknown_proxy_aborts() {
        let registry = registry();
        let args = TagArgs::parse("img", "ruby.png text:append=A nope:nope").unwrap();
        let err = ProxyChain::new(&registry).run(working(), &args).unwrap_err();
        assert!(matches!(err, ProximaError::UnknownProxy { ref group, .. } if group == "nope"));
    }

    #[test]
    fn failures_name_stage_and_proxy() {
        let registry = registry();

        let args = TagArgs::parse("img", "ruby.png fail:construct").unwrap();
        match ProxyChain::new(&registry).run(working(), &args) {
            Err(ProximaError::ProxyExecution { name, stage, .. }) => {
                assert_eq!(name, "construct");
                assert_eq!(stage, ProxyStage::Construct);
            }
            other => panic!("expected construct failure, got {:?}", other),
        }

        let args = TagArgs::parse("img", "ruby.png text:append=A fail:process").unwrap();
        match ProxyChain::new(&registry).run(working(), &args) {
            Err(ProximaError::ProxyExecution { name, stage, source, .. }) => {
                assert_eq!(name, "process");
                assert_eq!(stage, ProxyStage::Process);
                assert_eq!(source.to_string(), "exploded");
            }
            other => panic!("expected process failure, got {:?}", other),
        }
    }
}

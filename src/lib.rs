//! Proxima - cached asset proxies
//!
//! Runs site assets through ordered chains of named proxies (resize,
//! re-encode, rewrite) and keeps every result under a path derived from
//! the asset's location and the exact proxy list. Resolving the same
//! request twice serves the stored file without running anything.
//!
//! ```no_run
//! use proxima::{Config, Env};
//! use std::path::Path;
//!
//! # fn main() -> proxima::ProximaResult<()> {
//! let env = Env::from_config(&Config::default(), Path::new("."))?;
//! let proxied = env.resolve_tag("img", "ruby.png magick:resize=40x40")?;
//! println!("{}", proxied.url("/assets"));
//! # Ok(())
//! # }
//! ```

pub mod asset;
pub mod cache;
pub mod cli;
pub mod config;
pub mod env;
pub mod error;
pub mod paths;
pub mod proxied;
pub mod proxy;
pub mod tag;
pub mod ui;

pub use asset::{Asset, AssetFinder, WorkingAsset};
pub use cache::{CacheState, CacheStore};
pub use config::Config;
pub use env::Env;
pub use error::{ProximaError, ProximaResult, TransformError};
pub use proxied::{ProxiedAsset, ProxyKey};
pub use proxy::{transform, ProxyFactory, ProxyRegistry, Transform};
pub use tag::{ProxyArgs, ProxyInvocation, TagArgs};

//! Named proxy transforms
//!
//! A proxy is looked up by `group:name`, constructed once per asset and
//! invocation, then run against the working copy of the asset. Proxies
//! compose: each sees the output of the one before it.

pub mod chain;
pub mod command;
pub mod registry;

pub use chain::ProxyChain;
pub use command::{register_configured, CommandProxy};
pub use registry::{transform, ProxyFactory, ProxyRegistry, Registration, Transform};

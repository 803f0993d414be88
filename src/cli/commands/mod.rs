//! CLI command implementations

pub mod cache;
pub mod config;
pub mod digest;
pub mod proxies;
pub mod resolve;

pub use cache::execute as cache;
pub use config::execute as config;
pub use digest::execute as digest;
pub use proxies::execute as proxies;
pub use resolve::execute as resolve;

//! Configuration schema for Proxima
//!
//! Global configuration lives at `~/.config/proxima/config.toml`; a
//! project-local `.proxima.toml` is merged over it.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Cache settings
    pub cache: CacheConfig,

    /// Asset lookup settings
    pub assets: AssetsConfig,

    /// Command-backed proxies
    pub proxies: Vec<ProxyConfig>,
}

impl Config {
    /// Cache root, resolved against `root` when relative
    pub fn cache_dir(&self, root: &Path) -> PathBuf {
        root.join(&self.cache.dir)
    }

    /// Asset source directories, resolved against `root` when relative
    pub fn source_dirs(&self, root: &Path) -> Vec<PathBuf> {
        self.assets.sources.iter().map(|s| root.join(s)).collect()
    }
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log format: "text" or "json"
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_format: "text".to_string(),
        }
    }
}

/// Cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Cache root directory
    pub dir: PathBuf,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(".proxima-cache"),
        }
    }
}

/// Asset lookup configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetsConfig {
    /// Source directories, searched in order
    pub sources: Vec<PathBuf>,

    /// URL prefix for resolved references
    pub prefix: String,

    /// Tag name used when none is given on the command line
    pub default_tag: String,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            sources: vec![PathBuf::from("_assets")],
            prefix: "/assets".to_string(),
            default_tag: "img".to_string(),
        }
    }
}

/// A proxy backed by an external command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyConfig {
    /// Proxy group (the part before `:`)
    pub group: String,

    /// Proxy name (the part after `:`)
    pub name: String,

    /// Tags allowed to use this proxy (empty = all)
    #[serde(default)]
    pub tags: Vec<String>,

    /// Command and arguments; `{input}`, `{output}`, `{opts}` and
    /// `{logical_path}` are substituted
    pub command: Vec<String>,

    /// Content type of the result, if the command changes it
    #[serde(default)]
    pub content_type: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = Config::default();
        let toml = toml::to_string_pretty(&config).unwrap();
        assert!(toml.contains("[general]"));
        assert!(toml.contains("[cache]"));
        assert!(toml.contains("[assets]"));
    }

    #[test]
    fn config_deserializes_empty() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.cache.dir, PathBuf::from(".proxima-cache"));
        assert_eq!(config.assets.prefix, "/assets");
        assert!(config.proxies.is_empty());
    }

    #[test]
    fn config_deserializes_proxies() {
        let toml = r#"
            [assets]
            sources = ["src/images"]

            [[proxies]]
            group = "magick"
            name = "resize"
            tags = ["img"]
            command = ["convert", "{input}", "-resize", "{opts}", "{output}"]
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.assets.sources, vec![PathBuf::from("src/images")]);
        assert_eq!(config.assets.default_tag, "img"); // default preserved
        assert_eq!(config.proxies.len(), 1);
        assert_eq!(config.proxies[0].group, "magick");
        assert_eq!(config.proxies[0].content_type, None);
    }

    #[test]
    fn paths_resolve_against_root() {
        let config = Config::default();
        let root = Path::new("/site");
        assert_eq!(config.cache_dir(root), PathBuf::from("/site/.proxima-cache"));
        assert_eq!(config.source_dirs(root), vec![PathBuf::from("/site/_assets")]);
    }
}

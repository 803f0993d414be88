//! CLI argument definitions using clap derive

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Proxima - cached asset proxies
///
/// Resolves asset tags through chains of named proxies and keeps each
/// result under a digest path derived from the proxy list.
#[derive(Parser, Debug)]
#[command(name = "proxima")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "PROXIMA_CONFIG")]
    pub config: Option<PathBuf>,

    /// Skip local .proxima.toml discovery
    #[arg(long, global = true)]
    pub no_local: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve one or more tag bodies, running proxies on a cache miss
    Resolve(ResolveArgs),

    /// Show the cache key of a tag body without running proxies
    Digest(DigestArgs),

    /// Inspect or prune the proxy cache
    Cache(CacheArgs),

    /// List configured proxies
    Proxies,

    /// Show or edit configuration
    Config(ConfigArgs),
}

/// Arguments for the resolve command
#[derive(Parser, Debug)]
pub struct ResolveArgs {
    /// Tag bodies, e.g. "ruby.png magick:resize=40x40"
    #[arg(required = true)]
    pub tags: Vec<String>,

    /// Tag name the bodies belong to (defaults to assets.default_tag)
    #[arg(short, long)]
    pub tag: Option<String>,

    /// Output format
    #[arg(short, long, default_value = "table")]
    pub format: OutputFormat,
}

/// Arguments for the digest command
#[derive(Parser, Debug)]
pub struct DigestArgs {
    /// Tag body
    pub body: String,

    /// Tag name the body belongs to (defaults to assets.default_tag)
    #[arg(short, long)]
    pub tag: Option<String>,
}

/// Output format for listings
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable table
    #[default]
    Table,
    /// JSON output
    Json,
    /// Simple text (one per line)
    Plain,
}

/// Arguments for the cache command
#[derive(Parser, Debug)]
pub struct CacheArgs {
    /// Subcommand for cache
    #[command(subcommand)]
    pub action: CacheAction,
}

/// Cache subcommands
#[derive(Subcommand, Debug)]
pub enum CacheAction {
    /// Print the cache root directory
    Path,

    /// List cached entries
    List {
        /// Output format
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },

    /// Remove one entry by digest path
    Remove {
        /// Cache-relative digest path
        digest_path: String,
    },

    /// Remove every cached entry
    Clear {
        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Subcommand for config
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Initialize default configuration
    Init {
        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_resolve() {
        let cli = Cli::parse_from([
            "proxima",
            "resolve",
            "ruby.png magick:resize=40x40",
            "logo.svg",
            "--tag",
            "css",
            "--format",
            "json",
        ]);
        match cli.command {
            Commands::Resolve(args) => {
                assert_eq!(args.tags.len(), 2);
                assert_eq!(args.tag.as_deref(), Some("css"));
                assert_eq!(args.format, OutputFormat::Json);
            }
            _ => panic!("expected Resolve command"),
        }
    }

    #[test]
    fn cli_resolve_requires_a_tag() {
        assert!(Cli::try_parse_from(["proxima", "resolve"]).is_err());
    }

    #[test]
    fn cli_parses_digest() {
        let cli = Cli::parse_from(["proxima", "digest", "ruby.png test:hello"]);
        match cli.command {
            Commands::Digest(args) => {
                assert_eq!(args.body, "ruby.png test:hello");
                assert!(args.tag.is_none());
            }
            _ => panic!("expected Digest command"),
        }
    }

    #[test]
    fn cli_parses_cache_actions() {
        let cli = Cli::parse_from(["proxima", "cache", "clear", "--yes"]);
        assert!(matches!(
            cli.command,
            Commands::Cache(CacheArgs {
                action: CacheAction::Clear { yes: true }
            })
        ));

        let cli = Cli::parse_from(["proxima", "cache", "remove", "img/ruby-abc.png"]);
        match cli.command {
            Commands::Cache(CacheArgs {
                action: CacheAction::Remove { digest_path },
            }) => assert_eq!(digest_path, "img/ruby-abc.png"),
            _ => panic!("expected cache remove"),
        }
    }

    #[test]
    fn cli_parses_global_flags() {
        let cli = Cli::parse_from(["proxima", "-vv", "--no-local", "proxies"]);
        assert_eq!(cli.verbose, 2);
        assert!(cli.no_local);
        assert!(matches!(cli.command, Commands::Proxies));
    }

    #[test]
    fn cli_config_action_optional() {
        let cli = Cli::parse_from(["proxima", "config"]);
        match cli.command {
            Commands::Config(args) => assert!(args.action.is_none()),
            _ => panic!("expected Config command"),
        }
    }
}

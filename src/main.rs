//! Proxima - cached asset proxies
//!
//! CLI entry point that dispatches to subcommands.

use clap::Parser;
use console::style;
use proxima::cli::{Cli, Commands};
use proxima::config::{Config, ConfigManager};
use proxima::error::{ProximaError, ProximaResult};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> ProximaResult<()> {
    let cli = Cli::parse();

    let config_manager = match cli.config {
        Some(ref path) => ConfigManager::with_path(path.clone()),
        None => ConfigManager::new(),
    };

    let cwd = std::env::current_dir()
        .map_err(|e| ProximaError::io("getting current directory", e))?;

    // Find local config unless --no-local is set
    let local_config_path = if cli.no_local {
        None
    } else {
        ConfigManager::find_local_config(&cwd)
    };

    let config = config_manager
        .load_merged(local_config_path.as_deref())
        .await?;

    init_logging(cli.verbose, &config);
    match local_config_path {
        Some(ref path) => debug!("Using local config: {}", path.display()),
        None if cli.no_local => debug!("Local config discovery disabled (--no-local)"),
        None => debug!("No local config found"),
    }

    // Relative paths in config resolve against the project root
    let root: PathBuf = local_config_path
        .as_deref()
        .and_then(|p| p.parent())
        .map(|p| p.to_path_buf())
        .unwrap_or(cwd);
    debug!("Project root: {}", root.display());

    match cli.command {
        Commands::Resolve(args) => proxima::cli::commands::resolve(args, &config, &root).await,
        Commands::Digest(args) => proxima::cli::commands::digest(args, &config, &root).await,
        Commands::Cache(args) => proxima::cli::commands::cache(args, &config, &root).await,
        Commands::Proxies => proxima::cli::commands::proxies(&config, &root).await,
        Commands::Config(args) => {
            proxima::cli::commands::config(args, &config, &config_manager).await
        }
    }
}

/// 0 = warn, 1 = info, 2+ = debug; JSON lines when configured
fn init_logging(verbose: u8, config: &Config) {
    let filter = match verbose {
        0 => EnvFilter::new("proxima=warn"),
        1 => EnvFilter::new("proxima=info"),
        _ => EnvFilter::new("proxima=debug"),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    if config.general.log_format == "json" {
        builder.json().init();
    } else {
        builder.without_time().init();
    }
}

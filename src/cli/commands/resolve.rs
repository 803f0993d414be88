//! Resolve command - run tag bodies through their proxies

use crate::cli::args::{OutputFormat, ResolveArgs};
use crate::config::Config;
use crate::env::Env;
use crate::error::{ProximaError, ProximaResult};
use crate::proxied::ProxiedAsset;
use console::style;
use futures_util::future::join_all;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// One resolved tag, as printed
#[derive(Debug, Serialize)]
struct Resolved {
    body: String,
    digest: String,
    digest_path: String,
    url: String,
    content_type: String,
    state: String,
    filename: String,
}

impl Resolved {
    fn new(body: String, asset: &ProxiedAsset, prefix: &str) -> Self {
        Self {
            body,
            digest: asset.digest().to_string(),
            digest_path: asset.digest_path().to_string(),
            url: asset.url(prefix),
            content_type: asset.content_type().to_string(),
            state: asset.state().to_string(),
            filename: asset.filename().display().to_string(),
        }
    }
}

/// Execute the resolve command.
///
/// Every tag is attempted. Failures are reported per tag on stderr and make
/// the command fail once the successful ones have been printed.
pub async fn execute(args: ResolveArgs, config: &Config, root: &Path) -> ProximaResult<()> {
    let env = Arc::new(Env::from_config(config, root)?);
    let tag = args.tag.unwrap_or_else(|| config.assets.default_tag.clone());

    // Proxies block on files and child processes
    let tasks = args.tags.into_iter().map(|body| {
        let env = Arc::clone(&env);
        let tag = tag.clone();
        tokio::task::spawn_blocking(move || {
            debug!("Resolving {{% {} {} %}}", tag, body);
            let result = env.resolve_tag(&tag, &body);
            (body, result)
        })
    });

    let mut resolved = Vec::new();
    let mut failures = Vec::new();
    for joined in join_all(tasks).await {
        let (body, result) =
            joined.map_err(|e| ProximaError::Internal(format!("resolve task failed: {}", e)))?;
        match result {
            Ok(asset) => resolved.push(Resolved::new(body, &asset, &config.assets.prefix)),
            Err(e) => failures.push((body, e)),
        }
    }

    if !resolved.is_empty() {
        match args.format {
            OutputFormat::Table => print_table(&resolved),
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&resolved)?),
            OutputFormat::Plain => {
                for r in &resolved {
                    println!("{}", r.url);
                }
            }
        }
    }

    if failures.is_empty() {
        return Ok(());
    }

    for (body, e) in &failures {
        eprintln!("{} {}: {}", style("Failed:").red().bold(), body, e);
        if let Some(hint) = e.hint() {
            eprintln!("  {} {}", style("Hint:").yellow(), hint);
        }
    }
    Err(ProximaError::User(format!(
        "{} of {} tags failed to resolve",
        failures.len(),
        failures.len() + resolved.len()
    )))
}

fn print_table(resolved: &[Resolved]) {
    println!("{:<32} {:<48} {:<16} {:<6}", "TAG", "URL", "TYPE", "STATE");
    println!("{}", "-".repeat(104));

    for r in resolved {
        let state = match r.state.as_str() {
            "hit" => style(r.state.as_str()).green().to_string(),
            _ => style(r.state.as_str()).yellow().to_string(),
        };
        println!("{:<32} {:<48} {:<16} {:<6}", r.body, r.url, r.content_type, state);
    }
}

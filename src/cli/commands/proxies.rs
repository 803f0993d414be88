//! Proxies command - list configured proxies

use crate::config::Config;
use crate::env::Env;
use crate::error::ProximaResult;
use console::style;
use std::path::Path;

/// Execute the proxies command
pub async fn execute(config: &Config, root: &Path) -> ProximaResult<()> {
    // Building the env rejects duplicate definitions
    let env = Env::from_config(config, root)?;

    if env.registry().is_empty() {
        println!("No proxies configured.");
        println!(
            "{}",
            style("Add [[proxies]] entries to .proxima.toml to define some.").dim()
        );
        return Ok(());
    }

    println!("{:<24} {:<16} {}", "PROXY", "TAGS", "COMMAND");
    println!("{}", "-".repeat(80));

    for registration in env.registry().iter() {
        let tags = if registration.tags.is_empty() {
            "*".to_string()
        } else {
            registration.tags.join(",")
        };
        let command = config
            .proxies
            .iter()
            .find(|p| p.group == registration.group && p.name == registration.name)
            .map(|p| p.command.join(" "))
            .unwrap_or_default();

        println!(
            "{:<24} {:<16} {}",
            format!("{}:{}", registration.group, registration.name),
            tags,
            command
        );
    }

    Ok(())
}

//! Cache command - inspect and prune the proxy cache

use crate::cache::{format_bytes, CacheEntry, CacheStore};
use crate::cli::args::{CacheAction, CacheArgs, OutputFormat};
use crate::config::Config;
use crate::error::ProximaResult;
use crate::ui::{self, UiContext};
use std::path::Path;

/// Execute the cache command
pub async fn execute(args: CacheArgs, config: &Config, root: &Path) -> ProximaResult<()> {
    let store = CacheStore::new(config.cache_dir(root));

    match args.action {
        CacheAction::Path => {
            println!("{}", store.root().display());
            Ok(())
        }
        CacheAction::List { format } => list_entries(&store, format),
        CacheAction::Remove { digest_path } => {
            store.remove(&digest_path)?;
            ui::step_ok(&UiContext::detect(), &format!("Removed {}", digest_path));
            Ok(())
        }
        CacheAction::Clear { yes } => clear_entries(&store, yes).await,
    }
}

fn list_entries(store: &CacheStore, format: OutputFormat) -> ProximaResult<()> {
    let entries = store.entries()?;

    match format {
        OutputFormat::Table if entries.is_empty() => println!("No cached entries found."),
        OutputFormat::Table => print_entry_table(&entries),
        OutputFormat::Json => print_entry_json(&entries)?,
        OutputFormat::Plain => {
            for entry in &entries {
                println!("{}", entry.digest_path);
            }
        }
    }

    Ok(())
}

fn print_entry_table(entries: &[CacheEntry]) {
    println!(
        "{:<56} {:<10} {:<16} {:<16}",
        "PATH", "SIZE", "TYPE", "CREATED"
    );
    println!("{}", "-".repeat(100));

    let mut total = 0;
    for entry in entries {
        total += entry.size_bytes;
        let (content_type, created) = match &entry.record {
            Some(r) => (
                r.content_type.clone(),
                r.created_at.format("%Y-%m-%d %H:%M").to_string(),
            ),
            None => ("-".to_string(), "-".to_string()),
        };
        println!(
            "{:<56} {:<10} {:<16} {:<16}",
            entry.digest_path,
            format_bytes(entry.size_bytes),
            content_type,
            created
        );
    }

    println!();
    println!("Total: {} entries, {}", entries.len(), format_bytes(total));
}

fn print_entry_json(entries: &[CacheEntry]) -> ProximaResult<()> {
    #[derive(serde::Serialize)]
    struct EntryJson<'a> {
        digest_path: &'a str,
        size_bytes: u64,
        fingerprint: Option<&'a str>,
        proxies: Option<&'a str>,
        base_logical_path: Option<&'a str>,
        content_type: Option<&'a str>,
        created_at: Option<String>,
    }

    let json: Vec<EntryJson<'_>> = entries
        .iter()
        .map(|e| {
            let record = e.record.as_ref();
            EntryJson {
                digest_path: &e.digest_path,
                size_bytes: e.size_bytes,
                fingerprint: record.map(|r| r.fingerprint.as_str()),
                proxies: record.map(|r| r.proxies.as_str()),
                base_logical_path: record.map(|r| r.base_logical_path.as_str()),
                content_type: record.map(|r| r.content_type.as_str()),
                created_at: record.map(|r| r.created_at.to_rfc3339()),
            }
        })
        .collect();

    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}

async fn clear_entries(store: &CacheStore, yes: bool) -> ProximaResult<()> {
    let ctx = UiContext::detect().with_auto_yes(yes);
    let entries = store.entries()?;

    if entries.is_empty() {
        println!("No cached entries to clear.");
        return Ok(());
    }

    ui::intro(&ctx, "Clear proxy cache");
    let prompt = format!(
        "Remove {} cached entries from {}?",
        entries.len(),
        store.root().display()
    );
    if !ui::confirm(&ctx, &prompt, false).await? {
        ui::step_warn_hint(&ctx, "Cache left untouched", "Pass --yes to skip this prompt");
        return Ok(());
    }

    let removed = store.clear()?;
    ui::step_ok_detail(&ctx, "Cache cleared", &format!("{} entries", removed));
    ui::remark(&ctx, "Entries are recreated on the next resolve");
    ui::outro_success(&ctx, "Done");
    Ok(())
}

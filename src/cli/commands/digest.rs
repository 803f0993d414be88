//! Digest command - show where a tag body would be cached

use crate::cli::args::DigestArgs;
use crate::config::Config;
use crate::env::Env;
use crate::error::ProximaResult;
use crate::ui::{self, UiContext};
use std::path::Path;

/// Execute the digest command
pub async fn execute(args: DigestArgs, config: &Config, root: &Path) -> ProximaResult<()> {
    let ctx = UiContext::detect();
    let env = Env::from_config(config, root)?;
    let tag = args.tag.unwrap_or_else(|| config.assets.default_tag.clone());

    let (tag_args, key) = env.probe_tag(&tag, &args.body)?;
    let cached = env.store().exists(&key.digest_path);

    ui::key_value(&ctx, "asset", &tag_args.asset);
    ui::key_value(&ctx, "proxies", &tag_args.args().to_string());
    ui::key_value(&ctx, "fingerprint", &key.fingerprint);
    ui::key_value(&ctx, "digest_path", &key.digest_path);
    ui::key_value(
        &ctx,
        "file",
        &env.in_cache_dir(&key.digest_path).display().to_string(),
    );
    ui::key_value(&ctx, "cached", if cached { "yes" } else { "no" });

    Ok(())
}

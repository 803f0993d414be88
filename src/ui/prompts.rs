//! Interactive prompts with CI/non-interactive fallback

use super::context::UiContext;
use crate::error::{ProximaError, ProximaResult};

/// Ask for confirmation.
///
/// Auto-yes approves without asking; a non-interactive session gets `default`.
pub async fn confirm(ctx: &UiContext, message: &str, default: bool) -> ProximaResult<bool> {
    if ctx.auto_yes() {
        println!("  {} (auto-approved)", message);
        return Ok(true);
    }
    if !ctx.is_interactive() {
        return Ok(default);
    }

    // cliclack blocks on stdin
    let message = message.to_string();
    tokio::task::spawn_blocking(move || {
        cliclack::confirm(&message)
            .initial_value(default)
            .interact()
    })
    .await
    .map_err(|e| ProximaError::Internal(format!("prompt task failed: {}", e)))?
    .map_err(|e| ProximaError::User(format!("Prompt cancelled: {}", e)))
}

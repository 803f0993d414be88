//! Terminal output helpers
//!
//! Uses `cliclack` styling on interactive terminals and falls back to plain
//! bracketed labels in CI or when output is piped.

mod context;
mod output;
mod prompts;

pub use context::UiContext;
pub use output::{intro, key_value, outro_success, remark, step_ok, step_ok_detail, step_warn_hint};
pub use prompts::confirm;

//! Output functions for consistent CLI formatting

use super::context::UiContext;
use console::style;

#[derive(Clone, Copy)]
enum Level {
    Ok,
    Warn,
}

fn step(ctx: &UiContext, level: Level, message: String) {
    if ctx.use_fancy_output() {
        let shown = match level {
            Level::Ok => cliclack::log::success(message),
            Level::Warn => cliclack::log::warning(message),
        };
        shown.ok();
        return;
    }

    let label = match level {
        Level::Ok => style("[OK]").green(),
        Level::Warn => style("[WARN]").yellow(),
    };
    println!("  {} {}", label, message);
}

/// Section heading
pub fn intro(ctx: &UiContext, title: &str) {
    let heading = style(title).cyan().bold();
    if ctx.use_fancy_output() {
        cliclack::intro(heading).ok();
    } else {
        println!("== {} ==", heading);
    }
}

/// Closing line after a successful run
pub fn outro_success(ctx: &UiContext, message: &str) {
    let closing = style(message).green().bold();
    if ctx.use_fancy_output() {
        cliclack::outro(closing).ok();
    } else {
        println!("{} {}", style("[DONE]").green(), closing);
    }
}

/// Display a success step
pub fn step_ok(ctx: &UiContext, message: &str) {
    step(ctx, Level::Ok, message.to_string());
}

/// Display a success step with detail
pub fn step_ok_detail(ctx: &UiContext, message: &str, detail: &str) {
    step(ctx, Level::Ok, format!("{} ({})", message, style(detail).dim()));
}

/// Display a warning step with hint
pub fn step_warn_hint(ctx: &UiContext, message: &str, hint: &str) {
    step(ctx, Level::Warn, format!("{} - {}", message, style(hint).dim()));
}

/// Dimmed follow-up note
pub fn remark(ctx: &UiContext, message: &str) {
    if ctx.use_fancy_output() {
        cliclack::log::remark(message).ok();
    } else {
        println!("  - {}", style(message).dim());
    }
}

/// Aligned `key: value` line
pub fn key_value(ctx: &UiContext, key: &str, value: &str) {
    let label = format!("{}:", key);
    if ctx.use_fancy_output() {
        println!("  {:<13} {}", style(label).dim(), value);
    } else {
        println!("{:<13} {}", label, value);
    }
}

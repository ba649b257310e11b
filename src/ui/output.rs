//! Report rendering shared by the commands
//!
//! Interactive terminals get cliclack log lines. Everything else gets one
//! line per message with a bracketed tag so output stays greppable in CI.

use super::context::UiContext;
use crate::store::PurchaseOutcome;
use console::{style, StyledObject};

/// Severity of a status line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Ok,
    Info,
    Warn,
}

impl Level {
    fn tag(self) -> &'static str {
        match self {
            Level::Ok => "[OK]",
            Level::Info => "[INFO]",
            Level::Warn => "[WARN]",
        }
    }

    fn paint<D>(self, value: D) -> StyledObject<D> {
        match self {
            Level::Ok => style(value).green(),
            Level::Info => style(value).cyan(),
            Level::Warn => style(value).yellow(),
        }
    }
}

/// Title of a report
pub fn heading(ctx: &UiContext, title: &str) {
    let title = style(title).cyan().bold();
    if ctx.use_fancy_output() {
        cliclack::intro(title).ok();
    } else {
        println!("{}", title);
        println!();
    }
}

/// Group header inside a report
pub fn section(ctx: &UiContext, title: &str) {
    println!();
    if ctx.use_fancy_output() {
        cliclack::log::info(style(title).bold()).ok();
    } else {
        println!("{}", style(title).bold());
    }
}

/// One status line, optionally followed by what to do about it
pub fn status(ctx: &UiContext, level: Level, message: &str, hint: Option<&str>) {
    if !ctx.use_fancy_output() {
        match hint {
            Some(hint) => println!("  {} {} - {}", level.paint(level.tag()), message, hint),
            None => println!("  {} {}", level.paint(level.tag()), message),
        }
        return;
    }

    let line = match hint {
        Some(hint) => format!("{} - {}", message, style(hint).dim()),
        None => message.to_string(),
    };
    let printed = match level {
        Level::Ok => cliclack::log::success(line),
        Level::Info => cliclack::log::info(line),
        Level::Warn => cliclack::log::warning(line),
    };
    printed.ok();
}

/// Closing line of a report
pub fn finish(ctx: &UiContext, level: Level, message: &str) {
    if ctx.use_fancy_output() {
        cliclack::outro(level.paint(message).bold()).ok();
    } else {
        println!();
        println!("{} {}", level.paint(level.tag()), message);
    }
}

/// `key: value` row
pub fn field(ctx: &UiContext, key: &str, value: &str) {
    if ctx.use_fancy_output() {
        println!("  {}: {}", style(key).dim(), value);
    } else {
        println!("  {}: {}", key, value);
    }
}

/// `key: value` row colored by whether the value is good news
pub fn flag(ctx: &UiContext, key: &str, value: &str, good: bool) {
    let level = if good { Level::Ok } else { Level::Warn };
    if ctx.use_fancy_output() {
        println!("  {}: {}", style(key).dim(), level.paint(value));
    } else {
        println!("  {} {}: {}", level.tag(), key, value);
    }
}

/// Cell for the owned column of ownership tables
pub fn ownership_cell(owned: bool) -> StyledObject<&'static str> {
    if owned {
        style("yes").green()
    } else {
        style("no").dim()
    }
}

/// Closing line of a purchase that left the product owned
pub fn purchase_granted(ctx: &UiContext, owned_id: &str, outcome: PurchaseOutcome) {
    let level = match outcome {
        PurchaseOutcome::Succeeded => Level::Ok,
        _ => Level::Info,
    };
    finish(ctx, level, &format!("{} is owned ({})", owned_id, outcome));
}

//! Terminal output for the CLI
//!
//! Uses `cliclack` for prompts and log lines, falling back to plain
//! `[OK]`/`[WARN]` lines when stdout is not a terminal or a CI runner is
//! detected.
//!
//! ```rust,ignore
//! use entitle::ui::{self, Level, UiContext};
//!
//! let ctx = UiContext::detect().with_auto_yes(args.yes);
//! ui::heading(&ctx, "Entitle Status");
//! ui::status(&ctx, Level::Warn, "Store offline", Some("Prices show '-'"));
//! let yes = ui::confirm(&ctx, "Buy lifetime for $9.99?", false).await?;
//! ```

mod context;
mod output;
mod prompts;

pub use context::UiContext;
pub use output::{
    field, finish, flag, heading, ownership_cell, purchase_granted, section, status, Level,
};
pub use prompts::confirm;

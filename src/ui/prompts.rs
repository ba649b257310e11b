//! Yes/no confirmation before purchases

use super::context::UiContext;
use crate::error::{EntitleError, EntitleResult};

/// Answer decided without asking, when the context does not allow a prompt
fn preset_answer(ctx: &UiContext, default: bool) -> Option<bool> {
    if ctx.auto_yes() {
        Some(true)
    } else if !ctx.is_interactive() {
        Some(default)
    } else {
        None
    }
}

/// Ask a yes/no question
///
/// `--yes` answers yes; non-interactive runs take `default`.
pub async fn confirm(ctx: &UiContext, question: &str, default: bool) -> EntitleResult<bool> {
    if let Some(answer) = preset_answer(ctx, default) {
        if ctx.auto_yes() {
            println!("  {} (--yes)", question);
        }
        return Ok(answer);
    }

    let question = question.to_owned();
    let answered = tokio::task::spawn_blocking(move || {
        cliclack::confirm(question).initial_value(default).interact()
    })
    .await;

    match answered {
        Ok(Ok(answer)) => Ok(answer),
        Ok(Err(e)) => Err(EntitleError::io("reading confirmation", e)),
        Err(e) => Err(EntitleError::Internal(format!(
            "confirmation prompt failed: {}",
            e
        ))),
    }
}

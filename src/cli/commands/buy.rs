//! Buy command - purchase a product

use crate::audit::AuditLog;
use crate::cli::args::BuyArgs;
use crate::cli::commands::AppContext;
use crate::error::{EntitleError, EntitleResult};
use crate::service::PurchaseRequest;
use crate::ui::{self, Level, UiContext};
use tracing::debug;

/// Execute the buy command
pub async fn execute(args: BuyArgs, ctx: &AppContext) -> EntitleResult<()> {
    let ui_ctx = UiContext::detect().with_auto_yes(args.yes);
    let service = ctx.open_service().await?;

    let mut request = if args.latest {
        PurchaseRequest::latest(&args.id)
    } else {
        PurchaseRequest::exact(&args.id)
    };
    if let Some(cache_as) = &args.cache_as {
        request = request.cache_as(cache_as);
    }

    let price = service.get_price(&args.id, args.latest, &ctx.cancel).await?;
    if price.is_not_found() && service.is_connected().await {
        return Err(EntitleError::NotFound(args.id));
    }

    let prompt = if price.is_not_found() {
        format!("Buy {}?", args.id)
    } else {
        format!("Buy {} for {}?", args.id, price.formatted_price)
    };

    if !ui::confirm(&ui_ctx, &prompt, false).await? {
        ui::status(&ui_ctx, Level::Info, "Purchase skipped", None);
        return Ok(());
    }

    let mut purchases = service.subscribe();
    let outcome = service.purchase(&request, &ctx.cancel).await?;

    let logged = AuditLog::new(&ctx.config)
        .drain_purchases(&mut purchases)
        .await;
    debug!("Audited {} purchase event(s)", logged);

    if !outcome.grants_ownership() {
        return Err(EntitleError::User(format!(
            "Purchase of {} did not complete: {}",
            args.id, outcome
        )));
    }

    ui::purchase_granted(&ui_ctx, request.cache_key(), outcome);
    Ok(())
}

//! Status command - storefront connectivity and premium state

use crate::cli::commands::AppContext;
use crate::error::EntitleResult;
use crate::ui::{self, Level, UiContext};

/// Execute the status command
pub async fn execute(ctx: &AppContext) -> EntitleResult<()> {
    let ui_ctx = UiContext::detect();
    ui::heading(&ui_ctx, "Entitle Status");

    let fixture = ctx.fixture_path()?;
    let service = ctx.open_service().await?;
    let store = service.config();

    ui::section(&ui_ctx, "Storefront:");
    ui::field(&ui_ctx, "Backend", service.backend_name());
    ui::field(&ui_ctx, "Fixture", &fixture.display().to_string());

    let connected = service.is_connected().await;
    if connected {
        ui::status(&ui_ctx, Level::Ok, "Store reachable", None);
    } else {
        ui::status(
            &ui_ctx,
            Level::Warn,
            "Store offline",
            Some("Ownership checks answer not owned, prices show '-'"),
        );
    }

    ui::section(&ui_ctx, "Entitlements:");
    let subscribed = service.is_subscription_owned(&ctx.cancel).await?;
    ui::flag(
        &ui_ctx,
        "Subscription",
        if subscribed { "active" } else { "none" },
        subscribed,
    );

    let show_premium = service.can_show_premium_buttons(&ctx.cancel).await?;
    ui::field(
        &ui_ctx,
        "Premium upsell",
        if show_premium { "shown" } else { "hidden" },
    );

    ui::section(&ui_ctx, "Configuration:");
    ui::field(&ui_ctx, "Config", &ctx.config_path.display().to_string());
    ui::field(
        &ui_ctx,
        "Subscription prefixes",
        &join_or_none(&store.subscription_prefixes),
    );
    ui::field(&ui_ctx, "Lifetime ids", &join_or_none(&store.lifetime_ids));
    if store.debug_all_owned {
        ui::status(&ui_ctx, Level::Warn, "debug_all_owned is enabled", None);
    }

    if connected {
        ui::finish(&ui_ctx, Level::Ok, "Storefront ready");
    } else {
        ui::finish(&ui_ctx, Level::Warn, "Storefront offline");
    }

    Ok(())
}

fn join_or_none(values: &[String]) -> String {
    if values.is_empty() {
        "(none)".to_string()
    } else {
        values.join(", ")
    }
}

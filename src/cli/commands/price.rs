//! Price command - show the price of a product

use crate::cli::args::{OutputFormat, PriceArgs};
use crate::cli::commands::AppContext;
use crate::error::EntitleResult;
use crate::store::PriceInfo;
use crate::ui::{self, Level, UiContext};

/// Execute the price command
pub async fn execute(args: PriceArgs, ctx: &AppContext) -> EntitleResult<()> {
    let service = ctx.open_service().await?;
    let price = service.get_price(&args.id, args.latest, &ctx.cancel).await?;

    match args.format {
        OutputFormat::Table => print_details(&args.id, &price),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&price)?),
        OutputFormat::Plain => println!("{}", price.formatted_price),
    }

    Ok(())
}

fn print_details(id: &str, price: &PriceInfo) {
    let ctx = UiContext::detect();
    ui::heading(&ctx, id);

    if price.is_not_found() {
        ui::field(&ctx, "Price", &price.formatted_price);
        ui::status(
            &ctx,
            Level::Warn,
            "Product not listed",
            Some("The store may be offline or the id unknown"),
        );
        return;
    }

    ui::field(&ctx, "Price", &price.formatted_price);
    if !price.formatted_base_price.is_empty() {
        ui::field(&ctx, "Base price", &price.formatted_base_price);
    }

    if price.is_on_sale {
        let until = price
            .sale_end_utc
            .map(|end| format!("until {}", end.format("%Y-%m-%d %H:%M UTC")))
            .unwrap_or_else(|| "yes".to_string());
        ui::flag(&ctx, "On sale", &until, true);
    }

    if price.is_subscription {
        ui::field(
            &ctx,
            "Billed every",
            &format_period(price.recurrence_length, &price.recurrence_unit.to_string()),
        );
        if price.has_trial {
            ui::field(
                &ctx,
                "Free trial",
                &format_period(price.trial_length, &price.trial_unit.to_string()),
            );
        }
    }
}

fn format_period(length: u32, unit: &str) -> String {
    if length == 1 {
        format!("1 {}", unit)
    } else {
        format!("{} {}s", length, unit)
    }
}

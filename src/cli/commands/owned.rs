//! Owned command - check ownership of products

use crate::cli::args::{OutputFormat, OwnedArgs};
use crate::cli::commands::AppContext;
use crate::error::EntitleResult;
use crate::ui::{self, UiContext};
use console::style;
use futures_util::future::join_all;
use serde::Serialize;

#[derive(Debug, Serialize)]
struct OwnershipRow {
    id: String,
    owned: bool,
    subscription: bool,
}

/// Execute the owned command
pub async fn execute(args: OwnedArgs, ctx: &AppContext) -> EntitleResult<()> {
    let service = ctx.open_service().await?;

    // Checks run concurrently; the ownership cache keeps them consistent.
    let checks = args.ids.iter().map(|id| service.is_owned(id, &ctx.cancel));
    let results = join_all(checks).await;

    let mut rows = Vec::with_capacity(args.ids.len());
    for (id, owned) in args.ids.iter().zip(results) {
        rows.push(OwnershipRow {
            id: id.clone(),
            owned: owned?,
            subscription: service.contains_subscription_prefix(id),
        });
    }

    match args.format {
        OutputFormat::Table => print_table(&rows),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&rows)?),
        OutputFormat::Plain => {
            for row in &rows {
                println!("{}\t{}", row.id, row.owned);
            }
        }
    }

    Ok(())
}

fn print_table(rows: &[OwnershipRow]) {
    let ctx = UiContext::detect();
    ui::heading(&ctx, "Ownership");

    println!(
        "{:<32} {:<14} {:<8}",
        style("PRODUCT").bold(),
        style("KIND").bold(),
        style("OWNED").bold()
    );
    println!("{}", "-".repeat(56));

    for row in rows {
        let kind = if row.subscription {
            "subscription"
        } else {
            "one-time"
        };
        println!(
            "{:<32} {:<14} {:<8}",
            row.id,
            kind,
            ui::ownership_cell(row.owned)
        );
    }
}

//! Catalog command - list the latest version of every product family

use crate::cache::VersionedProduct;
use crate::cli::args::{CatalogArgs, OutputFormat};
use crate::cli::commands::AppContext;
use crate::error::{EntitleError, EntitleResult};
use crate::ui::{self, Level, UiContext};
use console::style;
use serde::Serialize;

#[derive(Debug, Serialize)]
struct CatalogRow<'a> {
    family: String,
    version: u32,
    id: &'a str,
    price: String,
    subscription: bool,
}

impl<'a> CatalogRow<'a> {
    fn from_versioned(entry: &'a VersionedProduct) -> Self {
        let product = &entry.product;
        Self {
            family: product.family_id(),
            version: entry.version,
            id: &product.id,
            price: product.price_info().formatted_price,
            subscription: product.is_subscription(),
        }
    }
}

/// Execute the catalog command
pub async fn execute(args: CatalogArgs, ctx: &AppContext) -> EntitleResult<()> {
    let service = ctx.open_service().await?;

    if !service.catalog().ensure_loaded(&ctx.cancel).await? {
        return Err(EntitleError::NetworkUnavailable);
    }

    let latest = service.catalog().latest_products();
    let rows: Vec<CatalogRow<'_>> = latest.iter().map(CatalogRow::from_versioned).collect();

    if rows.is_empty() {
        match args.format {
            OutputFormat::Json => println!("[]"),
            OutputFormat::Plain => {}
            OutputFormat::Table => {
                let ctx = UiContext::detect();
                ui::status(&ctx, Level::Info, "Catalog is empty", None);
            }
        }
        return Ok(());
    }

    match args.format {
        OutputFormat::Table => print_table(&rows),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&rows)?),
        OutputFormat::Plain => {
            for row in &rows {
                println!("{}", row.id);
            }
        }
    }

    Ok(())
}

fn print_table(rows: &[CatalogRow<'_>]) {
    let ctx = UiContext::detect();
    ui::heading(&ctx, "Catalog");

    println!(
        "{:<24} {:<8} {:<32} {:<12}",
        style("FAMILY").bold(),
        style("VERSION").bold(),
        style("PRODUCT").bold(),
        style("PRICE").bold()
    );
    println!("{}", "-".repeat(78));

    for row in rows {
        let price = if row.subscription {
            format!("{} (sub)", row.price)
        } else {
            row.price.clone()
        };
        println!(
            "{:<24} {:<8} {:<32} {:<12}",
            row.family, row.version, row.id, price
        );
    }

    println!();
    println!("{} product(s)", rows.len());
}

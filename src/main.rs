//! Entitle - In-app purchase entitlement engine
//!
//! CLI entry point that dispatches to subcommands.

use clap::Parser;
use console::style;
use entitle::cli::{AppContext, Cli, Commands, LogFormat};
use entitle::config::ConfigManager;
use entitle::error::EntitleResult;
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> EntitleResult<()> {
    let cli = Cli::parse();

    // 0 = warn, 1 = info, 2+ = debug
    let filter = match cli.verbose {
        0 => EnvFilter::new("entitle=warn"),
        1 => EnvFilter::new("entitle=info"),
        _ => EnvFilter::new("entitle=debug"),
    };

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);
    match cli.log_format {
        LogFormat::Text => subscriber.without_time().init(),
        LogFormat::Json => subscriber.json().init(),
    }

    let config_manager = ConfigManager::locate(cli.config);
    let config = config_manager.load().await?;

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            debug!("Interrupted, canceling pending operations");
            on_interrupt.cancel();
        }
    });

    let ctx = AppContext {
        config,
        config_path: config_manager.path().to_path_buf(),
        fixture: cli.fixture,
        cancel,
    };

    match cli.command {
        Commands::Owned(args) => entitle::cli::commands::owned(args, &ctx).await,
        Commands::Price(args) => entitle::cli::commands::price(args, &ctx).await,
        Commands::Buy(args) => entitle::cli::commands::buy(args, &ctx).await,
        Commands::Status => entitle::cli::commands::status(&ctx).await,
        Commands::Catalog(args) => entitle::cli::commands::catalog(args, &ctx).await,
        Commands::Config(args) => entitle::cli::commands::config(args, &ctx).await,
    }
}

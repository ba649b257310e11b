//! Config command - show or edit configuration

use crate::cli::args::{ConfigAction, ConfigArgs};
use crate::cli::commands::AppContext;
use crate::config::{Config, ConfigManager, LicenseFailurePolicy};
use crate::error::{EntitleError, EntitleResult};
use crate::ui::{self, Level, UiContext};
use std::path::PathBuf;

/// Every key accepted by `config set`
const VALID_KEYS: [&str; 7] = [
    "general.audit_log",
    "store.subscription_prefixes",
    "store.lifetime_ids",
    "store.debug_all_owned",
    "store.license_failures",
    "backend.fixture",
    "backend.event_buffer",
];

/// Execute the config command
pub async fn execute(args: ConfigArgs, ctx: &AppContext) -> EntitleResult<()> {
    let manager = ConfigManager::with_path(ctx.config_path.clone());

    match args.action {
        None | Some(ConfigAction::Show) => show_config(&ctx.config)?,
        Some(ConfigAction::Path) => show_path(&manager),
        Some(ConfigAction::Init { force }) => init_config(&manager, force).await?,
        Some(ConfigAction::Set { key, value }) => {
            set_value(&manager, &ctx.config, &key, &value).await?
        }
    }

    Ok(())
}

fn show_config(config: &Config) -> EntitleResult<()> {
    println!("{}", toml::to_string_pretty(config)?);
    Ok(())
}

fn show_path(manager: &ConfigManager) {
    println!("{}", manager.path().display());
}

async fn init_config(manager: &ConfigManager, force: bool) -> EntitleResult<()> {
    let ctx = UiContext::detect();
    let path = manager.path();

    if path.exists() && !force {
        ui::status(
            &ctx,
            Level::Warn,
            &format!("Config already exists at {}", path.display()),
            Some("Use --force to overwrite"),
        );
        return Ok(());
    }

    manager.save(&Config::default()).await?;

    ui::status(
        &ctx,
        Level::Ok,
        &format!("Configuration initialized at {}", path.display()),
        None,
    );

    Ok(())
}

async fn set_value(
    manager: &ConfigManager,
    config: &Config,
    key: &str,
    value: &str,
) -> EntitleResult<()> {
    let ctx = UiContext::detect();
    let mut config = config.clone();

    apply_value(&mut config, key, value)?;

    manager.save(&config).await?;
    ui::status(&ctx, Level::Ok, &format!("Set {} = {}", key, value), None);

    Ok(())
}

/// Apply one dot-separated key to the config
fn apply_value(config: &mut Config, key: &str, value: &str) -> EntitleResult<()> {
    let parts: Vec<&str> = key.split('.').collect();

    match parts.as_slice() {
        ["general", "audit_log"] => config.general.audit_log = parse_bool(value)?,

        ["store", "subscription_prefixes"] => config.store.subscription_prefixes = parse_list(value),
        ["store", "lifetime_ids"] => config.store.lifetime_ids = parse_list(value),
        ["store", "debug_all_owned"] => config.store.debug_all_owned = parse_bool(value)?,
        ["store", "license_failures"] => config.store.license_failures = parse_policy(value)?,

        ["backend", "fixture"] => {
            config.backend.fixture = if value.is_empty() {
                None
            } else {
                Some(PathBuf::from(value))
            }
        }
        ["backend", "event_buffer"] => config.backend.event_buffer = parse_usize(value)?,

        _ => {
            return Err(EntitleError::User(format!(
                "Unknown config key: {}. Valid keys: {}",
                key,
                VALID_KEYS.join(", ")
            )))
        }
    }

    Ok(())
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn parse_bool(value: &str) -> EntitleResult<bool> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(EntitleError::User(format!(
            "Invalid boolean value: {}. Use true/false",
            value
        ))),
    }
}

fn parse_usize(value: &str) -> EntitleResult<usize> {
    value
        .parse()
        .map_err(|_| EntitleError::User(format!("Invalid number: {}", value)))
}

fn parse_policy(value: &str) -> EntitleResult<LicenseFailurePolicy> {
    match value.to_lowercase().as_str() {
        "transient" => Ok(LicenseFailurePolicy::Transient),
        "remember" => Ok(LicenseFailurePolicy::Remember),
        _ => Err(EntitleError::User(format!(
            "Invalid license failure policy: {}. Use transient/remember",
            value
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn apply_list_values() {
        let mut config = Config::default();
        apply_value(&mut config, "store.subscription_prefixes", "sub_, promo_sub_,").unwrap();
        assert_eq!(config.store.subscription_prefixes, vec!["sub_", "promo_sub_"]);
    }

    #[test]
    fn apply_scalar_values() {
        let mut config = Config::default();
        apply_value(&mut config, "general.audit_log", "no").unwrap();
        apply_value(&mut config, "store.license_failures", "Remember").unwrap();
        apply_value(&mut config, "backend.event_buffer", "64").unwrap();
        apply_value(&mut config, "backend.fixture", "/tmp/store.json").unwrap();

        assert!(!config.general.audit_log);
        assert_eq!(config.store.license_failures, LicenseFailurePolicy::Remember);
        assert_eq!(config.backend.event_buffer, 64);
        assert_eq!(config.backend.fixture, Some(PathBuf::from("/tmp/store.json")));

        apply_value(&mut config, "backend.fixture", "").unwrap();
        assert_eq!(config.backend.fixture, None);
    }

    #[test]
    fn apply_rejects_unknown_key_and_bad_values() {
        let mut config = Config::default();
        assert!(apply_value(&mut config, "vm.name", "x").is_err());
        assert!(apply_value(&mut config, "store.debug_all_owned", "maybe").is_err());
        assert!(apply_value(&mut config, "backend.event_buffer", "-1").is_err());
        assert!(apply_value(&mut config, "store.license_failures", "forever").is_err());
    }

    #[tokio::test]
    async fn set_value_persists() {
        let dir = TempDir::new().unwrap();
        let manager = ConfigManager::with_path(dir.path().join("config.toml"));

        set_value(&manager, &Config::default(), "store.lifetime_ids", "lifetime")
            .await
            .unwrap();

        let loaded = manager.load().await.unwrap();
        assert_eq!(loaded.store.lifetime_ids, vec!["lifetime"]);
    }
}

//! Configuration management for Entitle
//!
//! One TOML file, `<config_dir>/entitle/config.toml` unless `--config` or
//! `ENTITLE_CONFIG` points elsewhere. A missing file means defaults.

pub mod schema;

pub use schema::{BackendConfig, Config, GeneralConfig, LicenseFailurePolicy, StoreConfig};

use crate::error::{EntitleError, EntitleResult};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

const APP_DIR: &str = "entitle";
const CONFIG_FILE: &str = "config.toml";
const AUDIT_FILE: &str = "audit.log";

/// Reads and writes the config file at one location
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Use the explicit path if given, the per-user default otherwise
    pub fn locate(explicit: Option<PathBuf>) -> Self {
        Self::with_path(explicit.unwrap_or_else(Self::default_config_path))
    }

    pub fn with_path(config_path: PathBuf) -> Self {
        Self { config_path }
    }

    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
            .join(CONFIG_FILE)
    }

    /// Purchase audit log, under the per-user state directory
    pub fn audit_log_path() -> PathBuf {
        dirs::state_dir()
            .or_else(dirs::data_local_dir)
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
            .join(AUDIT_FILE)
    }

    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Load the config, falling back to defaults when the file is absent
    pub async fn load(&self) -> EntitleResult<Config> {
        let content = match fs::read_to_string(&self.config_path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No config at {}, using defaults", self.config_path.display());
                return Ok(Config::default());
            }
            Err(e) => {
                return Err(EntitleError::io(
                    format!("reading config from {}", self.config_path.display()),
                    e,
                ))
            }
        };

        let config = self.parse(&content)?;
        debug!(
            "Loaded config from {} ({} subscription prefixes, {} lifetime ids)",
            self.config_path.display(),
            config.store.subscription_prefixes.len(),
            config.store.lifetime_ids.len()
        );
        Ok(config)
    }

    fn parse(&self, content: &str) -> EntitleResult<Config> {
        toml::from_str(content).map_err(|e| EntitleError::ConfigInvalid {
            path: self.config_path.clone(),
            reason: e.to_string(),
        })
    }

    /// Write the whole config, creating the directory if needed
    pub async fn save(&self, config: &Config) -> EntitleResult<()> {
        let content = toml::to_string_pretty(config)?;

        if let Some(dir) = self.config_path.parent() {
            fs::create_dir_all(dir)
                .await
                .map_err(|source| EntitleError::ConfigDirCreate {
                    path: dir.to_path_buf(),
                    source,
                })?;
        }

        fs::write(&self.config_path, content).await.map_err(|e| {
            EntitleError::io(format!("writing config to {}", self.config_path.display()), e)
        })?;

        info!("Configuration saved to {}", self.config_path.display());
        Ok(())
    }
}

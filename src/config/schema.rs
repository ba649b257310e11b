//! Configuration schema for Entitle
//!
//! Configuration is stored at `~/.config/entitle/config.toml`

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Entitlement engine settings
    pub store: StoreConfig,

    /// Storefront backend settings
    pub backend: BackendConfig,
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Append purchase events to the audit log
    pub audit_log: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self { audit_log: true }
    }
}

/// What to do with an ownership check when the license snapshot is
/// unavailable
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LicenseFailurePolicy {
    /// Answer "not owned" without caching; the next check asks again
    #[default]
    Transient,
    /// Cache "not owned" for the rest of the process lifetime
    Remember,
}

/// Entitlement engine configuration, immutable once the service is built
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Prefixes identifying subscription product ids (case-insensitive)
    pub subscription_prefixes: Vec<String>,

    /// Exact ids of lifetime (one-time) unlocks
    pub lifetime_ids: Vec<String>,

    /// Treat every product as owned. Debug builds only.
    pub debug_all_owned: bool,

    /// Handling of unavailable license snapshots
    pub license_failures: LicenseFailurePolicy,
}

impl StoreConfig {
    /// Create a config with the given subscription prefixes and lifetime ids
    pub fn new(subscription_prefixes: Vec<String>, lifetime_ids: Vec<String>) -> Self {
        Self {
            subscription_prefixes,
            lifetime_ids,
            ..Self::default()
        }
    }

    /// Every id whose ownership hides premium upsells
    pub fn premium_ids(&self) -> Vec<String> {
        self.subscription_prefixes
            .iter()
            .chain(self.lifetime_ids.iter())
            .cloned()
            .collect()
    }
}

/// Storefront backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// JSON store fixture served by the in-memory backend
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fixture: Option<PathBuf>,

    /// Capacity of the purchase notification channel
    pub event_buffer: usize,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            fixture: None,
            event_buffer: 16,
        }
    }
}

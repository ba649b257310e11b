//! CLI command implementations

pub mod buy;
pub mod catalog;
pub mod config;
pub mod owned;
pub mod price;
pub mod status;

pub use buy::execute as buy;
pub use catalog::execute as catalog;
pub use config::execute as config;
pub use owned::execute as owned;
pub use price::execute as price;
pub use status::execute as status;

use crate::config::Config;
use crate::error::{EntitleError, EntitleResult};
use crate::service::EntitlementService;
use crate::store::MemoryBackend;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// State shared by every command invocation
pub struct AppContext {
    /// Loaded configuration
    pub config: Config,
    /// Path the configuration was loaded from
    pub config_path: PathBuf,
    /// Fixture override from the command line
    pub fixture: Option<PathBuf>,
    /// Canceled on Ctrl-C
    pub cancel: CancellationToken,
}

impl AppContext {
    /// Fixture to serve, command line first, then config
    pub fn fixture_path(&self) -> EntitleResult<&Path> {
        self.fixture
            .as_deref()
            .or(self.config.backend.fixture.as_deref())
            .ok_or(EntitleError::FixtureNotConfigured)
    }

    /// Build the entitlement service over the configured store fixture
    pub async fn open_service(&self) -> EntitleResult<EntitlementService> {
        let path = self.fixture_path()?;
        let backend = MemoryBackend::load(path).await?;
        debug!("Using memory backend from {}", path.display());

        Ok(
            EntitlementService::new(self.config.store.clone(), Arc::new(backend))
                .with_event_buffer(self.config.backend.event_buffer),
        )
    }
}

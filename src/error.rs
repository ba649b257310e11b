//! Error types for Entitle
//!
//! All modules use `EntitleResult<T>` as their return type. The engine
//! itself only ever surfaces `Canceled`; every other failure resolves to a
//! typed "not owned" / "not found" / "-" answer.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for Entitle operations
pub type EntitleResult<T> = Result<T, EntitleError>;

/// All errors that can occur in Entitle
#[derive(Error, Debug)]
pub enum EntitleError {
    // Storefront errors
    #[error("Network unavailable")]
    NetworkUnavailable,

    #[error("Storefront backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("Product not found: {0}")]
    NotFound(String),

    #[error("Operation canceled")]
    Canceled,

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Fixture errors
    #[error("Invalid store fixture at {path}: {reason}")]
    FixtureInvalid { path: PathBuf, reason: String },

    #[error("No store fixture configured")]
    FixtureNotConfigured,

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    // General errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("{0}")]
    User(String),
}

impl EntitleError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a backend-unavailable error from any displayable reason
    pub fn backend(reason: impl Into<String>) -> Self {
        Self::BackendUnavailable(reason.into())
    }

    /// Check if the failure is transient and must not be cached
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::NetworkUnavailable | Self::BackendUnavailable(_))
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::FixtureNotConfigured => {
                Some("Pass --fixture <FILE> or run: entitle config set backend.fixture <FILE>")
            }
            Self::NetworkUnavailable => Some("Check connectivity and retry"),
            Self::ConfigInvalid { .. } => Some("Run: entitle config init --force"),
            _ => None,
        }
    }
}

//! Redconar-Sync: provider reconciliation against the Redconar portal
//!
//! This crate logs into the Redconar portal, scrapes its provider listing,
//! matches the remote providers against the local provider table by CUIT and
//! links the local rows to their Redconar identifiers.

pub mod config;
pub mod output;
pub mod portal;
pub mod reconcile;
pub mod storage;
pub mod sync;

use thiserror::Error;

/// Main error type for Redconar-Sync operations
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Session error: {0}")]
    Acquisition(#[from] AcquisitionError),

    #[error("Provider listing error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Missing credential: {0}")]
    MissingCredential(&'static str),
}

/// Errors raised while logging into the portal
#[derive(Debug, Error)]
pub enum AcquisitionError {
    /// The portal redirected but did not hand out a session cookie.
    /// Usually rejected credentials, or the login contract changed.
    #[error("Login redirected (HTTP {status}) to {location} without a PHPSESSID cookie")]
    NoRedirectCookie { status: u16, location: String },

    #[error("Login completed (HTTP {status}) without a PHPSESSID cookie")]
    NoCookieAtAll { status: u16 },

    #[error("Login request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

impl AcquisitionError {
    /// Only transport failures are worth retrying
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

/// Errors raised while fetching the provider listing
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Unexpected HTTP status {0} from provider listing")]
    UnexpectedStatus(u16),

    /// The portal answered with its login page instead of the listing
    #[error("Session expired")]
    SessionExpired,

    #[error("Provider listing request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Result type alias for Redconar-Sync operations
pub type Result<T> = std::result::Result<T, SyncError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::{Config, Credentials};
pub use portal::{parse_providers, ProviderFetcher, SessionAcquirer, SessionToken};
pub use reconcile::{normalize_tax_id, reconcile, ReconciliationResult};
pub use storage::{LocalProviderRecord, RemoteProviderRecord};
pub use sync::{apply_links, run_sync, LinkError, LinkOutcome, SyncOptions, SyncOutcome};

//! Configuration module for Redconar-Sync
//!
//! This module handles loading, parsing, and validating the TOML configuration
//! file, and carries the portal credentials as an explicit value.
//!
//! # Example
//!
//! ```no_run
//! use redconar_sync::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("redconar.toml")).unwrap();
//! println!("Listing endpoint: {}", config.portal.providers_url());
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, Credentials, HttpConfig, PortalConfig, StorageConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use validation::{validate, validate_credentials};

//! Storage module for the local provider table
//!
//! This module handles all database operations, including:
//! - SQLite database initialization and schema management
//! - Reading the provider table
//! - Linking providers to their Redconar identifiers in one statement
//! - Sync run history

mod schema;
mod sqlite;
mod traits;

pub use sqlite::{NewProvider, SqliteStore};
pub use traits::{ProviderStore, StorageError, StorageResult};

use crate::SyncError;
use std::path::Path;

/// Initializes or opens a provider store
pub fn open_store(path: &Path) -> Result<SqliteStore, SyncError> {
    SqliteStore::new(path)
}

/// A provider as listed by the Redconar portal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteProviderRecord {
    /// Redconar's own id (the `<option>` value). Kept as text; some ids have leading zeros.
    pub external_id: String,
    pub display_name: String,
    pub legal_name: String,
    /// CUIT as formatted by the portal, `None` when the listing shows none
    pub tax_id: Option<String>,
}

/// A row of the local `proveedores` table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalProviderRecord {
    pub id: String,
    pub tax_id: Option<String>,
    pub display_name: String,
    pub fantasy_name: Option<String>,
    pub email: Option<String>,
    /// Redconar id once linked
    pub external_id: Option<String>,
}

/// A recorded sync run
#[derive(Debug, Clone)]
pub struct SyncRunRecord {
    pub id: i64,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub config_hash: String,
    pub status: RunStatus,
    pub counts: Option<RunCounts>,
    pub error_message: Option<String>,
}

/// Outcome counts stored with a finished run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunCounts {
    pub linked: u64,
    pub link_errors: u64,
    pub new_in_remote: u64,
    pub missing_in_remote: u64,
    pub total_local: u64,
    pub total_remote: u64,
}

/// Status of a sync run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Running,
    Completed,
    Failed,
}

impl RunStatus {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "running" => Some(Self::Running),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

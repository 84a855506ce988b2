//! Storage traits and error types
//!
//! This module defines the trait interface for the provider store and
//! associated error types.

use crate::storage::{LocalProviderRecord, RunCounts, RunStatus, SyncRunRecord};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Run not found: {0}")]
    RunNotFound(i64),

    /// A conditional batch update touched fewer rows than it targeted.
    /// The whole batch was rolled back.
    #[error("Batch update conflict: expected {expected} rows, matched {affected}")]
    Conflict { expected: usize, affected: usize },

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for provider store implementations
///
/// The reconciliation never creates or deletes providers; the only write to
/// the provider table is [`ProviderStore::link_external_ids`].
pub trait ProviderStore {
    // ===== Providers =====

    /// Returns every provider row
    fn list_providers(&self) -> StorageResult<Vec<LocalProviderRecord>>;

    /// Sets `external_id` on each `(id, external_id)` pair in one statement
    ///
    /// Only rows whose external id is still unset are touched. Either every
    /// target is updated or none is: when the matched row count differs from
    /// `links.len()` the implementation rolls back and returns
    /// [`StorageError::Conflict`].
    ///
    /// # Returns
    ///
    /// The number of rows updated (always `links.len()` on success)
    fn link_external_ids(&mut self, links: &[(String, String)]) -> StorageResult<usize>;

    // ===== Run History =====

    /// Records the start of a sync run and returns its id
    fn start_run(&mut self, config_hash: &str) -> StorageResult<i64>;

    /// Marks a run finished with its status, counts and optional error
    fn finish_run(
        &mut self,
        run_id: i64,
        status: RunStatus,
        counts: Option<RunCounts>,
        error_message: Option<&str>,
    ) -> StorageResult<()>;

    /// Gets the most recent run
    fn latest_run(&self) -> StorageResult<Option<SyncRunRecord>>;
}

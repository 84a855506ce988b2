//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the ProviderStore trait.

use crate::storage::schema::initialize_schema;
use crate::storage::traits::{ProviderStore, StorageError, StorageResult};
use crate::storage::{LocalProviderRecord, RunCounts, RunStatus, SyncRunRecord};
use crate::SyncError;
use chrono::Utc;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use std::path::Path;

/// SQLite storage backend
pub struct SqliteStore {
    conn: Connection,
}

/// Fields for seeding a provider row
#[derive(Debug, Clone, Default)]
pub struct NewProvider {
    pub tax_id: Option<String>,
    pub display_name: String,
    pub fantasy_name: Option<String>,
    pub email: Option<String>,
    pub external_id: Option<String>,
}

impl SqliteStore {
    /// Opens (or creates) the database at `path` and initializes the schema
    pub fn new(path: &Path) -> Result<Self, SyncError> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database
    pub fn new_in_memory() -> Result<Self, SyncError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Inserts a provider row and returns its generated id
    ///
    /// Provider creation belongs to the dashboard's CRUD layer; this exists
    /// for seeding and tests.
    pub fn insert_provider(&mut self, provider: &NewProvider) -> StorageResult<String> {
        let id = self.conn.query_row(
            "INSERT INTO proveedores (cuit, nombre, nombre_fantasia, mail, redconar_prov_id)
             VALUES (?1, ?2, ?3, ?4, ?5) RETURNING id",
            params![
                provider.tax_id,
                provider.display_name,
                provider.fantasy_name,
                provider.email,
                provider.external_id
            ],
            |row| row.get(0),
        )?;
        Ok(id)
    }

    /// Gets a single provider by id
    pub fn get_provider(&self, id: &str) -> StorageResult<Option<LocalProviderRecord>> {
        let provider = self
            .conn
            .query_row(
                "SELECT id, cuit, nombre, nombre_fantasia, mail, redconar_prov_id
                 FROM proveedores WHERE id = ?1",
                params![id],
                provider_from_row,
            )
            .optional()?;
        Ok(provider)
    }
}

fn provider_from_row(row: &Row<'_>) -> rusqlite::Result<LocalProviderRecord> {
    Ok(LocalProviderRecord {
        id: row.get(0)?,
        tax_id: row.get(1)?,
        display_name: row.get(2)?,
        fantasy_name: row.get(3)?,
        email: row.get(4)?,
        external_id: row.get(5)?,
    })
}

/// Builds `UPDATE ... SET redconar_prov_id = CASE id WHEN ?1 THEN ?2 ... END`
/// for `count` pairs. Parameter `2k+1` is an id, `2k+2` its external id.
fn build_link_statement(count: usize) -> String {
    let mut cases = String::new();
    let mut ids = Vec::with_capacity(count);

    for k in 0..count {
        let id_param = 2 * k + 1;
        cases.push_str(&format!(" WHEN ?{} THEN ?{}", id_param, id_param + 1));
        ids.push(format!("?{}", id_param));
    }

    format!(
        "UPDATE proveedores SET redconar_prov_id = CASE id{} END
         WHERE redconar_prov_id IS NULL AND id IN ({})",
        cases,
        ids.join(", ")
    )
}

fn to_db_count(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

impl ProviderStore for SqliteStore {
    // ===== Providers =====

    fn list_providers(&self) -> StorageResult<Vec<LocalProviderRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, cuit, nombre, nombre_fantasia, mail, redconar_prov_id
             FROM proveedores ORDER BY created_at, id",
        )?;

        let providers = stmt
            .query_map([], provider_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(providers)
    }

    fn link_external_ids(&mut self, links: &[(String, String)]) -> StorageResult<usize> {
        if links.is_empty() {
            return Ok(0);
        }

        let sql = build_link_statement(links.len());
        let values = links
            .iter()
            .flat_map(|(id, external_id)| [id.as_str(), external_id.as_str()]);

        let tx = self.conn.transaction()?;
        let affected = tx.execute(&sql, params_from_iter(values))?;

        if affected != links.len() {
            tx.rollback()?;
            return Err(StorageError::Conflict {
                expected: links.len(),
                affected,
            });
        }

        tx.commit()?;
        Ok(affected)
    }

    // ===== Run History =====

    fn start_run(&mut self, config_hash: &str) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO sync_runs (started_at, config_hash, status) VALUES (?1, ?2, ?3)",
            params![now, config_hash, RunStatus::Running.to_db_string()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn finish_run(
        &mut self,
        run_id: i64,
        status: RunStatus,
        counts: Option<RunCounts>,
        error_message: Option<&str>,
    ) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let c = counts.map(|c| {
            [
                c.linked,
                c.link_errors,
                c.new_in_remote,
                c.missing_in_remote,
                c.total_local,
                c.total_remote,
            ]
            .map(to_db_count)
        });

        let updated = self.conn.execute(
            "UPDATE sync_runs SET status = ?1, finished_at = ?2, linked = ?3, link_errors = ?4,
             new_in_remote = ?5, missing_in_remote = ?6, total_local = ?7, total_remote = ?8,
             error_message = ?9 WHERE id = ?10",
            params![
                status.to_db_string(),
                now,
                c.map(|c| c[0]),
                c.map(|c| c[1]),
                c.map(|c| c[2]),
                c.map(|c| c[3]),
                c.map(|c| c[4]),
                c.map(|c| c[5]),
                error_message,
                run_id
            ],
        )?;

        if updated == 0 {
            return Err(StorageError::RunNotFound(run_id));
        }
        Ok(())
    }

    fn latest_run(&self) -> StorageResult<Option<SyncRunRecord>> {
        let run = self
            .conn
            .query_row(
                "SELECT id, started_at, finished_at, config_hash, status, linked, link_errors,
                 new_in_remote, missing_in_remote, total_local, total_remote, error_message
                 FROM sync_runs ORDER BY id DESC LIMIT 1",
                [],
                |row| {
                    let linked: Option<i64> = row.get(5)?;
                    let counts = match linked {
                        Some(linked) => Some(RunCounts {
                            linked: linked as u64,
                            link_errors: row.get::<_, i64>(6)? as u64,
                            new_in_remote: row.get::<_, i64>(7)? as u64,
                            missing_in_remote: row.get::<_, i64>(8)? as u64,
                            total_local: row.get::<_, i64>(9)? as u64,
                            total_remote: row.get::<_, i64>(10)? as u64,
                        }),
                        None => None,
                    };

                    Ok(SyncRunRecord {
                        id: row.get(0)?,
                        started_at: row.get(1)?,
                        finished_at: row.get(2)?,
                        config_hash: row.get(3)?,
                        status: RunStatus::from_db_string(&row.get::<_, String>(4)?)
                            .unwrap_or(RunStatus::Failed),
                        counts,
                        error_message: row.get(11)?,
                    })
                },
            )
            .optional()?;

        Ok(run)
    }
}

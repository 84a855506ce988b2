//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the provider store.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Local providers. redconar_prov_id stays NULL until linked.
CREATE TABLE IF NOT EXISTS proveedores (
    id TEXT PRIMARY KEY DEFAULT (lower(hex(randomblob(16)))),
    cuit TEXT,
    nombre TEXT NOT NULL,
    nombre_fantasia TEXT,
    mail TEXT,
    redconar_prov_id TEXT,
    created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
);

CREATE INDEX IF NOT EXISTS idx_proveedores_cuit ON proveedores(cuit);
CREATE INDEX IF NOT EXISTS idx_proveedores_redconar ON proveedores(redconar_prov_id);

-- Track sync runs
CREATE TABLE IF NOT EXISTS sync_runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    started_at TEXT NOT NULL,
    finished_at TEXT,
    config_hash TEXT NOT NULL,
    status TEXT NOT NULL,
    linked INTEGER,
    link_errors INTEGER,
    new_in_remote INTEGER,
    missing_in_remote INTEGER,
    total_local INTEGER,
    total_remote INTEGER,
    error_message TEXT
);
"#;

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - The database connection
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}

// workstream-store-sqlite/src/store.rs
// ============================================================================
// Module: SQLite Company Store
// Description: Durable CompanyStore backed by SQLite WAL.
// Purpose: Persist company records with stable, never-reused ids.
// Dependencies: workstream-core, rusqlite, serde, thiserror
// ============================================================================

//! ## Overview
//! This module implements a durable [`CompanyStore`] using `SQLite`. Every
//! operation runs in its own transaction on a single mutex-guarded
//! connection. Rows are validated on load and fail closed on corruption.

// ============================================================================//
// SECTION: Imports
// ============================================================================//

use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;

use rusqlite::Connection;
use rusqlite::OpenFlags;
use rusqlite::OptionalExtension;
use rusqlite::Row;
use rusqlite::TransactionBehavior;
use rusqlite::params;
use serde::Deserialize;
use thiserror::Error;
use workstream_core::Company;
use workstream_core::CompanyAttributes;
use workstream_core::CompanyId;
use workstream_core::CompanyStore;
use workstream_core::NewCompany;
use workstream_core::StoreError;
use workstream_core::is_blank;

// ============================================================================//
// SECTION: Constants
// ============================================================================//

/// `SQLite` schema version for the store.
const SCHEMA_VERSION: i64 = 1;
/// Default busy timeout (ms).
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
/// Maximum length of a single path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum company name size accepted by the store, in bytes.
pub const MAX_NAME_BYTES: usize = workstream_core::MAX_NAME_BYTES;

/// Loads one company row, measuring the name in bytes.
const SELECT_BY_ID: &str = "SELECT id, length(CAST(name AS BLOB)), name, created_by, created_at, \
                            updated_at FROM companies WHERE id = ?1";

// ============================================================================//
// SECTION: Config
// ============================================================================//

/// `SQLite` journal mode configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteStoreMode {
    /// WAL journal mode (recommended).
    #[default]
    Wal,
    /// Delete journal mode (legacy).
    Delete,
}

impl SqliteStoreMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Wal => "wal",
            Self::Delete => "delete",
        }
    }
}

/// `SQLite` sync mode configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteSyncMode {
    /// Full synchronous mode (safest).
    #[default]
    Full,
    /// Normal synchronous mode (balanced).
    Normal,
}

impl SqliteSyncMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Normal => "normal",
        }
    }
}

/// Configuration for the `SQLite` company store.
#[derive(Debug, Clone, Deserialize)]
pub struct SqliteStoreConfig {
    /// Path to the `SQLite` database file.
    pub path: PathBuf,
    /// Busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// `SQLite` journal mode.
    #[serde(default)]
    pub journal_mode: SqliteStoreMode,
    /// `SQLite` sync mode.
    #[serde(default)]
    pub sync_mode: SqliteSyncMode,
}

impl SqliteStoreConfig {
    /// Builds a config for `path` with default tuning.
    #[must_use]
    pub fn for_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            journal_mode: SqliteStoreMode::default(),
            sync_mode: SqliteSyncMode::default(),
        }
    }
}

/// Returns the default busy timeout for `SQLite` connections.
const fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

// ============================================================================//
// SECTION: Errors
// ============================================================================//

/// `SQLite` store errors.
#[derive(Debug, Error)]
pub enum SqliteStoreError {
    /// Store I/O error.
    #[error("sqlite store io error: {0}")]
    Io(String),
    /// `SQLite` engine error.
    #[error("sqlite store db error: {0}")]
    Db(String),
    /// Store corruption.
    #[error("sqlite store corruption: {0}")]
    Corrupt(String),
    /// Store schema version mismatch.
    #[error("sqlite store version mismatch: {0}")]
    VersionMismatch(String),
    /// Invalid store data.
    #[error("sqlite store invalid data: {0}")]
    Invalid(String),
    /// Store payload exceeded configured size limits.
    #[error("sqlite store payload too large: {actual_bytes} bytes (max {max_bytes})")]
    TooLarge {
        /// Maximum allowed bytes.
        max_bytes: usize,
        /// Actual payload size in bytes.
        actual_bytes: usize,
    },
}

impl From<SqliteStoreError> for StoreError {
    fn from(error: SqliteStoreError) -> Self {
        match error {
            SqliteStoreError::Io(message) => Self::Io(message),
            SqliteStoreError::Db(message) => Self::Store(message),
            SqliteStoreError::Corrupt(message) => Self::Corrupt(message),
            SqliteStoreError::VersionMismatch(message) => Self::VersionMismatch(message),
            SqliteStoreError::Invalid(message) => Self::Invalid(message),
            SqliteStoreError::TooLarge {
                max_bytes,
                actual_bytes,
            } => Self::Invalid(format!(
                "company name exceeds size limit: {actual_bytes} bytes (max {max_bytes})"
            )),
        }
    }
}

impl From<rusqlite::Error> for SqliteStoreError {
    fn from(error: rusqlite::Error) -> Self {
        Self::Db(error.to_string())
    }
}

// ============================================================================//
// SECTION: Store
// ============================================================================//

/// `SQLite`-backed company store with WAL support.
#[derive(Clone)]
pub struct SqliteCompanyStore {
    /// Shared `SQLite` connection guarded by a mutex.
    connection: Arc<Mutex<Connection>>,
}

impl SqliteCompanyStore {
    /// Opens an `SQLite`-backed company store.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the database cannot be opened or
    /// initialized.
    pub fn new(config: &SqliteStoreConfig) -> Result<Self, SqliteStoreError> {
        validate_store_path(&config.path)?;
        ensure_parent_dir(&config.path)?;
        let mut connection = open_connection(config)?;
        initialize_schema(&mut connection)?;
        Ok(Self {
            connection: Arc::new(Mutex::new(connection)),
        })
    }

    /// Locks the shared connection.
    fn lock(&self) -> Result<MutexGuard<'_, Connection>, SqliteStoreError> {
        self.connection.lock().map_err(|_| SqliteStoreError::Db("mutex poisoned".to_string()))
    }
}

impl CompanyStore for SqliteCompanyStore {
    fn list(&self) -> Result<Vec<Company>, StoreError> {
        self.list_companies().map_err(StoreError::from)
    }

    fn get(&self, id: CompanyId) -> Result<Option<Company>, StoreError> {
        self.load_company(id).map_err(StoreError::from)
    }

    fn insert(&self, company: NewCompany) -> Result<Company, StoreError> {
        self.insert_company(company).map_err(StoreError::from)
    }

    fn update(
        &self,
        id: CompanyId,
        attributes: &CompanyAttributes,
        updated_at: i64,
    ) -> Result<Option<Company>, StoreError> {
        self.update_company(id, attributes, updated_at).map_err(StoreError::from)
    }

    fn delete(&self, id: CompanyId) -> Result<bool, StoreError> {
        self.delete_company(id).map_err(StoreError::from)
    }
}

impl SqliteCompanyStore {
    /// Lists all companies ordered by id.
    fn list_companies(&self) -> Result<Vec<Company>, SqliteStoreError> {
        let mut guard = self.lock()?;
        let tx = guard.transaction()?;
        let rows = {
            let mut statement = tx.prepare(
                "SELECT id, length(CAST(name AS BLOB)), name, created_by, created_at, updated_at \
                 FROM companies ORDER BY id ASC",
            )?;
            let mapped = statement.query_map(params![], read_row)?;
            mapped.collect::<Result<Vec<_>, _>>()?
        };
        tx.commit()?;
        drop(guard);
        rows.into_iter().map(CompanyRow::into_company).collect()
    }

    /// Loads a company by id.
    fn load_company(&self, id: CompanyId) -> Result<Option<Company>, SqliteStoreError> {
        let raw_id = id_to_sql(id)?;
        let row = {
            let guard = self.lock()?;
            let row = guard.query_row(SELECT_BY_ID, params![raw_id], read_row).optional()?;
            drop(guard);
            row
        };
        row.map(CompanyRow::into_company).transpose()
    }

    /// Inserts a company and returns the stored record.
    fn insert_company(&self, company: NewCompany) -> Result<Company, SqliteStoreError> {
        validate_name(&company.name)?;
        let mut guard = self.lock()?;
        let tx = guard.transaction()?;
        tx.execute(
            "INSERT INTO companies (name, created_by, created_at, updated_at) VALUES (?1, ?2, \
             ?3, ?3)",
            params![company.name, company.created_by, company.created_at],
        )?;
        let raw_id = tx.last_insert_rowid();
        tx.commit()?;
        drop(guard);
        let id = id_from_sql(raw_id)?;
        Ok(Company {
            id,
            name: company.name,
            created_by: company.created_by,
            created_at: company.created_at,
            updated_at: company.created_at,
        })
    }

    /// Applies attributes to a stored company inside one write transaction.
    fn update_company(
        &self,
        id: CompanyId,
        attributes: &CompanyAttributes,
        updated_at: i64,
    ) -> Result<Option<Company>, SqliteStoreError> {
        let raw_id = id_to_sql(id)?;
        let mut guard = self.lock()?;
        let tx = guard.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let Some(row) = tx.query_row(SELECT_BY_ID, params![raw_id], read_row).optional()? else {
            return Ok(None);
        };
        let mut company = row.into_company()?;
        attributes
            .apply_to(&mut company)
            .map_err(|err| SqliteStoreError::Invalid(err.to_string()))?;
        validate_name(&company.name)?;
        company.updated_at = updated_at.max(company.created_at);
        tx.execute(
            "UPDATE companies SET name = CASE WHEN ?1 THEN ?2 ELSE name END, created_by = CASE \
             WHEN ?3 THEN ?4 ELSE created_by END, updated_at = ?5 WHERE id = ?6",
            params![
                attributes.name.is_some(),
                company.name,
                attributes.created_by.is_some(),
                company.created_by,
                company.updated_at,
                raw_id
            ],
        )?;
        tx.commit()?;
        drop(guard);
        Ok(Some(company))
    }

    /// Deletes a stored company.
    fn delete_company(&self, id: CompanyId) -> Result<bool, SqliteStoreError> {
        let raw_id = id_to_sql(id)?;
        let mut guard = self.lock()?;
        let tx = guard.transaction()?;
        let changed = tx.execute("DELETE FROM companies WHERE id = ?1", params![raw_id])?;
        tx.commit()?;
        drop(guard);
        Ok(changed > 0)
    }
}

// ============================================================================//
// SECTION: Rows
// ============================================================================//

/// Raw company row prior to validation.
struct CompanyRow {
    /// Row id.
    id: i64,
    /// Stored name length in bytes.
    name_length: i64,
    /// Stored name.
    name: String,
    /// Stored creator reference.
    created_by: Option<String>,
    /// Creation time (unix epoch milliseconds).
    created_at: i64,
    /// Last update time (unix epoch milliseconds).
    updated_at: i64,
}

impl CompanyRow {
    /// Validates a row and converts it into a company record.
    fn into_company(self) -> Result<Company, SqliteStoreError> {
        let id = id_from_sql(self.id)?;
        let length = usize::try_from(self.name_length).map_err(|_| {
            SqliteStoreError::Invalid(format!("negative name length for company {id}"))
        })?;
        if length > MAX_NAME_BYTES {
            return Err(SqliteStoreError::TooLarge {
                max_bytes: MAX_NAME_BYTES,
                actual_bytes: length,
            });
        }
        if is_blank(&self.name) {
            return Err(SqliteStoreError::Corrupt(format!("blank name for company {id}")));
        }
        Ok(Company {
            id,
            name: self.name,
            created_by: self.created_by,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Reads a raw company row.
fn read_row(row: &Row<'_>) -> rusqlite::Result<CompanyRow> {
    Ok(CompanyRow {
        id: row.get(0)?,
        name_length: row.get(1)?,
        name: row.get(2)?,
        created_by: row.get(3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
    })
}

// ============================================================================//
// SECTION: Helpers
// ============================================================================//

/// Converts a company id to a `SQLite` integer.
fn id_to_sql(id: CompanyId) -> Result<i64, SqliteStoreError> {
    i64::try_from(id.get())
        .map_err(|_| SqliteStoreError::Invalid(format!("company id out of range: {id}")))
}

/// Converts a `SQLite` integer to a company id.
fn id_from_sql(raw: i64) -> Result<CompanyId, SqliteStoreError> {
    u64::try_from(raw)
        .ok()
        .and_then(CompanyId::from_raw)
        .ok_or_else(|| SqliteStoreError::Corrupt(format!("invalid company id: {raw}")))
}

/// Rejects names the store must never persist.
fn validate_name(name: &str) -> Result<(), SqliteStoreError> {
    if name.len() > MAX_NAME_BYTES {
        return Err(SqliteStoreError::TooLarge {
            max_bytes: MAX_NAME_BYTES,
            actual_bytes: name.len(),
        });
    }
    if is_blank(name) {
        return Err(SqliteStoreError::Invalid("company name must not be blank".to_string()));
    }
    Ok(())
}

/// Ensures the parent directory for the store exists.
fn ensure_parent_dir(path: &Path) -> Result<(), SqliteStoreError> {
    let Some(parent) = path.parent() else {
        return Err(SqliteStoreError::Io("store path missing parent directory".to_string()));
    };
    if parent.as_os_str().is_empty() {
        return Ok(());
    }
    std::fs::create_dir_all(parent).map_err(|err| SqliteStoreError::Io(err.to_string()))
}

/// Validates store paths for safety limits.
fn validate_store_path(path: &Path) -> Result<(), SqliteStoreError> {
    let path_string = path.display().to_string();
    if path_string.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(SqliteStoreError::Invalid("store path exceeds length limit".to_string()));
    }
    for component in path.components() {
        let name = component.as_os_str().to_string_lossy();
        if name.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(SqliteStoreError::Invalid(
                "store path contains an overlong component".to_string(),
            ));
        }
    }
    if path.exists() && path.is_dir() {
        return Err(SqliteStoreError::Invalid(
            "store path must be a file, not a directory".to_string(),
        ));
    }
    Ok(())
}

/// Opens an `SQLite` connection with secure defaults.
fn open_connection(config: &SqliteStoreConfig) -> Result<Connection, SqliteStoreError> {
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_CREATE
        | OpenFlags::SQLITE_OPEN_FULL_MUTEX;
    let connection = Connection::open_with_flags(&config.path, flags)?;
    apply_pragmas(&connection, config)?;
    Ok(connection)
}

/// Applies `SQLite` pragmas required for durability.
fn apply_pragmas(
    connection: &Connection,
    config: &SqliteStoreConfig,
) -> Result<(), SqliteStoreError> {
    connection.execute_batch("PRAGMA foreign_keys = ON;")?;
    connection
        .execute_batch(&format!("PRAGMA journal_mode = {};", config.journal_mode.pragma_value()))?;
    connection
        .execute_batch(&format!("PRAGMA synchronous = {};", config.sync_mode.pragma_value()))?;
    connection.busy_timeout(std::time::Duration::from_millis(config.busy_timeout_ms))?;
    Ok(())
}

/// Initializes the `SQLite` schema or validates existing version.
fn initialize_schema(connection: &mut Connection) -> Result<(), SqliteStoreError> {
    let tx = connection.transaction()?;
    tx.execute_batch("CREATE TABLE IF NOT EXISTS store_meta (version INTEGER NOT NULL);")?;
    let version: Option<i64> = tx
        .query_row("SELECT version FROM store_meta LIMIT 1", params![], |row| row.get(0))
        .optional()?;
    match version {
        None => {
            tx.execute("INSERT INTO store_meta (version) VALUES (?1)", params![SCHEMA_VERSION])?;
            tx.execute_batch(
                "CREATE TABLE IF NOT EXISTS companies (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    name TEXT NOT NULL,
                    created_by TEXT,
                    created_at INTEGER NOT NULL,
                    updated_at INTEGER NOT NULL
                );",
            )?;
        }
        Some(value) if value == SCHEMA_VERSION => {}
        Some(value) => {
            return Err(SqliteStoreError::VersionMismatch(format!(
                "unsupported schema version: {value}"
            )));
        }
    }
    tx.commit()?;
    Ok(())
}

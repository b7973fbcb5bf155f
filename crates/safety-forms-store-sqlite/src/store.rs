// crates/safety-forms-store-sqlite/src/store.rs
// ============================================================================
// Module: SQLite Form Store
// Description: Durable FormStore backed by SQLite.
// Purpose: Run descriptor-driven inserts and the join + aggregate read.
// Dependencies: safety-forms-core, rusqlite, serde, serde_json, thiserror, tracing
// ============================================================================

//! ## Overview
//! [`SqliteFormStore`] serializes access to one connection through a mutex.
//! Each trait call executes exactly one statement, so a master row written
//! before a failed items insert stays committed. The filtered read returns
//! the children aggregate as the JSON text produced by `json_group_array`;
//! callers normalize it.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::time::Duration;

use rusqlite::Connection;
use rusqlite::OpenFlags;
use rusqlite::OptionalExtension;
use rusqlite::params;
use rusqlite::params_from_iter;
use rusqlite::types::Value as SqlValue;
use rusqlite::types::ValueRef;
use safety_forms_core::CREATED_AT_COLUMN;
use safety_forms_core::ColumnSpec;
use safety_forms_core::ColumnType;
use safety_forms_core::FieldValue;
use safety_forms_core::FormKind;
use safety_forms_core::FormRow;
use safety_forms_core::FormSchema;
use safety_forms_core::FormStore;
use safety_forms_core::ITEMS_FIELD;
use safety_forms_core::MASTER_ID_COLUMN;
use safety_forms_core::RecordId;
use safety_forms_core::StoreError;
use safety_forms_core::UserRecord;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Number;
use serde_json::Value;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// `SQLite` schema version for the store.
const SCHEMA_VERSION: i64 = 1;
/// Default busy timeout (ms).
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
/// Maximum length of a single path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum bound parameters in one statement for the bundled `SQLite`.
const MAX_BOUND_PARAMETERS: usize = 32_766;
/// Date format applied to date columns at query time.
const DATE_FORMAT: &str = "%Y-%m-%d";
/// Timestamp format applied to the creation timestamp at query time.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ============================================================================
// SECTION: Config
// ============================================================================

/// `SQLite` journal mode configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteStoreMode {
    /// WAL journal mode.
    #[default]
    Wal,
    /// Delete journal mode.
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
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteSyncMode {
    /// Full synchronous mode.
    #[default]
    Full,
    /// Normal synchronous mode.
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

/// Configuration for the `SQLite` form store.
///
/// # Invariants
/// - `path` must resolve to a file path (not a directory).
/// - `busy_timeout_ms` is interpreted as milliseconds.
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
    /// Creates a config for `path` with default pragmas.
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

// ============================================================================
// SECTION: Errors
// ============================================================================

/// `SQLite` store errors.
#[derive(Debug, Error, Clone)]
pub enum SqliteStoreError {
    /// Store I/O error.
    #[error("sqlite store io error: {0}")]
    Io(String),
    /// `SQLite` engine error.
    #[error("sqlite store db error: {0}")]
    Db(String),
    /// Store schema version mismatch.
    #[error("sqlite store version mismatch: {0}")]
    VersionMismatch(String),
    /// Invalid store data.
    #[error("sqlite store invalid data: {0}")]
    Invalid(String),
}

impl From<SqliteStoreError> for StoreError {
    fn from(error: SqliteStoreError) -> Self {
        match error {
            SqliteStoreError::Io(message) => Self::Io(message),
            SqliteStoreError::Db(message) => Self::Store(message),
            SqliteStoreError::VersionMismatch(message) => Self::VersionMismatch(message),
            SqliteStoreError::Invalid(message) => Self::Invalid(message),
        }
    }
}

/// Maps an engine error into a store error.
#[allow(clippy::needless_pass_by_value, reason = "Used directly as a map_err callback.")]
fn db_error(err: rusqlite::Error) -> SqliteStoreError {
    SqliteStoreError::Db(err.to_string())
}

// ============================================================================
// SECTION: Store
// ============================================================================

/// `SQLite`-backed form store.
///
/// # Invariants
/// - Connection access is serialized through a mutex.
/// - No statement is wrapped in an explicit transaction.
#[derive(Clone)]
pub struct SqliteFormStore {
    /// Store configuration.
    config: SqliteStoreConfig,
    /// Shared connection.
    connection: Arc<Mutex<Connection>>,
}

impl SqliteFormStore {
    /// Opens the store, creating the schema when the file is new.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the database cannot be opened or
    /// initialized, or when it carries an unknown schema version.
    pub fn new(config: SqliteStoreConfig) -> Result<Self, SqliteStoreError> {
        validate_store_path(&config.path)?;
        ensure_parent_dir(&config.path)?;
        let mut connection = open_connection(&config)?;
        initialize_schema(&mut connection)?;
        tracing::info!(path = %config.path.display(), version = SCHEMA_VERSION, "sqlite form store opened");
        Ok(Self {
            config,
            connection: Arc::new(Mutex::new(connection)),
        })
    }

    /// Returns the store configuration.
    #[must_use]
    pub const fn config(&self) -> &SqliteStoreConfig {
        &self.config
    }

    /// Locks the shared connection.
    fn lock(&self) -> Result<MutexGuard<'_, Connection>, SqliteStoreError> {
        self.connection
            .lock()
            .map_err(|_| SqliteStoreError::Io("sqlite connection mutex poisoned".to_string()))
    }

    /// Executes one write statement and returns the affected row count.
    fn execute(&self, sql: &str, values: Vec<SqlValue>) -> Result<usize, SqliteStoreError> {
        tracing::debug!(sql, params = ?values, "executing statement");
        let connection = self.lock()?;
        let changed = connection.execute(sql, params_from_iter(values)).map_err(|err| {
            tracing::error!(sql, error = %err, "statement failed");
            db_error(err)
        })?;
        tracing::debug!(sql, changed, "statement succeeded");
        Ok(changed)
    }

    /// Executes one insert and returns the generated row id.
    fn insert(&self, sql: &str, values: Vec<SqlValue>) -> Result<RecordId, SqliteStoreError> {
        tracing::debug!(sql, params = ?values, "executing insert");
        let connection = self.lock()?;
        connection.execute(sql, params_from_iter(values)).map_err(|err| {
            tracing::error!(sql, error = %err, "insert failed");
            db_error(err)
        })?;
        let id = RecordId::new(connection.last_insert_rowid());
        drop(connection);
        tracing::debug!(sql, id = %id, "insert succeeded");
        Ok(id)
    }

    /// Runs the filtered join + aggregate read for one form kind.
    fn query_masters(
        &self,
        schema: &FormSchema,
        empresa: &str,
        fecha: &str,
    ) -> Result<Vec<FormRow>, SqliteStoreError> {
        let sql = filter_sql(schema);
        tracing::debug!(sql = %sql, empresa, fecha, "executing filter query");
        let connection = self.lock()?;
        let mut statement = connection.prepare(&sql).map_err(db_error)?;
        let columns: Vec<String> =
            statement.column_names().into_iter().map(ToString::to_string).collect();
        let mut rows = statement.query(params![empresa, fecha]).map_err(db_error)?;
        let mut output = Vec::new();
        while let Some(row) = rows.next().map_err(db_error)? {
            let mut record = Map::new();
            for (index, name) in columns.iter().enumerate() {
                let value = row.get_ref(index).map_err(db_error)?;
                record.insert(name.clone(), column_json(name, value)?);
            }
            output.push(record);
        }
        tracing::debug!(rows = output.len(), "filter query succeeded");
        Ok(output)
    }
}

impl FormStore for SqliteFormStore {
    fn max_item_rows(&self, schema: &FormSchema) -> Option<usize> {
        Some(max_item_rows(schema))
    }

    fn insert_master(
        &self,
        schema: &FormSchema,
        values: &[FieldValue],
    ) -> Result<RecordId, StoreError> {
        check_arity(schema.master_table, schema.master_columns, values)?;
        let sql = insert_sql(schema.master_table, &column_names(schema.master_columns), 1);
        Ok(self.insert(&sql, values.iter().map(sql_value).collect())?)
    }

    fn insert_items(
        &self,
        schema: &FormSchema,
        master_id: RecordId,
        rows: &[Vec<FieldValue>],
    ) -> Result<usize, StoreError> {
        if rows.is_empty() {
            return Ok(0);
        }
        for row in rows {
            check_arity(schema.items_table, schema.item_columns, row)?;
        }
        let mut columns = vec![MASTER_ID_COLUMN];
        columns.extend(column_names(schema.item_columns));
        if rows.len() > max_item_rows(schema) {
            return Err(SqliteStoreError::Invalid(format!(
                "{} rows exceed the bound parameter limit",
                rows.len()
            ))
            .into());
        }
        let sql = insert_sql(schema.items_table, &columns, rows.len());
        let values = rows
            .iter()
            .flat_map(|row| {
                std::iter::once(SqlValue::Integer(master_id.get())).chain(row.iter().map(sql_value))
            })
            .collect();
        Ok(self.execute(&sql, values)?)
    }

    fn filter_masters(
        &self,
        schema: &FormSchema,
        empresa: &str,
        fecha: &str,
    ) -> Result<Vec<FormRow>, StoreError> {
        Ok(self.query_masters(schema, empresa, fecha)?)
    }

    fn insert_company(&self, nombre: &str) -> Result<RecordId, StoreError> {
        let sql = "INSERT INTO empresa (nombre) VALUES (?1)";
        Ok(self.insert(sql, vec![SqlValue::Text(nombre.to_string())])?)
    }

    fn find_user(&self, nombre: &str, password: &str) -> Result<Option<UserRecord>, StoreError> {
        let sql = "SELECT id, nombre, rol FROM usuarios WHERE nombre = ?1 AND password = ?2 LIMIT 1";
        tracing::debug!(sql, nombre, "executing user lookup");
        let connection = self.lock()?;
        let user = connection
            .query_row(sql, params![nombre, password], |row| {
                Ok(UserRecord {
                    id: RecordId::new(row.get(0)?),
                    nombre: row.get(1)?,
                    rol: row.get(2)?,
                })
            })
            .optional()
            .map_err(|err| {
                tracing::error!(sql, error = %err, "user lookup failed");
                db_error(err)
            })?;
        drop(connection);
        tracing::debug!(sql, found = user.is_some(), "user lookup succeeded");
        Ok(user)
    }

    fn insert_user(&self, nombre: &str, password: &str, rol: &str) -> Result<RecordId, StoreError> {
        let sql = "INSERT INTO usuarios (nombre, password, rol) VALUES (?1, ?2, ?3)";
        tracing::debug!(sql, nombre, rol, "executing user insert");
        let connection = self.lock()?;
        connection.execute(sql, params![nombre, password, rol]).map_err(db_error)?;
        let id = RecordId::new(connection.last_insert_rowid());
        drop(connection);
        Ok(id)
    }
}

// ============================================================================
// SECTION: SQL Builders
// ============================================================================

/// Item rows that fit in one insert: each row binds `maestro_id` plus the
/// item columns.
const fn max_item_rows(schema: &FormSchema) -> usize {
    MAX_BOUND_PARAMETERS / (schema.item_columns.len() + 1)
}

/// Returns the column names of a descriptor slice.
fn column_names(columns: &[ColumnSpec]) -> Vec<&'static str> {
    columns.iter().map(|column| column.name).collect()
}

/// Builds a multi-row insert with numbered placeholders.
fn insert_sql(table: &str, columns: &[&str], rows: usize) -> String {
    let width = columns.len();
    let groups: Vec<String> = (0 .. rows)
        .map(|row| {
            let first = row * width + 1;
            let placeholders: Vec<String> =
                (first .. first + width).map(|index| format!("?{index}")).collect();
            format!("({})", placeholders.join(", "))
        })
        .collect();
    format!("INSERT INTO {table} ({}) VALUES {}", columns.join(", "), groups.join(", "))
}

/// Builds the join + aggregate read for a form kind.
///
/// Dates and the creation timestamp are formatted as fixed-width text.
/// Parents without children aggregate to `[]` through the `FILTER` clause.
fn filter_sql(schema: &FormSchema) -> String {
    let mut select = vec!["m.id AS id".to_string()];
    for column in schema.master_columns {
        let name = column.name;
        select.push(match column.column_type {
            ColumnType::Date => format!("strftime('{DATE_FORMAT}', m.{name}) AS {name}"),
            ColumnType::Text | ColumnType::Integer | ColumnType::Real => {
                format!("m.{name} AS {name}")
            }
        });
    }
    select.push(format!(
        "strftime('{TIMESTAMP_FORMAT}', m.{CREATED_AT_COLUMN}) AS {CREATED_AT_COLUMN}"
    ));
    let pairs: Vec<String> =
        schema.item_columns.iter().map(|column| format!("'{0}', i.{0}", column.name)).collect();
    select.push(format!(
        "json_group_array(json_object({})) FILTER (WHERE i.id IS NOT NULL) AS {ITEMS_FIELD}",
        pairs.join(", ")
    ));
    format!(
        "SELECT {} FROM {} m LEFT JOIN {} i ON i.{MASTER_ID_COLUMN} = m.id WHERE m.empresa = ?1 \
         AND date(m.{}) = ?2 GROUP BY m.id ORDER BY m.id",
        select.join(", "),
        schema.master_table,
        schema.items_table,
        schema.date_column
    )
}

/// Returns the declared `SQLite` type for a column.
const fn sql_type(column_type: ColumnType) -> &'static str {
    match column_type {
        ColumnType::Text | ColumnType::Date => "TEXT",
        ColumnType::Integer => "INTEGER",
        ColumnType::Real => "REAL",
    }
}

/// Renders column definitions for a descriptor slice.
fn column_definitions(columns: &[ColumnSpec]) -> String {
    columns
        .iter()
        .map(|column| {
            let null = if column.not_null { " NOT NULL" } else { "" };
            format!(",\n    {} {}{null}", column.name, sql_type(column.column_type))
        })
        .collect()
}

/// Builds the DDL for one form kind's master and items tables.
fn form_tables_ddl(schema: &FormSchema) -> String {
    format!(
        "CREATE TABLE IF NOT EXISTS {master} (
    id INTEGER PRIMARY KEY AUTOINCREMENT{master_columns},
    {CREATED_AT_COLUMN} TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
);
CREATE INDEX IF NOT EXISTS idx_{master}_empresa ON {master} (empresa);
CREATE TABLE IF NOT EXISTS {items} (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    {MASTER_ID_COLUMN} INTEGER NOT NULL REFERENCES {master}(id){item_columns}
);
CREATE INDEX IF NOT EXISTS idx_{items}_{MASTER_ID_COLUMN} ON {items} ({MASTER_ID_COLUMN});
",
        master = schema.master_table,
        items = schema.items_table,
        master_columns = column_definitions(schema.master_columns),
        item_columns = column_definitions(schema.item_columns),
    )
}

// ============================================================================
// SECTION: Value Conversion
// ============================================================================

/// Converts a field value into an owned `SQLite` value.
fn sql_value(value: &FieldValue) -> SqlValue {
    match value {
        FieldValue::Null => SqlValue::Null,
        FieldValue::Text(text) => SqlValue::Text(text.clone()),
        FieldValue::Integer(number) => SqlValue::Integer(*number),
        FieldValue::Real(number) => SqlValue::Real(*number),
    }
}

/// Converts a result column into JSON.
fn column_json(name: &str, value: ValueRef<'_>) -> Result<Value, SqliteStoreError> {
    Ok(match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(number) => Value::Number(Number::from(number)),
        ValueRef::Real(number) => Number::from_f64(number).map_or(Value::Null, Value::Number),
        ValueRef::Text(bytes) => Value::String(
            std::str::from_utf8(bytes)
                .map_err(|_| SqliteStoreError::Invalid(format!("column {name} is not utf-8")))?
                .to_string(),
        ),
        ValueRef::Blob(_) => {
            return Err(SqliteStoreError::Invalid(format!("column {name} holds a blob")));
        }
    })
}

/// Validates that a row matches its table layout.
fn check_arity(
    table: &str,
    columns: &[ColumnSpec],
    values: &[FieldValue],
) -> Result<(), SqliteStoreError> {
    if columns.len() == values.len() {
        return Ok(());
    }
    Err(SqliteStoreError::Invalid(format!(
        "{table} expects {} values, got {}",
        columns.len(),
        values.len()
    )))
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

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
    if path.as_os_str().is_empty() {
        return Err(SqliteStoreError::Invalid("store path must not be empty".to_string()));
    }
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
    if path.is_dir() {
        return Err(SqliteStoreError::Invalid(
            "store path must be a file, not a directory".to_string(),
        ));
    }
    Ok(())
}

/// Opens an `SQLite` connection.
fn open_connection(config: &SqliteStoreConfig) -> Result<Connection, SqliteStoreError> {
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_CREATE
        | OpenFlags::SQLITE_OPEN_FULL_MUTEX;
    let connection = Connection::open_with_flags(&config.path, flags).map_err(db_error)?;
    apply_pragmas(&connection, config)?;
    Ok(connection)
}

/// Applies connection pragmas.
fn apply_pragmas(
    connection: &Connection,
    config: &SqliteStoreConfig,
) -> Result<(), SqliteStoreError> {
    connection.execute_batch("PRAGMA foreign_keys = ON;").map_err(db_error)?;
    connection
        .execute_batch(&format!("PRAGMA journal_mode = {};", config.journal_mode.pragma_value()))
        .map_err(db_error)?;
    connection
        .execute_batch(&format!("PRAGMA synchronous = {};", config.sync_mode.pragma_value()))
        .map_err(db_error)?;
    connection.busy_timeout(Duration::from_millis(config.busy_timeout_ms)).map_err(db_error)?;
    Ok(())
}

/// Initializes the schema or validates the existing version.
fn initialize_schema(connection: &mut Connection) -> Result<(), SqliteStoreError> {
    let tx = connection.transaction().map_err(db_error)?;
    tx.execute_batch("CREATE TABLE IF NOT EXISTS store_meta (version INTEGER NOT NULL);")
        .map_err(db_error)?;
    let version: Option<i64> = tx
        .query_row("SELECT version FROM store_meta LIMIT 1", params![], |row| row.get(0))
        .optional()
        .map_err(db_error)?;
    match version {
        None => {
            tx.execute("INSERT INTO store_meta (version) VALUES (?1)", params![SCHEMA_VERSION])
                .map_err(db_error)?;
            tx.execute_batch(
                "CREATE TABLE IF NOT EXISTS usuarios (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    nombre TEXT NOT NULL,
                    password TEXT NOT NULL,
                    rol TEXT NOT NULL
                );
                CREATE INDEX IF NOT EXISTS idx_usuarios_nombre ON usuarios (nombre);
                CREATE TABLE IF NOT EXISTS empresa (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    nombre TEXT NOT NULL
                );",
            )
            .map_err(db_error)?;
            for kind in FormKind::ALL {
                tx.execute_batch(&form_tables_ddl(kind.schema())).map_err(db_error)?;
            }
        }
        Some(value) if value == SCHEMA_VERSION => {}
        Some(value) => {
            return Err(SqliteStoreError::VersionMismatch(format!(
                "unsupported schema version: {value}"
            )));
        }
    }
    tx.commit().map_err(db_error)?;
    Ok(())
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, reason = "Test-only assertions.")]

    use safety_forms_core::BOTIQUIN_SCHEMA;
    use safety_forms_core::CONTROL_OPERACIONAL_SCHEMA;

    use super::filter_sql;
    use super::form_tables_ddl;
    use super::insert_sql;

    #[test]
    fn insert_sql_numbers_placeholders_across_rows() {
        let sql = insert_sql("botiquin_items", &["maestro_id", "elemento"], 2);
        assert_eq!(
            sql,
            "INSERT INTO botiquin_items (maestro_id, elemento) VALUES (?1, ?2), (?3, ?4)"
        );
        assert_eq!(
            insert_sql("empresa", &["nombre"], 1),
            "INSERT INTO empresa (nombre) VALUES (?1)"
        );
    }

    #[test]
    fn filter_sql_formats_dates_and_filters_empty_aggregates() {
        let sql = filter_sql(&BOTIQUIN_SCHEMA);
        assert!(sql.contains("strftime('%Y-%m-%d', m.fecha) AS fecha"));
        assert!(sql.contains("strftime('%Y-%m-%d %H:%M:%S', m.created_at) AS created_at"));
        assert!(sql.contains("FILTER (WHERE i.id IS NOT NULL) AS items"));
        assert!(sql.contains("date(m.fecha) = ?2"));
        assert!(sql.ends_with("GROUP BY m.id ORDER BY m.id"));
    }

    #[test]
    fn ddl_declares_not_null_and_foreign_key() {
        let ddl = form_tables_ddl(&CONTROL_OPERACIONAL_SCHEMA);
        assert!(ddl.contains("indice_co REAL NOT NULL"));
        assert!(ddl.contains("maestro_id INTEGER NOT NULL REFERENCES control_operacional_maestro(id)"));
        assert!(ddl.contains("created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP"));
    }
}

// crates/safety-forms-core/src/runtime/store.rs
// ============================================================================
// Module: Safety Forms In-Memory Store
// Description: In-memory form store and shared store wrapper.
// Purpose: Deterministic store for tests and local runs without a database.
// Dependencies: time, crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! [`InMemoryFormStore`] keeps tables in process memory. Unlike the SQLite
//! backend it returns the `items` aggregate already structured, and NULL for
//! masters without children, the way some drivers report an empty
//! aggregate. It also enforces NOT NULL columns and the master foreign key
//! so write failures behave like a real database.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;

use serde_json::Map;
use serde_json::Value;
use time::Date;
use time::OffsetDateTime;
use time::macros::format_description;

use crate::core::CREATED_AT_COLUMN;
use crate::core::ColumnSpec;
use crate::core::ColumnType;
use crate::core::CompanyRecord;
use crate::core::FieldValue;
use crate::core::FormRow;
use crate::core::FormSchema;
use crate::core::ITEMS_FIELD;
use crate::core::RecordId;
use crate::core::UserRecord;
use crate::interfaces::FormStore;
use crate::interfaces::StoreError;

// ============================================================================
// SECTION: In-Memory Store
// ============================================================================

/// Table name used for company id allocation.
const COMPANY_TABLE: &str = "empresa";
/// Table name used for user id allocation.
const USER_TABLE: &str = "usuarios";

/// Stored master row.
#[derive(Debug, Clone)]
struct MemoryMaster {
    /// Generated identifier.
    id: RecordId,
    /// Column values in descriptor order.
    values: Vec<FieldValue>,
    /// Creation timestamp text.
    created_at: String,
}

/// Stored item row.
#[derive(Debug, Clone)]
struct MemoryItem {
    /// Owning master identifier.
    master_id: RecordId,
    /// Column values in descriptor order.
    values: Vec<FieldValue>,
}

/// Stored user row.
#[derive(Debug, Clone)]
struct MemoryUser {
    /// Public user record.
    record: UserRecord,
    /// Plaintext password.
    password: String,
}

/// All in-memory tables.
#[derive(Debug, Default)]
struct MemoryTables {
    /// Last identifier handed out per table.
    sequences: BTreeMap<&'static str, i64>,
    /// Master rows keyed by master table name.
    masters: BTreeMap<&'static str, Vec<MemoryMaster>>,
    /// Item rows keyed by items table name.
    items: BTreeMap<&'static str, Vec<MemoryItem>>,
    /// Registered companies.
    companies: Vec<CompanyRecord>,
    /// Registered users.
    users: Vec<MemoryUser>,
}

impl MemoryTables {
    /// Allocates the next identifier for a table.
    fn allocate(&mut self, table: &'static str) -> RecordId {
        let sequence = self.sequences.entry(table).or_insert(0);
        *sequence += 1;
        RecordId::new(*sequence)
    }
}

/// In-memory form store for tests and examples.
#[derive(Debug, Default, Clone)]
pub struct InMemoryFormStore {
    /// Tables protected by a mutex.
    tables: Arc<Mutex<MemoryTables>>,
    /// When set, every items insert fails.
    fail_items: bool,
    /// Maximum item rows accepted per submission.
    item_row_limit: Option<usize>,
}

impl InMemoryFormStore {
    /// Creates an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty store whose items inserts always fail.
    #[must_use]
    pub fn with_failing_items() -> Self {
        Self {
            fail_items: true,
            ..Self::default()
        }
    }

    /// Creates an empty store that accepts at most `limit` items per
    /// submission.
    #[must_use]
    pub fn with_item_row_limit(limit: usize) -> Self {
        Self {
            item_row_limit: Some(limit),
            ..Self::default()
        }
    }

    /// Locks the tables.
    fn lock(&self) -> Result<std::sync::MutexGuard<'_, MemoryTables>, StoreError> {
        self.tables.lock().map_err(|_| StoreError::Store("form store mutex poisoned".to_string()))
    }
}

impl FormStore for InMemoryFormStore {
    fn max_item_rows(&self, _schema: &FormSchema) -> Option<usize> {
        self.item_row_limit
    }

    fn insert_master(
        &self,
        schema: &FormSchema,
        values: &[FieldValue],
    ) -> Result<RecordId, StoreError> {
        check_row(schema.master_table, schema.master_columns, values)?;
        let created_at = now_timestamp()?;
        let mut tables = self.lock()?;
        let id = tables.allocate(schema.master_table);
        tables.masters.entry(schema.master_table).or_default().push(MemoryMaster {
            id,
            values: values.to_vec(),
            created_at,
        });
        drop(tables);
        Ok(id)
    }

    fn insert_items(
        &self,
        schema: &FormSchema,
        master_id: RecordId,
        rows: &[Vec<FieldValue>],
    ) -> Result<usize, StoreError> {
        if self.fail_items {
            return Err(StoreError::Store(format!("no such table: {}", schema.items_table)));
        }
        for row in rows {
            check_row(schema.items_table, schema.item_columns, row)?;
        }
        let mut tables = self.lock()?;
        let master_exists = tables
            .masters
            .get(schema.master_table)
            .is_some_and(|masters| masters.iter().any(|master| master.id == master_id));
        if !master_exists {
            return Err(StoreError::Store("FOREIGN KEY constraint failed".to_string()));
        }
        let stored = tables.items.entry(schema.items_table).or_default();
        stored.extend(rows.iter().map(|row| MemoryItem {
            master_id,
            values: row.clone(),
        }));
        drop(tables);
        Ok(rows.len())
    }

    fn filter_masters(
        &self,
        schema: &FormSchema,
        empresa: &str,
        fecha: &str,
    ) -> Result<Vec<FormRow>, StoreError> {
        let empresa_index = schema
            .master_index("empresa")
            .ok_or_else(|| StoreError::Invalid("schema has no empresa column".to_string()))?;
        let date_index = schema.master_index(schema.date_column).ok_or_else(|| {
            StoreError::Invalid(format!("schema has no {} column", schema.date_column))
        })?;
        let tables = self.lock()?;
        let no_items = Vec::new();
        let no_masters = Vec::new();
        let children = tables.items.get(schema.items_table).unwrap_or(&no_items);
        let rows = tables
            .masters
            .get(schema.master_table)
            .unwrap_or(&no_masters)
            .iter()
            .filter(|master| {
                let same_company = matches!(
                    master.values.get(empresa_index),
                    Some(FieldValue::Text(name)) if name == empresa
                );
                same_company
                    && master.values.get(date_index).and_then(calendar_day).as_deref()
                        == Some(fecha)
            })
            .map(|master| master_row(schema, master, children))
            .collect();
        drop(tables);
        Ok(rows)
    }

    fn insert_company(&self, nombre: &str) -> Result<RecordId, StoreError> {
        let mut tables = self.lock()?;
        let id = tables.allocate(COMPANY_TABLE);
        tables.companies.push(CompanyRecord {
            id,
            nombre: nombre.to_string(),
        });
        drop(tables);
        Ok(id)
    }

    fn find_user(&self, nombre: &str, password: &str) -> Result<Option<UserRecord>, StoreError> {
        let tables = self.lock()?;
        Ok(tables
            .users
            .iter()
            .find(|user| user.record.nombre == nombre && user.password == password)
            .map(|user| user.record.clone()))
    }

    fn insert_user(&self, nombre: &str, password: &str, rol: &str) -> Result<RecordId, StoreError> {
        let mut tables = self.lock()?;
        let id = tables.allocate(USER_TABLE);
        tables.users.push(MemoryUser {
            record: UserRecord {
                id,
                nombre: nombre.to_string(),
                rol: rol.to_string(),
            },
            password: password.to_string(),
        });
        drop(tables);
        Ok(id)
    }
}

/// Validates arity and NOT NULL columns of a row.
fn check_row(
    table: &str,
    columns: &[ColumnSpec],
    values: &[FieldValue],
) -> Result<(), StoreError> {
    if columns.len() != values.len() {
        return Err(StoreError::Invalid(format!(
            "{table} expects {} values, got {}",
            columns.len(),
            values.len()
        )));
    }
    for (column, value) in columns.iter().zip(values) {
        if column.not_null && *value == FieldValue::Null {
            return Err(StoreError::Store(format!(
                "NOT NULL constraint failed: {table}.{}",
                column.name
            )));
        }
    }
    Ok(())
}

/// Builds the read-back row for a master.
fn master_row(schema: &FormSchema, master: &MemoryMaster, children: &[MemoryItem]) -> FormRow {
    let mut row = Map::new();
    row.insert("id".to_string(), Value::from(master.id.get()));
    for (column, value) in schema.master_columns.iter().zip(&master.values) {
        let json = match column.column_type {
            ColumnType::Date => calendar_day(value).map_or(Value::Null, Value::String),
            ColumnType::Text | ColumnType::Integer | ColumnType::Real => value.to_json(),
        };
        row.insert(column.name.to_string(), json);
    }
    row.insert(CREATED_AT_COLUMN.to_string(), Value::String(master.created_at.clone()));
    let items: Vec<Value> = children
        .iter()
        .filter(|item| item.master_id == master.id)
        .map(|item| {
            let object: Map<String, Value> = schema
                .item_columns
                .iter()
                .zip(&item.values)
                .map(|(column, value)| (column.name.to_string(), value.to_json()))
                .collect();
            Value::Object(object)
        })
        .collect();
    let aggregate = if items.is_empty() { Value::Null } else { Value::Array(items) };
    row.insert(ITEMS_FIELD.to_string(), aggregate);
    row
}

/// Truncates a date or datetime text value to `YYYY-MM-DD`.
fn calendar_day(value: &FieldValue) -> Option<String> {
    let FieldValue::Text(text) = value else {
        return None;
    };
    let format = format_description!("[year]-[month]-[day]");
    let date = Date::parse(text.get(..10)?, format).ok()?;
    date.format(format).ok()
}

/// Returns the current UTC time as `YYYY-MM-DD HH:MM:SS`.
fn now_timestamp() -> Result<String, StoreError> {
    OffsetDateTime::now_utc()
        .format(format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"))
        .map_err(|err| StoreError::Store(err.to_string()))
}

// ============================================================================
// SECTION: Shared Store Wrapper
// ============================================================================

/// Shared form store backed by an `Arc` trait object.
#[derive(Clone)]
pub struct SharedFormStore {
    /// Inner store implementation.
    inner: Arc<dyn FormStore + Send + Sync>,
}

impl SharedFormStore {
    /// Wraps a form store in a shared, clonable wrapper.
    #[must_use]
    pub fn from_store(store: impl FormStore + Send + Sync + 'static) -> Self {
        Self {
            inner: Arc::new(store),
        }
    }

    /// Wraps an existing shared store.
    #[must_use]
    pub const fn new(store: Arc<dyn FormStore + Send + Sync>) -> Self {
        Self {
            inner: store,
        }
    }
}

impl FormStore for SharedFormStore {
    fn max_item_rows(&self, schema: &FormSchema) -> Option<usize> {
        self.inner.max_item_rows(schema)
    }

    fn insert_master(
        &self,
        schema: &FormSchema,
        values: &[FieldValue],
    ) -> Result<RecordId, StoreError> {
        self.inner.insert_master(schema, values)
    }

    fn insert_items(
        &self,
        schema: &FormSchema,
        master_id: RecordId,
        rows: &[Vec<FieldValue>],
    ) -> Result<usize, StoreError> {
        self.inner.insert_items(schema, master_id, rows)
    }

    fn filter_masters(
        &self,
        schema: &FormSchema,
        empresa: &str,
        fecha: &str,
    ) -> Result<Vec<FormRow>, StoreError> {
        self.inner.filter_masters(schema, empresa, fecha)
    }

    fn insert_company(&self, nombre: &str) -> Result<RecordId, StoreError> {
        self.inner.insert_company(nombre)
    }

    fn find_user(&self, nombre: &str, password: &str) -> Result<Option<UserRecord>, StoreError> {
        self.inner.find_user(nombre, password)
    }

    fn insert_user(&self, nombre: &str, password: &str, rol: &str) -> Result<RecordId, StoreError> {
        self.inner.insert_user(nombre, password, rol)
    }
}

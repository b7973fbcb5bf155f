// crates/safety-forms-core/src/interfaces/mod.rs
// ============================================================================
// Module: Safety Forms Interfaces
// Description: Persistence contract for forms, companies, and users.
// Purpose: Decouple the form service from any particular database.
// Dependencies: thiserror, crate::core
// ============================================================================

//! ## Overview
//! [`FormStore`] is the only seam between the service and the database.
//! Methods are blocking; async callers move them onto a blocking worker.
//! Implementations perform exactly one statement per call and never wrap
//! calls in a transaction, so a master row survives a failed items insert.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::core::FieldValue;
use crate::core::FormRow;
use crate::core::FormSchema;
use crate::core::RecordId;
use crate::core::UserRecord;

// ============================================================================
// SECTION: Store Errors
// ============================================================================

/// Form store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Store I/O error.
    #[error("form store io error: {0}")]
    Io(String),
    /// Store schema version is incompatible.
    #[error("form store version mismatch: {0}")]
    VersionMismatch(String),
    /// Values do not match the table layout.
    #[error("form store invalid data: {0}")]
    Invalid(String),
    /// Database engine reported an error.
    #[error("form store error: {0}")]
    Store(String),
}

// ============================================================================
// SECTION: Form Store
// ============================================================================

/// Persistence backend for form submissions, companies, and users.
pub trait FormStore {
    /// Returns the most item rows one submission of `schema` may carry, or
    /// `None` when the backend has no fixed limit.
    fn max_item_rows(&self, _schema: &FormSchema) -> Option<usize> {
        None
    }

    /// Inserts one master row and returns its generated identifier.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the insert fails.
    fn insert_master(&self, schema: &FormSchema, values: &[FieldValue])
    -> Result<RecordId, StoreError>;

    /// Inserts all item rows for a master in one statement and returns the
    /// number of rows written.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the insert fails.
    fn insert_items(
        &self,
        schema: &FormSchema,
        master_id: RecordId,
        rows: &[Vec<FieldValue>],
    ) -> Result<usize, StoreError>;

    /// Returns one row per master whose company equals `empresa` and whose
    /// date column falls on `fecha`, with children aggregated under `items`.
    /// The `items` value is backend-specific and is normalized by the caller.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the query fails.
    fn filter_masters(
        &self,
        schema: &FormSchema,
        empresa: &str,
        fecha: &str,
    ) -> Result<Vec<FormRow>, StoreError>;

    /// Inserts a company and returns its identifier.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the insert fails.
    fn insert_company(&self, nombre: &str) -> Result<RecordId, StoreError>;

    /// Looks up a user by exact name and password.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the query fails.
    fn find_user(&self, nombre: &str, password: &str) -> Result<Option<UserRecord>, StoreError>;

    /// Inserts a user and returns its identifier.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the insert fails.
    fn insert_user(&self, nombre: &str, password: &str, rol: &str)
    -> Result<RecordId, StoreError>;
}

// crates/safety-forms-core/src/runtime/service.rs
// ============================================================================
// Module: Safety Forms Service
// Description: Parent/child writes, filtered reads, login, and companies.
// Purpose: One generic operation per concern, parameterized by descriptors.
// Dependencies: thiserror, tracing, crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! [`FormService`] owns the injected [`FormStore`] and implements every
//! operation the HTTP surface exposes. A form write validates required
//! fields, inserts the master row, and only after that succeeds inserts all
//! children in one call. There is no transaction: when the children insert
//! fails the master row stays persisted and the error reports its id.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use thiserror::Error;

use crate::core::CompanyRecord;
use crate::core::FormKind;
use crate::core::FormRecord;
use crate::core::FormRow;
use crate::core::FormSubmission;
use crate::core::RecordId;
use crate::core::SubmissionError;
use crate::core::SubmitOutcome;
use crate::core::UserRecord;
use crate::core::normalize_rows;
use crate::interfaces::FormStore;
use crate::interfaces::StoreError;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Caller-facing classification of a [`FormError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Missing or invalid input; nothing was written.
    Client,
    /// Credentials did not match.
    Unauthenticated,
    /// Well-formed request with zero matching rows.
    NotFound,
    /// Database failure.
    Server,
}

/// Non-form operations, used to label errors and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// `POST /api/login`.
    Login,
    /// `GET /api/filtrar`.
    Filter,
    /// `POST /api/empresas`.
    RegisterCompany,
    /// CLI user creation.
    AddUser,
}

impl Operation {
    /// Returns the log label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Login => "login",
            Self::Filter => "filter",
            Self::RegisterCompany => "register_company",
            Self::AddUser => "add_user",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Form service errors.
#[derive(Debug, Error)]
pub enum FormError {
    /// A form submission lacked required master fields.
    #[error("{kind} submission missing required fields: {}", fields.join(", "))]
    MissingFields {
        /// Form kind being written.
        kind: FormKind,
        /// Absent or empty fields, in descriptor order.
        fields: Vec<&'static str>,
    },
    /// A non-form operation lacked required input.
    #[error("{operation} missing required input: {}", fields.join(", "))]
    MissingInput {
        /// Operation that failed.
        operation: Operation,
        /// Absent or empty inputs.
        fields: Vec<&'static str>,
    },
    /// A submission's derived fields could not be computed.
    #[error("{kind} submission rejected: {source}")]
    InvalidSubmission {
        /// Form kind being written.
        kind: FormKind,
        /// Reason the submission was rejected.
        source: SubmissionError,
    },
    /// A submission carried more items than the store writes in one insert.
    #[error("{kind} submission has {count} items; the store accepts at most {limit}")]
    TooManyItems {
        /// Form kind being written.
        kind: FormKind,
        /// Items submitted.
        count: usize,
        /// Store limit.
        limit: usize,
    },
    /// The read selector named no known form kind.
    #[error("invalid form type: {0}")]
    UnknownFormKind(String),
    /// No user matched the given name and password.
    #[error("invalid credentials")]
    InvalidCredentials,
    /// The filter matched no master rows.
    #[error("no {kind} records matched the filter")]
    NotFound {
        /// Form kind queried.
        kind: FormKind,
    },
    /// The master insert failed; no children were attempted.
    #[error("{kind} master insert failed: {source}")]
    MasterInsert {
        /// Form kind being written.
        kind: FormKind,
        /// Underlying store error.
        source: StoreError,
    },
    /// The children insert failed after the master was persisted.
    #[error("{kind} items insert failed for master {master_id}: {source}")]
    ItemsInsert {
        /// Form kind being written.
        kind: FormKind,
        /// Identifier of the persisted master row.
        master_id: RecordId,
        /// Underlying store error.
        source: StoreError,
    },
    /// The filtered read query failed.
    #[error("{kind} filter query failed: {source}")]
    Query {
        /// Form kind queried.
        kind: FormKind,
        /// Underlying store error.
        source: StoreError,
    },
    /// A login, company, or user statement failed.
    #[error("{operation} failed: {source}")]
    Store {
        /// Operation that failed.
        operation: Operation,
        /// Underlying store error.
        source: StoreError,
    },
}

impl FormError {
    /// Returns how the error should be reported to callers.
    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        match self {
            Self::MissingFields {
                ..
            }
            | Self::MissingInput {
                ..
            }
            | Self::InvalidSubmission {
                ..
            }
            | Self::TooManyItems {
                ..
            }
            | Self::UnknownFormKind(_) => ErrorClass::Client,
            Self::InvalidCredentials => ErrorClass::Unauthenticated,
            Self::NotFound {
                ..
            } => ErrorClass::NotFound,
            Self::MasterInsert {
                ..
            }
            | Self::ItemsInsert {
                ..
            }
            | Self::Query {
                ..
            }
            | Self::Store {
                ..
            } => ErrorClass::Server,
        }
    }
}

// ============================================================================
// SECTION: Requests
// ============================================================================

/// Read-path filter as received from the query string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterQuery {
    /// Company name, matched exactly.
    pub empresa: Option<String>,
    /// Calendar day, `YYYY-MM-DD`.
    pub fecha: Option<String>,
    /// Form kind selector.
    pub formulario: Option<String>,
}

// ============================================================================
// SECTION: Form Service
// ============================================================================

/// Form operations over an injected store.
#[derive(Debug, Clone)]
pub struct FormService<S> {
    /// Persistence backend.
    store: S,
}

impl<S: FormStore> FormService<S> {
    /// Creates a service over the given store.
    #[must_use]
    pub const fn new(store: S) -> Self {
        Self {
            store,
        }
    }

    /// Returns the underlying store.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Converts and writes a typed submission.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::InvalidSubmission`] when derived fields cannot
    /// be computed; otherwise see [`FormService::submit`].
    pub fn submit_form<F: FormSubmission>(&self, submission: F) -> Result<SubmitOutcome, FormError> {
        let record = submission.into_record().map_err(|source| {
            tracing::warn!(form = %F::KIND, error = %source, "rejecting invalid submission");
            FormError::InvalidSubmission {
                kind: F::KIND,
                source,
            }
        })?;
        self.submit(record)
    }

    /// Writes a master row followed by its children.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::MissingFields`] before any write when required
    /// fields are absent, [`FormError::TooManyItems`] before any write when
    /// the store cannot take every item in one insert,
    /// [`FormError::MasterInsert`] when the master insert fails, and
    /// [`FormError::ItemsInsert`] when the children insert fails.
    pub fn submit(&self, record: FormRecord) -> Result<SubmitOutcome, FormError> {
        let kind = record.kind;
        let schema = record.schema();
        let missing = record.missing_fields();
        if !missing.is_empty() {
            tracing::warn!(form = %kind, missing = ?missing, "rejecting submission with missing fields");
            return Err(FormError::MissingFields {
                kind,
                fields: missing,
            });
        }
        if let Some(limit) = self.store.max_item_rows(schema)
            && record.items.len() > limit
        {
            tracing::warn!(
                form = %kind,
                count = record.items.len(),
                limit,
                "rejecting submission with too many items"
            );
            return Err(FormError::TooManyItems {
                kind,
                count: record.items.len(),
                limit,
            });
        }
        let master_id = self.store.insert_master(schema, &record.master).map_err(|source| {
            tracing::error!(form = %kind, error = %source, "master insert failed");
            FormError::MasterInsert {
                kind,
                source,
            }
        })?;
        tracing::info!(form = %kind, master_id = %master_id, "master record inserted");
        if record.items.is_empty() {
            tracing::info!(form = %kind, master_id = %master_id, "submission carried no items");
            return Ok(SubmitOutcome {
                master_id,
                item_count: 0,
            });
        }
        let item_count =
            self.store.insert_items(schema, master_id, &record.items).map_err(|source| {
                tracing::error!(
                    form = %kind,
                    master_id = %master_id,
                    error = %source,
                    "items insert failed; master record remains"
                );
                FormError::ItemsInsert {
                    kind,
                    master_id,
                    source,
                }
            })?;
        tracing::info!(form = %kind, master_id = %master_id, item_count, "items inserted");
        Ok(SubmitOutcome {
            master_id,
            item_count,
        })
    }

    /// Validates the filter, dispatches on `formulario`, and runs the read.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::MissingInput`] when any parameter is absent,
    /// [`FormError::UnknownFormKind`] for an unknown selector, and the errors
    /// of [`FormService::filter_kind`].
    pub fn filter(&self, query: &FilterQuery) -> Result<Vec<FormRow>, FormError> {
        tracing::info!(
            empresa = ?query.empresa,
            fecha = ?query.fecha,
            formulario = ?query.formulario,
            "filter requested"
        );
        let (Some(empresa), Some(fecha), Some(formulario)) = (
            present(query.empresa.as_deref()),
            present(query.fecha.as_deref()),
            present(query.formulario.as_deref()),
        ) else {
            let fields = [
                ("empresa", &query.empresa),
                ("fecha", &query.fecha),
                ("formulario", &query.formulario),
            ]
            .into_iter()
            .filter(|(_, value)| present(value.as_deref()).is_none())
            .map(|(name, _)| name)
            .collect();
            return Err(missing_input(Operation::Filter, fields));
        };
        let kind = formulario.parse::<FormKind>().map_err(|err| {
            tracing::warn!(formulario = %err.0, "unknown form type");
            FormError::UnknownFormKind(err.0)
        })?;
        self.filter_kind(kind, empresa, fecha)
    }

    /// Reads every master of `kind` for a company and calendar day, with its
    /// children normalized under `items`.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::NotFound`] when no master matches and
    /// [`FormError::Query`] when the store fails.
    pub fn filter_kind(
        &self,
        kind: FormKind,
        empresa: &str,
        fecha: &str,
    ) -> Result<Vec<FormRow>, FormError> {
        let rows = self.store.filter_masters(kind.schema(), empresa, fecha).map_err(|source| {
            tracing::error!(form = %kind, error = %source, "filter query failed");
            FormError::Query {
                kind,
                source,
            }
        })?;
        if rows.is_empty() {
            tracing::info!(form = %kind, empresa, fecha, "filter matched no records");
            return Err(FormError::NotFound {
                kind,
            });
        }
        let rows = normalize_rows(rows);
        tracing::info!(form = %kind, rows = rows.len(), "filter returned records");
        Ok(rows)
    }

    /// Authenticates a user by plaintext name and password.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::MissingInput`] when either credential is absent,
    /// [`FormError::InvalidCredentials`] when nothing matches, and
    /// [`FormError::Store`] when the lookup fails.
    pub fn login(
        &self,
        nombre: Option<&str>,
        password: Option<&str>,
    ) -> Result<UserRecord, FormError> {
        tracing::info!(nombre = ?nombre, "login requested");
        let (Some(nombre), Some(password)) = (present(nombre), present(password)) else {
            let fields = [("nombre", nombre), ("password", password)]
                .into_iter()
                .filter(|(_, value)| present(*value).is_none())
                .map(|(name, _)| name)
                .collect();
            return Err(missing_input(Operation::Login, fields));
        };
        let user = self.store.find_user(nombre, password).map_err(|source| {
            tracing::error!(error = %source, "login lookup failed");
            FormError::Store {
                operation: Operation::Login,
                source,
            }
        })?;
        user.map_or_else(
            || {
                tracing::info!(nombre, "login rejected");
                Err(FormError::InvalidCredentials)
            },
            |user| {
                tracing::info!(user_id = %user.id, rol = %user.rol, "login accepted");
                Ok(user)
            },
        )
    }

    /// Registers a company. The name is stored exactly as given.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::MissingInput`] when the name is absent or blank
    /// and [`FormError::Store`] when the insert fails.
    pub fn register_company(&self, nombre: Option<&str>) -> Result<CompanyRecord, FormError> {
        tracing::info!(nombre = ?nombre, "company registration requested");
        let Some(nombre) = nombre.filter(|value| !value.trim().is_empty()) else {
            return Err(missing_input(Operation::RegisterCompany, vec!["nombre"]));
        };
        let id = self.store.insert_company(nombre).map_err(|source| {
            tracing::error!(error = %source, "company insert failed");
            FormError::Store {
                operation: Operation::RegisterCompany,
                source,
            }
        })?;
        tracing::info!(company_id = %id, nombre, "company registered");
        Ok(CompanyRecord {
            id,
            nombre: nombre.to_string(),
        })
    }

    /// Creates a user account.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::MissingInput`] when any input is blank and
    /// [`FormError::Store`] when the insert fails.
    pub fn add_user(&self, nombre: &str, password: &str, rol: &str) -> Result<UserRecord, FormError> {
        let fields: Vec<&'static str> = [("nombre", nombre), ("password", password), ("rol", rol)]
            .into_iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| name)
            .collect();
        if !fields.is_empty() {
            return Err(missing_input(Operation::AddUser, fields));
        }
        let id = self.store.insert_user(nombre, password, rol).map_err(|source| {
            tracing::error!(error = %source, "user insert failed");
            FormError::Store {
                operation: Operation::AddUser,
                source,
            }
        })?;
        tracing::info!(user_id = %id, nombre, rol, "user created");
        Ok(UserRecord {
            id,
            nombre: nombre.to_string(),
            rol: rol.to_string(),
        })
    }
}

/// Returns the value when it is present and non-empty.
fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.is_empty())
}

/// Builds and logs a missing-input error.
fn missing_input(operation: Operation, fields: Vec<&'static str>) -> FormError {
    tracing::warn!(operation = %operation, missing = ?fields, "rejecting request with missing input");
    FormError::MissingInput {
        operation,
        fields,
    }
}

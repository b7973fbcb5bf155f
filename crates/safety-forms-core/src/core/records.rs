// crates/safety-forms-core/src/core/records.rs
// ============================================================================
// Module: Safety Forms Account Records
// Description: Company and user rows returned by the service.
// Purpose: Typed payloads for login and company registration.
// Dependencies: serde, crate::core::identifiers
// ============================================================================

//! ## Overview
//! Companies and users live outside the form tables. They are matched by
//! name only; no foreign key links them to form submissions.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::RecordId;

// ============================================================================
// SECTION: Records
// ============================================================================

/// Authenticated user returned by login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    /// User row identifier.
    pub id: RecordId,
    /// User name.
    pub nombre: String,
    /// Role label.
    pub rol: String,
}

/// Registered company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyRecord {
    /// Company row identifier.
    pub id: RecordId,
    /// Company name as submitted.
    pub nombre: String,
}

/// Result of a parent/child write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SubmitOutcome {
    /// Identifier of the new master row.
    pub master_id: RecordId,
    /// Number of item rows written.
    pub item_count: usize,
}

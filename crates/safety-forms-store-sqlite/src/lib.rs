// crates/safety-forms-store-sqlite/src/lib.rs
// ============================================================================
// Module: SQLite Form Store
// Description: Durable FormStore backend using SQLite.
// Purpose: Persist form submissions, companies, and users.
// Dependencies: safety-forms-core, rusqlite
// ============================================================================

//! ## Overview
//! This crate provides a SQLite-backed [`safety_forms_core::FormStore`]. The
//! schema is generated from the form descriptors on first open and tracked
//! by version in a `store_meta` table.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use store::SqliteFormStore;
pub use store::SqliteStoreConfig;
pub use store::SqliteStoreError;
pub use store::SqliteStoreMode;
pub use store::SqliteSyncMode;

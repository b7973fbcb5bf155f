// crates/safety-forms-config/src/lib.rs
// ============================================================================
// Module: Safety Forms Config Library
// Description: Configuration model and validation.
// Purpose: Single source of truth for safety-forms.toml semantics.
// Dependencies: safety-forms-store-sqlite, serde, toml
// ============================================================================

//! ## Overview
//! `safety-forms-config` loads `safety-forms.toml` with strict size, path,
//! and encoding limits and validates every section before the server starts.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;

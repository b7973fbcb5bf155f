// crates/safety-forms-server/src/lib.rs
// ============================================================================
// Module: Safety Forms Server Library
// Description: HTTP server for the safety forms API.
// Purpose: Expose form writes, filtered reads, login, and companies over HTTP.
// Dependencies: axum, tokio, safety-forms-{core, config, store-sqlite}
// ============================================================================

//! ## Overview
//! [`FormsServer`] builds the configured store, wraps it in a
//! [`safety_forms_core::FormService`], and serves the JSON API with axum.
//! Store calls are blocking and run on the tokio blocking pool.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod api;
pub mod server;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use api::ApiError;
pub use api::MessageKey;
pub use server::FormsServer;
pub use server::FormsServerError;
pub use server::build_form_store;

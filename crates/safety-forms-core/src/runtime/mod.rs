// crates/safety-forms-core/src/runtime/mod.rs
// ============================================================================
// Module: Safety Forms Runtime
// Description: Form service and in-memory store.
// Purpose: Execute form writes and filtered reads against a form store.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! Runtime modules implement the parent/child write, the filtered read, and
//! the login and company operations on top of any [`crate::FormStore`].

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod service;
pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use service::ErrorClass;
pub use service::FilterQuery;
pub use service::FormError;
pub use service::FormService;
pub use service::Operation;
pub use store::InMemoryFormStore;
pub use store::SharedFormStore;

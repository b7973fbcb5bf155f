// crates/safety-forms-core/src/lib.rs
// ============================================================================
// Module: Safety Forms Core Library
// Description: Public API surface for the safety forms core.
// Purpose: Expose form descriptors, the store interface, and the service.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! Safety forms core models four workplace safety forms as parent/child
//! records. Every form shares one write path and one filtered read path,
//! parameterized by a static table descriptor per form kind. Persistence is
//! reached only through [`FormStore`].

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use core::*;

pub use interfaces::FormStore;
pub use interfaces::StoreError;
pub use runtime::ErrorClass;
pub use runtime::FilterQuery;
pub use runtime::FormError;
pub use runtime::FormService;
pub use runtime::Operation;
pub use runtime::InMemoryFormStore;
pub use runtime::SharedFormStore;

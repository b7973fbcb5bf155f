// crates/safety-forms-core/src/core/mod.rs
// ============================================================================
// Module: Safety Forms Core Types
// Description: Form kinds, descriptors, submissions, and row normalization.
// Purpose: Backend-neutral data model shared by stores and the server.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Pure data model: nothing here touches a database or the network.

pub mod identifiers;
pub mod normalize;
pub mod records;
pub mod schema;
pub mod submission;
pub mod values;

pub use identifiers::*;
pub use normalize::*;
pub use records::*;
pub use schema::*;
pub use submission::*;
pub use values::*;

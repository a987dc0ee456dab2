//! Domain models for the admin console.
//!
//! Order types are ingested through [`crate::api::conversions`]; the catalog
//! entities are simple enough to deserialize straight from the backend.

pub mod catalog;
pub mod order;

pub use catalog::*;
pub use order::*;

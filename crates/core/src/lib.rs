//! Country Cache Core - domain entities, services, and traits.
//!
//! This crate contains the reconciliation and query logic of the country
//! cache. It is database-agnostic and defines traits that are implemented
//! by the `storage-sqlite` and `summary` crates.

pub mod constants;
pub mod countries;
pub mod errors;
pub mod summary;
pub mod utils;

// Re-export common types from the countries module
pub use countries::*;

// Re-export error types
pub use errors::Error;
pub use errors::Result;

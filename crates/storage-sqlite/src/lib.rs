//! SQLite storage implementation for the country cache.
//!
//! This crate is the only place where Diesel is used. It implements the
//! repository trait defined in `country-cache-core` and contains:
//! - Database initialisation and connection pooling
//! - Embedded Diesel migrations
//! - The single writer actor that serialises every write transaction
//! - Database-specific model types (with Diesel derives)
//!
//! ```text
//!        core (domain)
//!              │
//!              ▼
//!   storage-sqlite (this crate)
//!              │
//!              ▼
//!          SQLite DB
//! ```

pub mod countries;
pub mod db;
pub mod errors;
pub mod schema;

pub use countries::CountryRepository;
pub use db::{create_pool, get_connection, init, run_migrations, DbConnection, DbPool, WriteHandle};
pub use db::write_actor::spawn_writer;
pub use errors::{IntoCore, StorageError};

pub use country_cache_core::errors::{DatabaseError, Error, Result};

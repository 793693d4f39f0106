//! SQLite backend for the semkb knowledge base.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. That thread also serialises every
//! operation, which is what keeps get-or-create free of duplicate ids.

mod encode;
mod index;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;

#[cfg(test)]
mod tests;

//! Core types, retrieval algorithms and the store trait for the semkb
//! knowledge base.
//!
//! No HTTP or database dependencies live here; the store and API crates
//! build on top of it.

pub mod aggregate;
pub mod config;
pub mod entity;
pub mod error;
pub mod frame;
pub mod heading;
pub mod query;
pub mod sentence;
pub mod store;

pub use error::{Error, Result};

//! Shared type definitions for quarry
//!
//! This crate provides the small vocabulary every other quarry crate agrees on:
//!
//! - [`Dialect`] - Database dialect enum (SQLite, PostgreSQL, MySQL)
//! - [`ScalarKind`] - Directly storable value classes of mapped members
//! - [`NativeType`] - Provider-specific column types, one enum per dialect in
//!   the [`sqlite`], [`postgres`] and [`mysql`] modules
//!
//! # Features
//!
//! - `serde` - Enable serde serialization/deserialization

mod dialect;
pub mod mysql;
mod native;
pub mod postgres;
mod scalar;
pub mod sqlite;

pub use dialect::{Dialect, UnknownDialect};
pub use native::NativeType;
pub use scalar::ScalarKind;

/// Prelude module for commonly used types
pub mod prelude {
    pub use crate::mysql::MySQLType;
    pub use crate::postgres::PostgreSQLType;
    pub use crate::sqlite::SQLiteType;
    pub use crate::{Dialect, NativeType, ScalarKind};
}

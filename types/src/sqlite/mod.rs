//! SQLite type definitions
//!
//! - [`SQLiteType`] - SQLite column storage types

mod sql_type;

pub use sql_type::SQLiteType;

//! # quarry
//!
//! Compiles lambda-style query descriptors against a mapped entity model
//! into dialect SQL with bound parameters, and folds flat result rows back
//! into object graphs.
//!
//! ## Quick Start
//!
//! ```rust
//! use quarry::prelude::*;
//!
//! # fn main() -> quarry::Result<()> {
//! let registry = RegistryBuilder::new()
//!     .entity("User", |e| {
//!         e.to_table("users");
//!         e.member("id", ScalarKind::Int).key().auto_increment();
//!         e.member("name", ScalarKind::Text);
//!     })
//!     .build()?;
//!
//! let adults = Query::from("User")
//!     .r#where(Lambda::new(["u"], root("u").get("name").starts_with("A")))
//!     .compile(&registry, &AnsiDialect)?;
//! assert_eq!(adults.sql, r#"SELECT "id", "name" FROM "users" WHERE "name" LIKE ?"#);
//! # Ok(())
//! # }
//! ```
//!
//! ## Dialects
//!
//! | Database   | Adapter           | Feature Flag |
//! |------------|-------------------|--------------|
//! | SQLite     | `SQLiteDialect`   | `sqlite`     |
//! | PostgreSQL | `PostgresDialect` | `postgres`   |
//! | MySQL      | `MySQLDialect`    | `mysql`      |

pub use quarry_core as core;
pub use quarry_core::{Dialect, ErrorKind, NativeType, QuarryError, Record, Result, ScalarKind, Value};
pub use quarry_types as types;

#[cfg(feature = "mysql")]
pub use quarry_mysql as mysql;
#[cfg(feature = "postgres")]
pub use quarry_postgres as postgres;
#[cfg(feature = "sqlite")]
pub use quarry_sqlite as sqlite;

use quarry_core::dialect::DialectAdapter;

/// Adapter for `dialect`, or `None` when its feature is disabled.
pub fn adapter_for(dialect: Dialect) -> Option<Box<dyn DialectAdapter>> {
    match dialect {
        #[cfg(feature = "sqlite")]
        Dialect::SQLite => Some(Box::new(quarry_sqlite::SQLiteDialect::new())),
        #[cfg(feature = "postgres")]
        Dialect::PostgreSQL => Some(Box::new(quarry_postgres::PostgresDialect::new())),
        #[cfg(feature = "mysql")]
        Dialect::MySQL => Some(Box::new(quarry_mysql::MySQLDialect::new())),
        #[allow(unreachable_patterns)]
        _ => None,
    }
}

pub mod prelude {
    pub use quarry_core::prelude::*;

    #[cfg(feature = "mysql")]
    pub use quarry_mysql::MySQLDialect;
    #[cfg(feature = "postgres")]
    pub use quarry_postgres::PostgresDialect;
    #[cfg(feature = "sqlite")]
    pub use quarry_sqlite::SQLiteDialect;

    pub use crate::adapter_for;
}

//! Query compilation and materialization core.
//!
//! ```text
//! Query ──compile──▶ QueryCompiler ──▶ Fragment ──render──▶ SQL + BoundParam
//!   │                     │
//!   └ Lambda / Expr       └ DialectAdapter (quoting, placeholders, functions)
//!
//! rows ──▶ Materializer(MaterializationPlan) ──▶ Value::Record graph
//! ```

mod tracing;

pub mod compiler;
pub mod dialect;
pub mod error;
pub mod expr;
pub mod mapping;
pub mod materialize;
pub mod mutation;
pub mod param;
pub mod query;
pub mod row;
pub mod sql;
pub mod value;

pub use error::{ErrorKind, QuarryError, Result};
pub use quarry_types::{Dialect, NativeType, ScalarKind};
pub use value::{Record, Value};

pub mod prelude {
    pub use crate::dialect::{AnsiDialect, DialectAdapter, FunctionTable, SqlFunction};
    pub use crate::error::{ErrorKind, QuarryError, Result};
    pub use crate::expr::*;
    pub use crate::mapping::{
        Cardinality, EntityRegistry, FieldNaming, FnTypeHandler, MemberType, RegistryBuilder,
        TypeHandler,
    };
    pub use crate::materialize::{MaterializationPlan, Materializer};
    pub use crate::mutation::{CompiledStatement, Delete, Insert, Update};
    pub use crate::query::{CompiledQuery, Include, Query};
    pub use crate::row::{FromRecord, FromValue, Nested, Row};
    pub use crate::value::{Record, Value};
    pub use quarry_types::{Dialect, NativeType, ScalarKind};
}

//! PostgreSQL dialect for quarry
//!
//! Numbered `$n` placeholders, double-quoted identifiers and native
//! booleans.

mod functions;

pub use functions::postgres_functions;

use std::borrow::Cow;

use compact_str::CompactString;
use quarry_core::dialect::{DialectAdapter, FunctionTable, SqlFunction, quote_with};
use quarry_core::expr::Method;
use quarry_types::Dialect;

#[derive(Debug, Clone)]
pub struct PostgresDialect {
    functions: FunctionTable,
}

impl PostgresDialect {
    pub fn new() -> Self {
        Self {
            functions: postgres_functions(),
        }
    }

    /// Adds or replaces a method translation.
    pub fn with_function(mut self, method: Method, function: SqlFunction) -> Self {
        self.functions.insert(method, function);
        self
    }
}

impl Default for PostgresDialect {
    fn default() -> Self {
        Self::new()
    }
}

impl DialectAdapter for PostgresDialect {
    fn dialect(&self) -> Dialect {
        Dialect::PostgreSQL
    }

    fn quote_identifier(&self, name: &str) -> CompactString {
        let quote = self.dialect().identifier_quote();
        quote_with(name, quote, quote)
    }

    fn parameter_placeholder(&self, position: usize) -> Cow<'static, str> {
        Cow::Owned(format!("${position}"))
    }

    fn resolve_function(&self, method: &Method) -> Option<&SqlFunction> {
        self.functions.get(method)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quarry_types::{NativeType, ScalarKind};

    #[test]
    fn test_numbered_placeholders() {
        let dialect = PostgresDialect::new();
        assert_eq!(dialect.parameter_placeholder(1), "$1");
        assert_eq!(dialect.parameter_placeholder(12), "$12");
    }

    #[test]
    fn test_native_types_follow_dialect() {
        let native = PostgresDialect::new().native_type_for(ScalarKind::Text);
        assert_eq!(native, NativeType::for_scalar(Dialect::PostgreSQL, ScalarKind::Text));
    }
}

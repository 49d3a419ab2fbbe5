//! MySQL dialect for quarry
//!
//! Backtick identifiers, `?` placeholders and `LIMIT offset, count`
//! paging. MySQL has no `RETURNING`; callers read the generated identity
//! from the driver.

mod functions;

pub use functions::mysql_functions;

use std::borrow::Cow;

use compact_str::{CompactString, format_compact};
use quarry_core::dialect::{DialectAdapter, FunctionTable, SqlFunction, quote_with};
use quarry_core::expr::Method;
use quarry_types::Dialect;

/// Row count standing in for "no limit" when only an offset is given.
const MAX_ROWS: u64 = u64::MAX;

#[derive(Debug, Clone)]
pub struct MySQLDialect {
    functions: FunctionTable,
}

impl MySQLDialect {
    pub fn new() -> Self {
        Self {
            functions: mysql_functions(),
        }
    }

    /// Adds or replaces a method translation.
    pub fn with_function(mut self, method: Method, function: SqlFunction) -> Self {
        self.functions.insert(method, function);
        self
    }
}

impl Default for MySQLDialect {
    fn default() -> Self {
        Self::new()
    }
}

impl DialectAdapter for MySQLDialect {
    fn dialect(&self) -> Dialect {
        Dialect::MySQL
    }

    fn quote_identifier(&self, name: &str) -> CompactString {
        let quote = self.dialect().identifier_quote();
        quote_with(name, quote, quote)
    }

    fn parameter_placeholder(&self, _position: usize) -> Cow<'static, str> {
        Cow::Borrowed("?")
    }

    fn resolve_function(&self, method: &Method) -> Option<&SqlFunction> {
        self.functions.get(method)
    }

    /// Backslash is itself an escape inside MySQL string literals.
    fn like_escape(&self) -> &'static str {
        "'\\\\'"
    }

    fn limit_offset(&self, take: Option<u64>, skip: Option<u64>) -> Option<CompactString> {
        match (take, skip) {
            (None, None) => None,
            (Some(take), None) => Some(format_compact!("LIMIT {take}")),
            (Some(take), Some(skip)) => Some(format_compact!("LIMIT {skip}, {take}")),
            (None, Some(skip)) => Some(format_compact!("LIMIT {skip}, {MAX_ROWS}")),
        }
    }

    fn returning(&self, _column: &str) -> Option<CompactString> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backticks() {
        assert_eq!(MySQLDialect::new().quote_identifier("order"), "`order`");
        assert_eq!(MySQLDialect::new().quote_identifier("a`b"), "`a``b`");
    }

    #[test]
    fn test_paging() {
        let dialect = MySQLDialect::new();
        assert_eq!(dialect.limit_offset(Some(10), Some(20)).unwrap(), "LIMIT 20, 10");
        assert_eq!(
            dialect.limit_offset(None, Some(3)).unwrap(),
            "LIMIT 3, 18446744073709551615"
        );
        assert!(dialect.returning("id").is_none());
    }

    #[test]
    fn test_like_escape_doubles_backslash() {
        assert_eq!(MySQLDialect::new().like_escape(), r"'\\'");
    }
}

//! SQLite dialect for quarry
//!
//! Double-quoted identifiers, `?` placeholders, `||` concatenation and
//! integer booleans.
//!
//! ```ignore
//! use quarry_sqlite::SQLiteDialect;
//!
//! let compiled = query.compile(&registry, &SQLiteDialect::new())?;
//! ```

mod functions;

pub use functions::sqlite_functions;

use std::borrow::Cow;

use compact_str::{CompactString, format_compact};
use quarry_core::dialect::{DialectAdapter, FunctionTable, SqlFunction, quote_with};
use quarry_core::expr::Method;
use quarry_core::sql::Fragment;
use quarry_types::Dialect;

#[derive(Debug, Clone)]
pub struct SQLiteDialect {
    functions: FunctionTable,
}

impl SQLiteDialect {
    pub fn new() -> Self {
        Self {
            functions: sqlite_functions(),
        }
    }

    /// Adds or replaces a method translation.
    pub fn with_function(mut self, method: Method, function: SqlFunction) -> Self {
        self.functions.insert(method, function);
        self
    }
}

impl Default for SQLiteDialect {
    fn default() -> Self {
        Self::new()
    }
}

impl DialectAdapter for SQLiteDialect {
    fn dialect(&self) -> Dialect {
        Dialect::SQLite
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

    fn bool_literal(&self, value: bool) -> &'static str {
        if value { "1" } else { "0" }
    }

    fn concat(&self, parts: Vec<Fragment>) -> Fragment {
        Fragment::join(parts, " || ").parens()
    }

    // OFFSET is only valid after LIMIT; -1 means no limit.
    fn limit_offset(&self, take: Option<u64>, skip: Option<u64>) -> Option<CompactString> {
        match (take, skip) {
            (None, None) => None,
            (Some(take), None) => Some(format_compact!("LIMIT {take}")),
            (Some(take), Some(skip)) => Some(format_compact!("LIMIT {take} OFFSET {skip}")),
            (None, Some(skip)) => Some(format_compact!("LIMIT -1 OFFSET {skip}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paging() {
        let dialect = SQLiteDialect::new();
        assert_eq!(dialect.limit_offset(None, Some(5)).unwrap(), "LIMIT -1 OFFSET 5");
        assert_eq!(dialect.limit_offset(Some(2), None).unwrap(), "LIMIT 2");
    }

    #[test]
    fn test_booleans_are_integers() {
        let dialect = SQLiteDialect::new();
        assert_eq!(dialect.bool_literal(true), "1");
        assert_eq!(dialect.bool_literal(false), "0");
    }

    #[test]
    fn test_with_function_overrides() {
        quarry_core::sql_function!(fn soundex => "SOUNDEX");
        let dialect = SQLiteDialect::new()
            .with_function(Method::Custom("soundex".into()), SqlFunction::new(soundex));
        assert!(dialect.resolve_function(&Method::Custom("soundex".into())).is_some());
        assert!(SQLiteDialect::new().resolve_function(&Method::Custom("soundex".into())).is_none());
    }
}

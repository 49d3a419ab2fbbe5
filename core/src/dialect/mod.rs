//! Dialect adapter interface.
//!
//! The compiler never hardcodes quoting, placeholder syntax or function
//! names; it calls through a [`DialectAdapter`]. Dialect crates implement
//! the trait, [`AnsiDialect`] is the reference implementation.

mod functions;

pub use functions::*;

use std::borrow::Cow;
use std::sync::LazyLock;

use chrono::{NaiveDateTime, Timelike};
use compact_str::{CompactString, format_compact};
use quarry_types::{Dialect, NativeType, ScalarKind};

use crate::compiler::Segment;
use crate::error::{QuarryError, Result};
use crate::expr::Method;
use crate::param::ParamCollector;
use crate::sql::Fragment;
use crate::value::Value;

/// Dialect-specific syntax the compiler renders through.
pub trait DialectAdapter: Send + Sync {
    fn dialect(&self) -> Dialect;

    fn quote_identifier(&self, name: &str) -> CompactString;

    /// Placeholder for the 1-based parameter `position`.
    fn parameter_placeholder(&self, position: usize) -> Cow<'static, str>;

    fn resolve_function(&self, method: &Method) -> Option<&SqlFunction>;

    fn native_type_for(&self, kind: ScalarKind) -> NativeType {
        NativeType::for_scalar(self.dialect(), kind)
    }

    fn bool_literal(&self, value: bool) -> &'static str {
        if value { "TRUE" } else { "FALSE" }
    }

    fn datetime_literal(&self, value: &NaiveDateTime) -> CompactString {
        if value.nanosecond() == 0 {
            format_compact!("'{}'", value.format("%Y-%m-%d %H:%M:%S"))
        } else {
            format_compact!("'{}'", value.format("%Y-%m-%d %H:%M:%S%.f"))
        }
    }

    /// SQL literal naming the backslash escape character of LIKE patterns.
    fn like_escape(&self) -> &'static str {
        "'\\'"
    }

    /// N-ary string concatenation.
    fn concat(&self, parts: Vec<Fragment>) -> Fragment {
        Fragment::func("CONCAT", parts)
    }

    /// Row-limiting clause, without a leading space.
    fn limit_offset(&self, take: Option<u64>, skip: Option<u64>) -> Option<CompactString> {
        match (take, skip) {
            (None, None) => None,
            (Some(take), None) => Some(format_compact!("LIMIT {take}")),
            (Some(take), Some(skip)) => Some(format_compact!("LIMIT {take} OFFSET {skip}")),
            (None, Some(skip)) => Some(format_compact!("OFFSET {skip}")),
        }
    }

    /// Clause returning the generated identity after an insert.
    fn returning(&self, column: &str) -> Option<CompactString> {
        Some(format_compact!("RETURNING {}", self.quote_identifier(column)))
    }
}

/// Wraps `name` in `open`/`close`, doubling any embedded `close`.
pub fn quote_with(name: &str, open: char, close: char) -> CompactString {
    let mut out = CompactString::with_capacity(name.len() + 2);
    out.push(open);
    for c in name.chars() {
        if c == close {
            out.push(close);
        }
        out.push(c);
    }
    out.push(close);
    out
}

/// Formats one method call.
pub type FormatFn = fn(&mut FunctionContext<'_, '_>) -> Result<Fragment>;

/// A method translation.
#[derive(Clone, Copy)]
pub struct SqlFunction {
    pub format: FormatFn,
    /// The formatter renders the negated form itself when
    /// [`FunctionContext::negated`] is set.
    pub negatable: bool,
}

impl SqlFunction {
    pub const fn new(format: FormatFn) -> Self {
        Self {
            format,
            negatable: false,
        }
    }

    pub const fn negatable(format: FormatFn) -> Self {
        Self {
            format,
            negatable: true,
        }
    }
}

impl core::fmt::Debug for SqlFunction {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SqlFunction")
            .field("negatable", &self.negatable)
            .finish_non_exhaustive()
    }
}

/// What a formatter sees of the call being translated.
pub struct FunctionContext<'c, 'a> {
    pub method: &'c Method,
    pub target: Option<Segment<'a>>,
    pub args: Vec<Segment<'a>>,
    pub negated: bool,
    pub adapter: &'c dyn DialectAdapter,
    params: &'c mut ParamCollector,
}

impl<'c, 'a> FunctionContext<'c, 'a> {
    pub(crate) fn new(
        method: &'c Method,
        target: Option<Segment<'a>>,
        args: Vec<Segment<'a>>,
        negated: bool,
        adapter: &'c dyn DialectAdapter,
        params: &'c mut ParamCollector,
    ) -> Self {
        Self {
            method,
            target,
            args,
            negated,
            adapter,
            params,
        }
    }

    /// Operand SQL for a segment: inlined literal, parameter or expression.
    pub fn sql(&mut self, segment: &Segment<'_>) -> Result<Fragment> {
        segment.to_operand(self.params, self.adapter)
    }

    pub fn target_sql(&mut self) -> Result<Fragment> {
        let target = self
            .target
            .as_ref()
            .ok_or_else(|| method_error(self.method, "missing receiver"))?;
        target.to_operand(self.params, self.adapter)
    }

    pub fn arg_sql(&mut self, index: usize) -> Result<Fragment> {
        let arg = self
            .args
            .get(index)
            .ok_or_else(|| method_error(self.method, "missing argument"))?;
        arg.to_operand(self.params, self.adapter)
    }

    /// Receiver (when present) followed by every argument.
    pub fn operands_sql(&mut self) -> Result<Vec<Fragment>> {
        let mut out = Vec::with_capacity(self.args.len() + 1);
        if let Some(target) = &self.target {
            out.push(target.to_operand(self.params, self.adapter)?);
        }
        for arg in &self.args {
            out.push(arg.to_operand(self.params, self.adapter)?);
        }
        Ok(out)
    }

    /// Text of argument `index` when it is a known string value.
    pub fn arg_text_literal(&self, index: usize) -> Option<&str> {
        self.args
            .get(index)
            .and_then(|arg| arg.value.as_ref())
            .and_then(Value::as_str)
    }

    /// Integer of argument `index` when it is an inlinable constant.
    pub fn arg_int_literal(&self, index: usize) -> Option<i64> {
        self.args
            .get(index)
            .filter(|arg| !arg.is_variable)
            .and_then(|arg| match arg.value {
                Some(Value::Int(i)) => Some(i),
                _ => None,
            })
    }

    pub fn bind_value(&mut self, value: Value) -> Fragment {
        self.params.push(value, None)
    }

    pub fn error(&self, reason: &str) -> QuarryError {
        method_error(self.method, reason)
    }
}

fn method_error(method: &Method, reason: &str) -> QuarryError {
    QuarryError::unsupported(method, reason)
}

static ANSI_FUNCTIONS: LazyLock<FunctionTable> = LazyLock::new(FunctionTable::standard);

/// Reference adapter: double-quoted identifiers, `?` placeholders and the
/// standard function table. Native types use the SQLite vocabulary.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnsiDialect;

impl DialectAdapter for AnsiDialect {
    fn dialect(&self) -> Dialect {
        Dialect::SQLite
    }

    fn quote_identifier(&self, name: &str) -> CompactString {
        quote_with(name, '"', '"')
    }

    fn parameter_placeholder(&self, _position: usize) -> Cow<'static, str> {
        Cow::Borrowed("?")
    }

    fn resolve_function(&self, method: &Method) -> Option<&SqlFunction> {
        ANSI_FUNCTIONS.get(method)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_quote_doubles_closing_char() {
        assert_eq!(quote_with("a\"b", '"', '"'), "\"a\"\"b\"");
        assert_eq!(quote_with("name", '`', '`'), "`name`");
    }

    #[test]
    fn test_default_hooks() {
        let adapter = AnsiDialect;
        let dt = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(8, 30, 0)
            .unwrap();
        assert_eq!(adapter.datetime_literal(&dt), "'2024-03-01 08:30:00'");
        assert_eq!(adapter.limit_offset(Some(10), Some(20)).unwrap(), "LIMIT 10 OFFSET 20");
        assert_eq!(adapter.limit_offset(None, None), None);
        assert_eq!(adapter.returning("id").unwrap(), "RETURNING \"id\"");
        assert!(adapter.resolve_function(&Method::ToUpper).is_some());
        assert!(adapter.resolve_function(&Method::Custom("nope".into())).is_none());
    }
}

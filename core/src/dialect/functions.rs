//! Standard method translations shared by every dialect.

use hashbrown::HashMap;

use super::{FunctionContext, SqlFunction};
use crate::error::Result;
use crate::expr::Method;
use crate::sql::Fragment;
use crate::value::Value;

/// Method to formatter lookup.
///
/// Dialects start from [`FunctionTable::standard`] and override the entries
/// whose SQL differs.
#[derive(Debug, Clone, Default)]
pub struct FunctionTable {
    functions: HashMap<Method, SqlFunction>,
}

impl FunctionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, method: &Method) -> Option<&SqlFunction> {
        self.functions.get(method)
    }

    pub fn insert(&mut self, method: Method, function: SqlFunction) -> &mut Self {
        self.functions.insert(method, function);
        self
    }

    pub fn with(mut self, method: Method, function: SqlFunction) -> Self {
        self.insert(method, function);
        self
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    pub fn standard() -> Self {
        let mut table = Self::new();
        table
            .insert(Method::Contains, SqlFunction::negatable(contains))
            .insert(Method::StartsWith, SqlFunction::negatable(starts_with))
            .insert(Method::EndsWith, SqlFunction::negatable(ends_with))
            .insert(Method::IsNullOrEmpty, SqlFunction::negatable(is_null_or_empty))
            .insert(Method::HasValue, SqlFunction::negatable(has_value))
            .insert(Method::Value, SqlFunction::new(passthrough))
            .insert(Method::ToUpper, SqlFunction::new(upper))
            .insert(Method::ToLower, SqlFunction::new(lower))
            .insert(Method::Trim, SqlFunction::new(trim))
            .insert(Method::TrimStart, SqlFunction::new(ltrim))
            .insert(Method::TrimEnd, SqlFunction::new(rtrim))
            .insert(Method::Length, SqlFunction::new(length))
            .insert(Method::Substring, SqlFunction::new(substring))
            .insert(Method::Replace, SqlFunction::new(replace))
            .insert(Method::IndexOf, SqlFunction::new(instr))
            .insert(Method::Concat, SqlFunction::new(concat))
            .insert(Method::ToString, SqlFunction::new(to_text))
            .insert(Method::Count, SqlFunction::new(count))
            .insert(Method::CountDistinct, SqlFunction::new(count_distinct))
            .insert(Method::Sum, SqlFunction::new(sum))
            .insert(Method::Avg, SqlFunction::new(avg))
            .insert(Method::Max, SqlFunction::new(max))
            .insert(Method::Min, SqlFunction::new(min))
            .insert(Method::Abs, SqlFunction::new(abs))
            .insert(Method::Round, SqlFunction::new(round))
            .insert(Method::Floor, SqlFunction::new(floor))
            .insert(Method::Ceiling, SqlFunction::new(ceiling))
            .insert(Method::Now, SqlFunction::new(now))
            .insert(Method::Year, SqlFunction::new(extract_year))
            .insert(Method::Month, SqlFunction::new(extract_month))
            .insert(Method::Day, SqlFunction::new(extract_day));
        table
    }
}

/// Generates a formatter rendering `NAME(receiver, args...)`.
#[macro_export]
macro_rules! sql_function {
    ($(#[$meta:meta])* $vis:vis fn $name:ident => $sql:literal) => {
        $(#[$meta])*
        $vis fn $name(
            ctx: &mut $crate::dialect::FunctionContext<'_, '_>,
        ) -> $crate::error::Result<$crate::sql::Fragment> {
            Ok($crate::sql::Fragment::func($sql, ctx.operands_sql()?))
        }
    };
}

sql_function!(pub fn upper => "UPPER");
sql_function!(pub fn lower => "LOWER");
sql_function!(pub fn trim => "TRIM");
sql_function!(pub fn ltrim => "LTRIM");
sql_function!(pub fn rtrim => "RTRIM");
sql_function!(pub fn length => "LENGTH");
sql_function!(pub fn replace => "REPLACE");
sql_function!(pub fn sum => "SUM");
sql_function!(pub fn avg => "AVG");
sql_function!(pub fn max => "MAX");
sql_function!(pub fn min => "MIN");
sql_function!(pub fn abs => "ABS");
sql_function!(pub fn round => "ROUND");
sql_function!(pub fn floor => "FLOOR");
sql_function!(pub fn ceiling => "CEILING");

/// `target [NOT] LIKE pattern` with `%` on the requested sides.
///
/// A known text argument is folded into a single bound pattern with its
/// own `%`, `_` and `\` escaped; anything else is concatenated with the
/// wildcards in SQL and matched as a pattern.
pub fn like(ctx: &mut FunctionContext<'_, '_>, leading: bool, trailing: bool) -> Result<Fragment> {
    let target = ctx.target_sql()?;
    let mut escaped = false;
    let pattern = match ctx.arg_text_literal(0) {
        Some(text) => {
            let mut pattern = String::with_capacity(text.len() + 2);
            if leading {
                pattern.push('%');
            }
            for c in text.chars() {
                if matches!(c, '%' | '_' | '\\') {
                    pattern.push('\\');
                    escaped = true;
                }
                pattern.push(c);
            }
            if trailing {
                pattern.push('%');
            }
            ctx.bind_value(Value::Text(pattern))
        }
        None => {
            let mut parts = Vec::with_capacity(3);
            if leading {
                parts.push(Fragment::raw("'%'"));
            }
            parts.push(ctx.arg_sql(0)?);
            if trailing {
                parts.push(Fragment::raw("'%'"));
            }
            ctx.adapter.concat(parts)
        }
    };
    let op = if ctx.negated { " NOT LIKE " } else { " LIKE " };
    let sql = target.push_str(op).append(pattern);
    Ok(if escaped {
        sql.push_str(" ESCAPE ").push_str(ctx.adapter.like_escape())
    } else {
        sql
    })
}

pub fn contains(ctx: &mut FunctionContext<'_, '_>) -> Result<Fragment> {
    like(ctx, true, true)
}

pub fn starts_with(ctx: &mut FunctionContext<'_, '_>) -> Result<Fragment> {
    like(ctx, false, true)
}

pub fn ends_with(ctx: &mut FunctionContext<'_, '_>) -> Result<Fragment> {
    like(ctx, true, false)
}

pub fn is_null_or_empty(ctx: &mut FunctionContext<'_, '_>) -> Result<Fragment> {
    let target = ctx.target_sql()?;
    let (null, join, empty) = if ctx.negated {
        (" IS NOT NULL", " AND ", " <> ''")
    } else {
        (" IS NULL", " OR ", " = ''")
    };
    Ok(target
        .clone()
        .push_str(null)
        .push_str(join)
        .append(target)
        .push_str(empty)
        .parens())
}

pub fn has_value(ctx: &mut FunctionContext<'_, '_>) -> Result<Fragment> {
    let target = ctx.target_sql()?;
    Ok(target.push_str(if ctx.negated { " IS NULL" } else { " IS NOT NULL" }))
}

pub fn passthrough(ctx: &mut FunctionContext<'_, '_>) -> Result<Fragment> {
    ctx.target_sql()
}

/// Zero-based start: `SUBSTR(x, start + 1, len)`.
pub fn substring(ctx: &mut FunctionContext<'_, '_>) -> Result<Fragment> {
    let target = ctx.target_sql()?;
    let start = match ctx.arg_int_literal(0) {
        Some(start) => Fragment::raw(compact_str::format_compact!("{}", start.saturating_add(1))),
        None => ctx.arg_sql(0)?.push_str(" + 1").parens(),
    };
    let mut args = vec![target, start];
    if ctx.args.len() > 1 {
        args.push(ctx.arg_sql(1)?);
    }
    Ok(Fragment::func("SUBSTR", args))
}

/// Zero-based position: `INSTR(x, needle) - 1`.
pub fn instr(ctx: &mut FunctionContext<'_, '_>) -> Result<Fragment> {
    let target = ctx.target_sql()?;
    let needle = ctx.arg_sql(0)?;
    Ok(Fragment::func("INSTR", [target, needle]).push_str(" - 1").parens())
}

pub fn concat(ctx: &mut FunctionContext<'_, '_>) -> Result<Fragment> {
    let parts = ctx.operands_sql()?;
    Ok(ctx.adapter.concat(parts))
}

/// `CAST(x AS <text type>)`
pub fn to_text(ctx: &mut FunctionContext<'_, '_>) -> Result<Fragment> {
    let target = ctx.target_sql()?;
    let native = ctx.adapter.native_type_for(quarry_types::ScalarKind::Text);
    Ok(Fragment::raw("CAST(")
        .append(target)
        .push_str(" AS ")
        .push_str(native.to_cast_type())
        .push_str(")"))
}

/// `COUNT(*)` without operands, `COUNT(x)` otherwise.
pub fn count(ctx: &mut FunctionContext<'_, '_>) -> Result<Fragment> {
    let operands = ctx.operands_sql()?;
    if operands.is_empty() {
        Ok(Fragment::raw("COUNT(*)"))
    } else {
        Ok(Fragment::func("COUNT", operands))
    }
}

pub fn count_distinct(ctx: &mut FunctionContext<'_, '_>) -> Result<Fragment> {
    let operands = ctx.operands_sql()?;
    Ok(Fragment::raw("COUNT(DISTINCT ")
        .append(Fragment::join(operands, ", "))
        .push_str(")"))
}

pub fn now(_ctx: &mut FunctionContext<'_, '_>) -> Result<Fragment> {
    Ok(Fragment::raw("CURRENT_TIMESTAMP"))
}

fn extract(ctx: &mut FunctionContext<'_, '_>, field: &str) -> Result<Fragment> {
    let target = ctx.target_sql()?;
    Ok(Fragment::raw("EXTRACT(")
        .push_str(field)
        .push_str(" FROM ")
        .append(target)
        .push_str(")"))
}

pub fn extract_year(ctx: &mut FunctionContext<'_, '_>) -> Result<Fragment> {
    extract(ctx, "YEAR")
}

pub fn extract_month(ctx: &mut FunctionContext<'_, '_>) -> Result<Fragment> {
    extract(ctx, "MONTH")
}

pub fn extract_day(ctx: &mut FunctionContext<'_, '_>) -> Result<Fragment> {
    extract(ctx, "DAY")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::Segment;
    use crate::dialect::AnsiDialect;
    use crate::param::ParamCollector;

    fn column() -> Segment<'static> {
        Segment::sql(Fragment::raw("name"), None, None)
    }

    #[test]
    fn test_like_binds_folded_pattern() {
        let mut params = ParamCollector::new();
        let method = Method::StartsWith;
        let mut ctx = FunctionContext::new(
            &method,
            Some(column()),
            vec![Segment::literal(Value::from("Al"), None)],
            true,
            &AnsiDialect,
            &mut params,
        );
        let sql = starts_with(&mut ctx).unwrap();
        assert_eq!(sql.chunks().len(), 2);
        assert_eq!(params.get(0).unwrap().value, Value::from("Al%"));
    }

    #[test]
    fn test_substring_shifts_literal_start() {
        let mut params = ParamCollector::new();
        let method = Method::Substring;
        let mut ctx = FunctionContext::new(
            &method,
            Some(column()),
            vec![
                Segment::literal(Value::Int(0), None),
                Segment::literal(Value::Int(3), None),
            ],
            false,
            &AnsiDialect,
            &mut params,
        );
        assert_eq!(substring(&mut ctx).unwrap().as_raw(), Some("SUBSTR(name, 1, 3)"));
    }

    #[test]
    fn test_like_escapes_wildcards_in_literal() {
        let mut params = ParamCollector::new();
        let method = Method::Contains;
        let mut ctx = FunctionContext::new(
            &method,
            Some(column()),
            vec![Segment::literal(Value::from(r"50%_\"), None)],
            false,
            &AnsiDialect,
            &mut params,
        );
        contains(&mut ctx).unwrap();
        assert_eq!(params.get(0).unwrap().value, Value::from(r"%50\%\_\\%"));
    }

    #[test]
    fn test_substring_start_saturates() {
        let mut params = ParamCollector::new();
        let method = Method::Substring;
        let mut ctx = FunctionContext::new(
            &method,
            Some(column()),
            vec![Segment::literal(Value::Int(i64::MAX), None)],
            false,
            &AnsiDialect,
            &mut params,
        );
        assert_eq!(
            substring(&mut ctx).unwrap().as_raw(),
            Some("SUBSTR(name, 9223372036854775807)")
        );
    }

    #[test]
    fn test_count_forms() {
        let mut params = ParamCollector::new();
        let method = Method::Count;
        let mut ctx = FunctionContext::new(&method, None, vec![], false, &AnsiDialect, &mut params);
        assert_eq!(count(&mut ctx).unwrap().as_raw(), Some("COUNT(*)"));
        assert!(FunctionTable::standard().len() > 20);
    }
}

use quarry_core::dialect::{FunctionContext, FunctionTable, SqlFunction};
use quarry_core::expr::Method;
use quarry_core::sql::Fragment;
use quarry_core::Result;

/// Standard table with MySQL's character-length and search functions.
pub fn mysql_functions() -> FunctionTable {
    FunctionTable::standard()
        .with(Method::Length, SqlFunction::new(char_length))
        .with(Method::IndexOf, SqlFunction::new(locate))
        .with(Method::Substring, SqlFunction::new(substring))
        .with(Method::Year, SqlFunction::new(year))
        .with(Method::Month, SqlFunction::new(month))
        .with(Method::Day, SqlFunction::new(day))
}

quarry_core::sql_function!(fn char_length => "CHAR_LENGTH");
quarry_core::sql_function!(fn year => "YEAR");
quarry_core::sql_function!(fn month => "MONTH");
quarry_core::sql_function!(fn day => "DAY");

/// Zero-based: `(LOCATE(needle, x) - 1)`.
fn locate(ctx: &mut FunctionContext<'_, '_>) -> Result<Fragment> {
    let target = ctx.target_sql()?;
    let needle = ctx.arg_sql(0)?;
    Ok(Fragment::func("LOCATE", [needle, target]).push_str(" - 1").parens())
}

/// Zero-based start: `SUBSTRING(x, start + 1, len)`.
fn substring(ctx: &mut FunctionContext<'_, '_>) -> Result<Fragment> {
    let target = ctx.target_sql()?;
    let start = match ctx.arg_int_literal(0) {
        Some(start) => Fragment::raw(compact_str::format_compact!("{}", start.saturating_add(1))),
        None => ctx.arg_sql(0)?.push_str(" + 1").parens(),
    };
    let mut args = vec![target, start];
    if ctx.args.len() > 1 {
        args.push(ctx.arg_sql(1)?);
    }
    Ok(Fragment::func("SUBSTRING", args))
}

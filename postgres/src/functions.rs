use quarry_core::dialect::{FunctionContext, FunctionTable, SqlFunction};
use quarry_core::expr::Method;
use quarry_core::sql::Fragment;
use quarry_core::Result;

/// Standard table with PostgreSQL's string search and date parts.
pub fn postgres_functions() -> FunctionTable {
    FunctionTable::standard()
        .with(Method::IndexOf, SqlFunction::new(strpos))
        .with(Method::Year, SqlFunction::new(year))
        .with(Method::Month, SqlFunction::new(month))
        .with(Method::Day, SqlFunction::new(day))
}

/// Zero-based: `(STRPOS(x, needle) - 1)`.
fn strpos(ctx: &mut FunctionContext<'_, '_>) -> Result<Fragment> {
    let target = ctx.target_sql()?;
    let needle = ctx.arg_sql(0)?;
    Ok(Fragment::func("STRPOS", [target, needle]).push_str(" - 1").parens())
}

fn date_part(ctx: &mut FunctionContext<'_, '_>, field: &str) -> Result<Fragment> {
    let target = ctx.target_sql()?;
    Ok(Fragment::raw("CAST(EXTRACT(")
        .push_str(field)
        .push_str(" FROM ")
        .append(target)
        .push_str(") AS INTEGER)"))
}

fn year(ctx: &mut FunctionContext<'_, '_>) -> Result<Fragment> {
    date_part(ctx, "YEAR")
}

fn month(ctx: &mut FunctionContext<'_, '_>) -> Result<Fragment> {
    date_part(ctx, "MONTH")
}

fn day(ctx: &mut FunctionContext<'_, '_>) -> Result<Fragment> {
    date_part(ctx, "DAY")
}

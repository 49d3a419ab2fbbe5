use quarry_core::dialect::{FunctionContext, FunctionTable, SqlFunction};
use quarry_core::expr::Method;
use quarry_core::sql::Fragment;
use quarry_core::Result;

/// Standard table with SQLite's date functions.
pub fn sqlite_functions() -> FunctionTable {
    FunctionTable::standard()
        .with(Method::Year, SqlFunction::new(year))
        .with(Method::Month, SqlFunction::new(month))
        .with(Method::Day, SqlFunction::new(day))
        .with(Method::Ceiling, SqlFunction::new(ceiling))
}

fn strftime(ctx: &mut FunctionContext<'_, '_>, format: &str) -> Result<Fragment> {
    let target = ctx.target_sql()?;
    Ok(Fragment::raw("CAST(strftime('")
        .push_str(format)
        .push_str("', ")
        .append(target)
        .push_str(") AS INTEGER)"))
}

fn year(ctx: &mut FunctionContext<'_, '_>) -> Result<Fragment> {
    strftime(ctx, "%Y")
}

fn month(ctx: &mut FunctionContext<'_, '_>) -> Result<Fragment> {
    strftime(ctx, "%m")
}

fn day(ctx: &mut FunctionContext<'_, '_>) -> Result<Fragment> {
    strftime(ctx, "%d")
}

quarry_core::sql_function!(fn ceiling => "CEIL");

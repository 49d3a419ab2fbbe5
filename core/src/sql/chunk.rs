use compact_str::CompactString;

/// One piece of a SQL fragment.
///
/// Table and parameter references stay symbolic until the statement is
/// rendered, so alias prefixes and placeholder numbers are decided once for
/// the whole statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Chunk {
    /// Unquoted SQL text: keywords, operators, inlined literals.
    Raw(CompactString),
    /// A column of a registered table.
    /// Renders as `a."column"` or `"column"` when the statement has one table.
    Column { table: usize, column: CompactString },
    /// A registered table in a FROM or JOIN position.
    /// Renders as `"table" a` or `"table"`.
    Table(usize),
    /// A pending parameter, by index into the statement's collector.
    Param(usize),
}

impl Chunk {
    #[inline]
    pub fn raw(text: impl Into<CompactString>) -> Self {
        Self::Raw(text.into())
    }

    #[inline]
    pub fn column(table: usize, column: impl Into<CompactString>) -> Self {
        Self::Column {
            table,
            column: column.into(),
        }
    }

    #[inline]
    pub const fn is_raw(&self) -> bool {
        matches!(self, Self::Raw(_))
    }
}

impl From<&str> for Chunk {
    fn from(value: &str) -> Self {
        Self::raw(value)
    }
}

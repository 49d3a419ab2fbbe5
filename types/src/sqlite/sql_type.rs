//! SQLite storage classes

use crate::ScalarKind;

/// SQLite storage class of a column. Booleans and integers share
/// `INTEGER`; date-times are stored as ISO-8601 text.
///
/// ```
/// use quarry_types::{ScalarKind, sqlite::SQLiteType};
///
/// assert_eq!(SQLiteType::Integer.to_sql_type(), "INTEGER");
/// assert_eq!(SQLiteType::for_scalar(ScalarKind::Bool), SQLiteType::Integer);
/// ```
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "UPPERCASE"))]
pub enum SQLiteType {
    Integer,
    Text,
    Blob,
    Real,
    Numeric,
    /// No type affinity.
    #[default]
    Any,
}

impl SQLiteType {
    /// The storage class a scalar kind lands in by default.
    #[must_use]
    pub const fn for_scalar(kind: ScalarKind) -> Self {
        match kind {
            ScalarKind::Bool | ScalarKind::Int => Self::Integer,
            ScalarKind::Float => Self::Real,
            ScalarKind::Decimal => Self::Numeric,
            ScalarKind::Text | ScalarKind::DateTime | ScalarKind::Guid => Self::Text,
            ScalarKind::Bytes => Self::Blob,
        }
    }

    #[must_use]
    pub const fn to_sql_type(&self) -> &'static str {
        match self {
            Self::Integer => "INTEGER",
            Self::Text => "TEXT",
            Self::Blob => "BLOB",
            Self::Real => "REAL",
            Self::Numeric => "NUMERIC",
            Self::Any => "ANY",
        }
    }
}

impl core::fmt::Display for SQLiteType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.to_sql_type())
    }
}

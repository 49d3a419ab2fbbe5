//! PostgreSQL column type definitions

use crate::ScalarKind;

/// PostgreSQL column types a mapped member can be declared with.
///
/// ```
/// use quarry_types::{ScalarKind, postgres::PostgreSQLType};
///
/// assert_eq!(PostgreSQLType::Integer.to_sql_type(), "INTEGER");
/// assert_eq!(PostgreSQLType::for_scalar(ScalarKind::Guid), PostgreSQLType::Uuid);
/// ```
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PostgreSQLType {
    /// 32-bit signed integer
    Integer,
    /// 64-bit signed integer
    Bigint,
    /// 16-bit signed integer
    Smallint,
    /// Variable-length character string
    #[default]
    Text,
    /// Variable-length character string with limit
    Varchar,
    /// Single precision floating-point number
    Real,
    /// Double precision floating-point number
    DoublePrecision,
    /// Exact numeric with selectable precision
    Numeric,
    /// true/false
    Boolean,
    /// Binary data
    Bytea,
    /// Universally unique identifier
    Uuid,
    /// JSON data
    Json,
    /// Binary JSON data
    Jsonb,
    /// Date and time without time zone
    Timestamp,
    /// Date and time with time zone
    Timestamptz,
    /// Calendar date
    Date,
}

impl PostgreSQLType {
    /// The column type a scalar kind maps to by default.
    #[must_use]
    pub const fn for_scalar(kind: ScalarKind) -> Self {
        match kind {
            ScalarKind::Bool => Self::Boolean,
            ScalarKind::Int => Self::Bigint,
            ScalarKind::Float => Self::DoublePrecision,
            ScalarKind::Decimal => Self::Numeric,
            ScalarKind::Text => Self::Text,
            ScalarKind::Bytes => Self::Bytea,
            ScalarKind::DateTime => Self::Timestamp,
            ScalarKind::Guid => Self::Uuid,
        }
    }

    /// Type name as written in DDL and `CAST`.
    #[must_use]
    pub const fn to_sql_type(&self) -> &'static str {
        match self {
            Self::Integer => "INTEGER",
            Self::Bigint => "BIGINT",
            Self::Smallint => "SMALLINT",
            Self::Text => "TEXT",
            Self::Varchar => "VARCHAR",
            Self::Real => "REAL",
            Self::DoublePrecision => "DOUBLE PRECISION",
            Self::Numeric => "NUMERIC",
            Self::Boolean => "BOOLEAN",
            Self::Bytea => "BYTEA",
            Self::Uuid => "UUID",
            Self::Json => "JSON",
            Self::Jsonb => "JSONB",
            Self::Timestamp => "TIMESTAMP",
            Self::Timestamptz => "TIMESTAMPTZ",
            Self::Date => "DATE",
        }
    }
}

impl core::fmt::Display for PostgreSQLType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.to_sql_type())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_sql_type() {
        assert_eq!(PostgreSQLType::DoublePrecision.to_sql_type(), "DOUBLE PRECISION");
        assert_eq!(
            PostgreSQLType::for_scalar(ScalarKind::Bool).to_sql_type(),
            "BOOLEAN"
        );
    }
}

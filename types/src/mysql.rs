//! MySQL column type definitions

use crate::ScalarKind;

/// Enum representing supported MySQL column types.
///
/// See: <https://dev.mysql.com/doc/refman/8.0/en/data-types.html>
///
/// # Examples
///
/// ```
/// use quarry_types::{ScalarKind, mysql::MySQLType};
///
/// assert_eq!(MySQLType::for_scalar(ScalarKind::Bool), MySQLType::TinyInt);
/// assert_eq!(MySQLType::Varchar.to_sql_type(), "VARCHAR(255)");
/// ```
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MySQLType {
    TinyInt,
    Int,
    BigInt,
    Double,
    Decimal,
    Varchar,
    #[default]
    Text,
    Blob,
    DateTime,
    Json,
    /// `CHAR(36)` holding a hyphenated UUID
    Guid,
}

impl MySQLType {
    /// The column type a scalar kind maps to by default.
    #[must_use]
    pub const fn for_scalar(kind: ScalarKind) -> Self {
        match kind {
            ScalarKind::Bool => Self::TinyInt,
            ScalarKind::Int => Self::BigInt,
            ScalarKind::Float => Self::Double,
            ScalarKind::Decimal => Self::Decimal,
            ScalarKind::Text => Self::Varchar,
            ScalarKind::Bytes => Self::Blob,
            ScalarKind::DateTime => Self::DateTime,
            ScalarKind::Guid => Self::Guid,
        }
    }

    /// Get the SQL type string for this type
    #[must_use]
    pub const fn to_sql_type(&self) -> &'static str {
        match self {
            Self::TinyInt => "TINYINT",
            Self::Int => "INT",
            Self::BigInt => "BIGINT",
            Self::Double => "DOUBLE",
            Self::Decimal => "DECIMAL(36, 18)",
            Self::Varchar => "VARCHAR(255)",
            Self::Text => "TEXT",
            Self::Blob => "BLOB",
            Self::DateTime => "DATETIME",
            Self::Json => "JSON",
            Self::Guid => "CHAR(36)",
        }
    }

    /// The target spelling accepted by `CAST(... AS ...)`, which is narrower
    /// than the column type vocabulary.
    #[must_use]
    pub const fn to_cast_type(&self) -> &'static str {
        match self {
            Self::TinyInt | Self::Int | Self::BigInt => "SIGNED",
            Self::Double => "DOUBLE",
            Self::Decimal => "DECIMAL(36, 18)",
            Self::Varchar | Self::Text | Self::Guid => "CHAR",
            Self::Blob => "BINARY",
            Self::DateTime => "DATETIME",
            Self::Json => "JSON",
        }
    }
}

impl core::fmt::Display for MySQLType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.to_sql_type())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cast_type_differs_from_column_type() {
        assert_eq!(MySQLType::BigInt.to_sql_type(), "BIGINT");
        assert_eq!(MySQLType::BigInt.to_cast_type(), "SIGNED");
        assert_eq!(MySQLType::Varchar.to_cast_type(), "CHAR");
    }
}

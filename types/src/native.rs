//! Provider-specific column type tags

use crate::{Dialect, ScalarKind, mysql::MySQLType, postgres::PostgreSQLType, sqlite::SQLiteType};

/// A column type in one dialect's vocabulary.
///
/// Attached to mapped members (`native_db_type`) and to bound parameters so
/// drivers can pick the right wire type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NativeType {
    SQLite(SQLiteType),
    PostgreSQL(PostgreSQLType),
    MySQL(MySQLType),
}

impl NativeType {
    /// Default native type of a scalar kind for the given dialect.
    #[must_use]
    pub const fn for_scalar(dialect: Dialect, kind: ScalarKind) -> Self {
        match dialect {
            Dialect::SQLite => Self::SQLite(SQLiteType::for_scalar(kind)),
            Dialect::PostgreSQL => Self::PostgreSQL(PostgreSQLType::for_scalar(kind)),
            Dialect::MySQL => Self::MySQL(MySQLType::for_scalar(kind)),
        }
    }

    #[must_use]
    pub const fn dialect(&self) -> Dialect {
        match self {
            Self::SQLite(_) => Dialect::SQLite,
            Self::PostgreSQL(_) => Dialect::PostgreSQL,
            Self::MySQL(_) => Dialect::MySQL,
        }
    }

    /// Type name as written in DDL.
    #[must_use]
    pub const fn to_sql_type(&self) -> &'static str {
        match self {
            Self::SQLite(t) => t.to_sql_type(),
            Self::PostgreSQL(t) => t.to_sql_type(),
            Self::MySQL(t) => t.to_sql_type(),
        }
    }

    /// Type name as written inside `CAST(x AS ...)`.
    #[must_use]
    pub const fn to_cast_type(&self) -> &'static str {
        match self {
            Self::SQLite(t) => t.to_sql_type(),
            Self::PostgreSQL(t) => t.to_sql_type(),
            Self::MySQL(t) => t.to_cast_type(),
        }
    }
}

impl From<SQLiteType> for NativeType {
    fn from(value: SQLiteType) -> Self {
        Self::SQLite(value)
    }
}

impl From<PostgreSQLType> for NativeType {
    fn from(value: PostgreSQLType) -> Self {
        Self::PostgreSQL(value)
    }
}

impl From<MySQLType> for NativeType {
    fn from(value: MySQLType) -> Self {
        Self::MySQL(value)
    }
}

impl core::fmt::Display for NativeType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.to_sql_type())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_scalar_follows_dialect() {
        let pg = NativeType::for_scalar(Dialect::PostgreSQL, ScalarKind::Int);
        assert_eq!(pg, NativeType::PostgreSQL(PostgreSQLType::Bigint));
        assert_eq!(pg.dialect(), Dialect::PostgreSQL);

        let my = NativeType::for_scalar(Dialect::MySQL, ScalarKind::Int);
        assert_eq!(my.to_cast_type(), "SIGNED");
        assert_eq!(my.to_string(), "BIGINT");
    }
}

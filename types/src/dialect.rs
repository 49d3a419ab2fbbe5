//! Database dialect identification
//!
//! Dialect selection is the one piece of configuration the compiler needs
//! from the outside world; everything else about a dialect lives behind the
//! adapter trait in `quarry-core`.

use core::fmt;
use core::str::FromStr;

/// Target SQL dialect.
///
/// ```
/// use quarry_types::Dialect;
///
/// assert_eq!("pg".parse::<Dialect>(), Ok(Dialect::PostgreSQL));
/// assert!(Dialect::PostgreSQL.uses_numbered_placeholders());
/// assert_eq!(Dialect::MySQL.identifier_quote(), '`');
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Dialect {
    #[default]
    SQLite,
    PostgreSQL,
    MySQL,
}

/// Accepted spellings, matched case-insensitively.
const ALIASES: &[(&str, Dialect)] = &[
    ("sqlite", Dialect::SQLite),
    ("sqlite3", Dialect::SQLite),
    ("libsql", Dialect::SQLite),
    ("postgresql", Dialect::PostgreSQL),
    ("postgres", Dialect::PostgreSQL),
    ("pg", Dialect::PostgreSQL),
    ("mysql", Dialect::MySQL),
    ("mariadb", Dialect::MySQL),
];

impl Dialect {
    pub const ALL: [Dialect; 3] = [Dialect::SQLite, Dialect::PostgreSQL, Dialect::MySQL];

    /// `$1, $2, ...` instead of positional `?`.
    #[inline]
    #[must_use]
    pub const fn uses_numbered_placeholders(&self) -> bool {
        matches!(self, Dialect::PostgreSQL)
    }

    /// Character opening and closing a quoted identifier.
    #[inline]
    #[must_use]
    pub const fn identifier_quote(&self) -> char {
        match self {
            Dialect::SQLite | Dialect::PostgreSQL => '"',
            Dialect::MySQL => '`',
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        ALIASES
            .iter()
            .find(|(alias, _)| alias.eq_ignore_ascii_case(s))
            .map(|&(_, dialect)| dialect)
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Dialect::SQLite => "sqlite",
            Dialect::PostgreSQL => "postgresql",
            Dialect::MySQL => "mysql",
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dialect {
    type Err = UnknownDialect;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Dialect::parse(s).ok_or_else(|| UnknownDialect(s.to_owned()))
    }
}

/// A dialect name no alias matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownDialect(pub String);

impl fmt::Display for UnknownDialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown dialect `{}`", self.0)
    }
}

impl std::error::Error for UnknownDialect {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aliases() {
        assert_eq!(Dialect::parse("SQLite"), Some(Dialect::SQLite));
        assert_eq!(Dialect::parse(" libsql "), Some(Dialect::SQLite));
        assert_eq!(Dialect::parse("PG"), Some(Dialect::PostgreSQL));
        assert_eq!(Dialect::parse("MariaDB"), Some(Dialect::MySQL));
        assert_eq!(Dialect::parse(""), None);
    }

    #[test]
    fn test_from_str_reports_input() {
        let err = "oracle".parse::<Dialect>().unwrap_err();
        assert_eq!(err.to_string(), "unknown dialect `oracle`");
    }

    #[test]
    fn test_names_round_trip() {
        for dialect in Dialect::ALL {
            assert_eq!(dialect.as_str().parse::<Dialect>(), Ok(dialect));
        }
    }
}

//! Storable scalar classification
//!
//! A mapped member either holds one of these scalar kinds directly, or it
//! needs a type handler to be converted into one.

/// The directly storable value classes of a mapped member.
///
/// This is the single source of truth the registry uses to decide whether a
/// member can be written to a column as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ScalarKind {
    /// `bool`
    Bool,
    /// `i8` through `i64`, `u8` through `u32`
    Int,
    /// `f32`, `f64`
    Float,
    /// Exact decimal numbers
    Decimal,
    /// `String`, `&str`, `char`
    Text,
    /// `Vec<u8>`, `[u8; N]`
    Bytes,
    /// Date and time values
    DateTime,
    /// 128-bit identifiers
    Guid,
}

impl ScalarKind {
    /// Numeric kinds take part in arithmetic and are inlined as literals.
    #[must_use]
    pub const fn is_numeric(&self) -> bool {
        matches!(self, Self::Int | Self::Float | Self::Decimal)
    }

    #[must_use]
    pub const fn is_text(&self) -> bool {
        matches!(self, Self::Text)
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Float => "float",
            Self::Decimal => "decimal",
            Self::Text => "text",
            Self::Bytes => "bytes",
            Self::DateTime => "datetime",
            Self::Guid => "guid",
        }
    }
}

impl core::fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_kinds() {
        assert!(ScalarKind::Int.is_numeric());
        assert!(ScalarKind::Decimal.is_numeric());
        assert!(!ScalarKind::Text.is_numeric());
        assert!(!ScalarKind::Bool.is_numeric());
    }
}

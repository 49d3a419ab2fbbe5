use compact_str::CompactString;
use thiserror::Error;

/// Which part of the pipeline a failure belongs to.
///
/// Tests assert on the kind so "should never happen" paths stay separate
/// from caller mistakes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Mapping configuration is incomplete or contradictory.
    Configuration,
    /// The query descriptor uses a shape the compiler has no rule for.
    UnsupportedExpression,
    /// The compiler reached a state it should never reach.
    Internal,
    /// Projected fields and rows do not fit the requested object shape.
    Materialization,
}

#[derive(Debug, Error)]
pub enum QuarryError {
    /// Entity type was never registered
    #[error("entity `{entity}` is not mapped")]
    UnknownEntity { entity: CompactString },

    /// Entity registered twice
    #[error("entity `{entity}` is mapped more than once")]
    DuplicateEntity { entity: CompactString },

    /// Member lookup on a mapped entity failed
    #[error("entity `{entity}` has no member `{member}`")]
    UnknownMember {
        entity: CompactString,
        member: CompactString,
    },

    /// Member is neither storable, ignored, a navigation, nor handled
    #[error(
        "member `{entity}.{member}` is not a storable scalar; mark it ignored, a navigation, or give it a type handler"
    )]
    UnmappedMember {
        entity: CompactString,
        member: CompactString,
    },

    /// Navigation has no usable key pairing
    #[error("navigation `{entity}.{member}`: {reason}")]
    NavigationKey {
        entity: CompactString,
        member: CompactString,
        reason: String,
    },

    /// Other mapping inconsistencies
    #[error("invalid mapping for `{entity}`: {reason}")]
    InvalidMapping {
        entity: CompactString,
        reason: String,
    },

    /// Expression node the compiler cannot translate
    #[error("unsupported expression `{expr}`: {reason}")]
    UnsupportedExpression { expr: String, reason: String },

    /// Method call with no SQL translation in the active dialect
    #[error("method `{method}` has no SQL translation")]
    UnknownFunction { method: String },

    /// Lambda parameter that is not bound to any table
    #[error("parameter `{name}` is not bound to a table")]
    UnboundParameter { name: CompactString },

    /// Deferred-expression stack was not drained at a clause boundary
    #[error("internal: {clause} clause finished with a pending {frame} frame")]
    PendingDeferred {
        clause: &'static str,
        frame: &'static str,
    },

    /// Popped frame kind does not match the pusher
    #[error("internal: expected a {expected} frame, found {found}")]
    UnexpectedFrame {
        expected: &'static str,
        found: &'static str,
    },

    /// Table index with no registered alias
    #[error("internal: table #{index} is not registered")]
    UnknownTable { index: usize },

    /// Parameter chunk with no collected value
    #[error("internal: parameter #{index} was never collected")]
    UnknownParameter { index: usize },

    /// Projection references a member its owner type does not have
    #[error("projected member `{member}` does not exist on `{entity}`")]
    ShapeMismatch {
        entity: CompactString,
        member: CompactString,
    },

    /// Row narrower than the plan
    #[error("row has {width} columns, ordinal {ordinal} requested")]
    RowShape { ordinal: usize, width: usize },

    /// Value could not be converted to the requested Rust type
    #[error("cannot convert {found} to {expected}")]
    Conversion {
        expected: &'static str,
        found: &'static str,
    },

    /// Type handler rejected a value
    #[error("type handler for `{member}` failed: {reason}")]
    TypeHandler {
        member: CompactString,
        reason: String,
    },
}

impl QuarryError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnknownEntity { .. }
            | Self::DuplicateEntity { .. }
            | Self::UnknownMember { .. }
            | Self::UnmappedMember { .. }
            | Self::NavigationKey { .. }
            | Self::InvalidMapping { .. } => ErrorKind::Configuration,
            Self::UnsupportedExpression { .. }
            | Self::UnknownFunction { .. }
            | Self::UnboundParameter { .. } => ErrorKind::UnsupportedExpression,
            Self::PendingDeferred { .. }
            | Self::UnexpectedFrame { .. }
            | Self::UnknownTable { .. }
            | Self::UnknownParameter { .. } => ErrorKind::Internal,
            Self::ShapeMismatch { .. }
            | Self::RowShape { .. }
            | Self::Conversion { .. }
            | Self::TypeHandler { .. } => ErrorKind::Materialization,
        }
    }

    pub(crate) fn unsupported(expr: impl core::fmt::Display, reason: impl Into<String>) -> Self {
        Self::UnsupportedExpression {
            expr: expr.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type for compilation and materialization
pub type Result<T> = std::result::Result<T, QuarryError>;

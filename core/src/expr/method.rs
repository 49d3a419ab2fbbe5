use compact_str::CompactString;
use quarry_types::ScalarKind;

/// Identity of a method call node.
///
/// Dialect adapters translate these through their function tables; the
/// compiler handles the navigation forms of [`Method::Any`] and
/// [`Method::Count`] itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Method {
    // string
    Contains,
    StartsWith,
    EndsWith,
    ToUpper,
    ToLower,
    Trim,
    TrimStart,
    TrimEnd,
    Length,
    Substring,
    Replace,
    IndexOf,
    IsNullOrEmpty,
    Concat,
    ToString,

    // nullable
    HasValue,
    Value,

    // navigation / aggregate
    Any,
    Count,
    CountDistinct,
    Sum,
    Avg,
    Max,
    Min,

    // math
    Abs,
    Round,
    Floor,
    Ceiling,

    // date
    Now,
    Year,
    Month,
    Day,

    /// A function registered on the adapter's table by name.
    Custom(CompactString),
}

impl Method {
    pub fn name(&self) -> &str {
        match self {
            Self::Contains => "contains",
            Self::StartsWith => "starts_with",
            Self::EndsWith => "ends_with",
            Self::ToUpper => "to_upper",
            Self::ToLower => "to_lower",
            Self::Trim => "trim",
            Self::TrimStart => "trim_start",
            Self::TrimEnd => "trim_end",
            Self::Length => "length",
            Self::Substring => "substring",
            Self::Replace => "replace",
            Self::IndexOf => "index_of",
            Self::IsNullOrEmpty => "is_null_or_empty",
            Self::Concat => "concat",
            Self::ToString => "to_string",
            Self::HasValue => "has_value",
            Self::Value => "value",
            Self::Any => "any",
            Self::Count => "count",
            Self::CountDistinct => "count_distinct",
            Self::Sum => "sum",
            Self::Avg => "avg",
            Self::Max => "max",
            Self::Min => "min",
            Self::Abs => "abs",
            Self::Round => "round",
            Self::Floor => "floor",
            Self::Ceiling => "ceiling",
            Self::Now => "now",
            Self::Year => "year",
            Self::Month => "month",
            Self::Day => "day",
            Self::Custom(name) => name.as_str(),
        }
    }

    /// Produces predicate text rather than a value.
    pub const fn is_predicate(&self) -> bool {
        matches!(
            self,
            Self::Contains
                | Self::StartsWith
                | Self::EndsWith
                | Self::IsNullOrEmpty
                | Self::HasValue
                | Self::Any
        )
    }

    pub const fn is_aggregate(&self) -> bool {
        matches!(
            self,
            Self::Count | Self::CountDistinct | Self::Sum | Self::Avg | Self::Max | Self::Min
        )
    }

    /// Result kind given the kind of the first operand, when known.
    pub fn result_kind(&self, operand: Option<ScalarKind>) -> Option<ScalarKind> {
        match self {
            Self::Contains
            | Self::StartsWith
            | Self::EndsWith
            | Self::IsNullOrEmpty
            | Self::HasValue
            | Self::Any => Some(ScalarKind::Bool),
            Self::ToUpper
            | Self::ToLower
            | Self::Trim
            | Self::TrimStart
            | Self::TrimEnd
            | Self::Substring
            | Self::Replace
            | Self::Concat
            | Self::ToString => Some(ScalarKind::Text),
            Self::Length
            | Self::IndexOf
            | Self::Count
            | Self::CountDistinct
            | Self::Year
            | Self::Month
            | Self::Day => Some(ScalarKind::Int),
            Self::Avg => Some(ScalarKind::Float),
            Self::Now => Some(ScalarKind::DateTime),
            Self::Value
            | Self::Sum
            | Self::Max
            | Self::Min
            | Self::Abs
            | Self::Round
            | Self::Floor
            | Self::Ceiling => operand,
            Self::Custom(_) => None,
        }
    }
}

impl core::fmt::Display for Method {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

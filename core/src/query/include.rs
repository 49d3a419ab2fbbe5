use compact_str::CompactString;

use crate::expr::Lambda;

/// A navigation to load alongside the root entity.
///
/// ```ignore
/// Include::new("orders")
///     .filter(Lambda::new(["o"], root("o").get("total").gt(100)))
///     .then_include(Include::new("lines"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Include {
    pub(crate) member: CompactString,
    pub(crate) filter: Option<Lambda>,
    pub(crate) nested: Vec<Include>,
}

impl Include {
    pub fn new(member: impl Into<CompactString>) -> Self {
        Self {
            member: member.into(),
            filter: None,
            nested: Vec::new(),
        }
    }

    /// Restricts which related rows are loaded; ANDed into the join.
    pub fn filter(mut self, predicate: Lambda) -> Self {
        self.filter = Some(predicate);
        self
    }

    /// Loads a navigation of the included entity.
    pub fn then_include(mut self, include: impl Into<Include>) -> Self {
        self.nested.push(include.into());
        self
    }

    pub fn member(&self) -> &str {
        &self.member
    }
}

impl From<&str> for Include {
    fn from(member: &str) -> Self {
        Self::new(member)
    }
}

impl From<CompactString> for Include {
    fn from(member: CompactString) -> Self {
        Self::new(member)
    }
}

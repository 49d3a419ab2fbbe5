use std::sync::Arc;

use compact_str::CompactString;
use smallvec::SmallVec;

use crate::mapping::{Cardinality, TypeHandler};

/// Where a projected column comes from relative to the object graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldOrigin {
    /// A member of the projection root.
    Target,
    /// A member of a navigated or nested object.
    Navigation(Cardinality),
}

/// Descriptor of one select-list column.
#[derive(Debug, Clone)]
pub struct ProjectedField {
    /// Position in the result row.
    pub ordinal: usize,
    /// Output column name.
    pub name: CompactString,
    /// Member path from the root; the last element is the member the
    /// column fills. Empty for a scalar projection.
    pub path: SmallVec<[CompactString; 4]>,
    /// Entity declaring the member, `None` for anonymous objects.
    pub owner: Option<CompactString>,
    /// Table the column is read from.
    pub table: Option<usize>,
    pub origin: FieldOrigin,
    pub is_key: bool,
    pub handler: Option<Arc<dyn TypeHandler>>,
}

impl ProjectedField {
    /// Member the column fills.
    pub fn member(&self) -> &str {
        self.path.last().map_or(self.name.as_str(), CompactString::as_str)
    }

    /// Path of the object owning the member.
    pub fn parent_path(&self) -> &[CompactString] {
        match self.path.split_last() {
            Some((_, parents)) => parents,
            None => &[],
        }
    }

    pub fn cardinality(&self) -> Option<Cardinality> {
        match self.origin {
            FieldOrigin::Target => None,
            FieldOrigin::Navigation(cardinality) => Some(cardinality),
        }
    }
}

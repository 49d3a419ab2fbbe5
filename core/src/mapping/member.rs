use std::sync::Arc;

use compact_str::CompactString;
use quarry_types::{NativeType, ScalarKind};

use super::handler::TypeHandler;

/// What a member holds, declared explicitly at configuration time.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MemberType {
    /// Directly storable.
    Scalar(ScalarKind),
    /// Not directly storable (structured or collection-valued); needs a
    /// type handler or must be ignored.
    Custom(CompactString),
    /// A related entity (to-one navigation).
    Entity(CompactString),
    /// A collection of related entities (to-many navigation).
    Collection(CompactString),
}

impl MemberType {
    pub fn custom(name: impl Into<CompactString>) -> Self {
        Self::Custom(name.into())
    }

    pub const fn scalar(&self) -> Option<ScalarKind> {
        match self {
            Self::Scalar(kind) => Some(*kind),
            _ => None,
        }
    }
}

impl From<ScalarKind> for MemberType {
    fn from(value: ScalarKind) -> Self {
        Self::Scalar(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cardinality {
    ToOne,
    ToMany,
}

/// Resolved navigation metadata.
///
/// The join condition between the owner's table and the target's table is
/// always `owner.owner_column = target.target_column`:
/// - to-one: owner foreign key = target primary key
/// - to-many: owner primary key = target foreign key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    pub target: CompactString,
    /// Slimmer projection type exposed instead of the full target.
    pub map_to: Option<CompactString>,
    pub cardinality: Cardinality,
    /// Foreign-key member name (on the owner for to-one, on the target for to-many).
    pub foreign_key: CompactString,
    pub owner_column: CompactString,
    pub target_column: CompactString,
}

impl Navigation {
    /// Entity whose map the navigation materializes into.
    pub fn exposed_entity(&self) -> &str {
        self.map_to.as_deref().unwrap_or(&self.target)
    }

    pub fn is_to_one(&self) -> bool {
        self.cardinality == Cardinality::ToOne
    }
}

/// One mapped member of an entity.
#[derive(Debug, Clone)]
pub struct MemberMap {
    pub name: CompactString,
    /// Column name; `None` for navigations and ignored members.
    pub column: Option<CompactString>,
    pub member_type: MemberType,
    pub native_type: Option<NativeType>,
    pub is_key: bool,
    pub is_auto_increment: bool,
    pub is_ignored: bool,
    pub navigation: Option<Navigation>,
    pub type_handler: Option<Arc<dyn TypeHandler>>,
}

impl MemberMap {
    #[inline]
    pub fn is_navigation(&self) -> bool {
        self.navigation.is_some()
    }

    #[inline]
    pub fn is_to_one(&self) -> bool {
        self.navigation.as_ref().is_some_and(Navigation::is_to_one)
    }

    /// Stored in a column of its own.
    #[inline]
    pub fn is_mapped(&self) -> bool {
        !self.is_ignored && self.column.is_some()
    }

    pub fn column_name(&self) -> Option<&str> {
        self.column.as_deref()
    }

    /// Kind of value the column holds: the scalar itself, or whatever the
    /// type handler stores.
    pub fn store_kind(&self) -> Option<ScalarKind> {
        match (&self.type_handler, &self.member_type) {
            (Some(handler), _) => Some(handler.store_kind()),
            (None, MemberType::Scalar(kind)) => Some(*kind),
            _ => None,
        }
    }
}

use compact_str::CompactString;
use smallvec::SmallVec;

use super::member::MemberMap;
use crate::error::{QuarryError, Result};

/// Resolved mapping of one entity type.
///
/// Built by [`RegistryBuilder::build`](super::RegistryBuilder::build) and
/// immutable afterwards.
#[derive(Debug, Clone)]
pub struct EntityMap {
    pub(crate) name: CompactString,
    pub(crate) table: CompactString,
    pub(crate) field_prefix: Option<CompactString>,
    pub(crate) members: Vec<MemberMap>,
    /// Indices into `members`.
    pub(crate) keys: SmallVec<[usize; 2]>,
    pub(crate) auto_increment: Option<usize>,
    /// Source entity when this map is a projection of another one.
    pub(crate) projection_of: Option<CompactString>,
}

impl EntityMap {
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn field_prefix(&self) -> Option<&str> {
        self.field_prefix.as_deref()
    }

    pub fn projection_of(&self) -> Option<&str> {
        self.projection_of.as_deref()
    }

    pub fn member(&self, name: &str) -> Option<&MemberMap> {
        self.members.iter().find(|m| m.name == name)
    }

    pub fn require_member(&self, name: &str) -> Result<&MemberMap> {
        self.member(name).ok_or_else(|| QuarryError::UnknownMember {
            entity: self.name.clone(),
            member: name.into(),
        })
    }

    /// All members in declaration order.
    pub fn members(&self) -> &[MemberMap] {
        &self.members
    }

    pub fn key_members(&self) -> impl Iterator<Item = &MemberMap> + '_ {
        self.keys.iter().map(|&i| &self.members[i])
    }

    /// The key member when the entity has exactly one.
    pub fn single_key(&self) -> Option<&MemberMap> {
        match self.keys.as_slice() {
            [only] => Some(&self.members[*only]),
            _ => None,
        }
    }

    pub fn auto_increment(&self) -> Option<&MemberMap> {
        self.auto_increment.map(|i| &self.members[i])
    }

    /// Members stored in a column of their own, in declaration order.
    pub fn columns(&self) -> impl Iterator<Item = &MemberMap> + '_ {
        self.members.iter().filter(|m| m.is_mapped())
    }

    /// Members that navigate to other entities.
    pub fn navigations(&self) -> impl Iterator<Item = &MemberMap> + '_ {
        self.members
            .iter()
            .filter(|m| !m.is_ignored && m.is_navigation())
    }
}

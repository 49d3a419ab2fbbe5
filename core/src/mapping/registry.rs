use compact_str::CompactString;
use hashbrown::HashMap;

use super::entity::EntityMap;
use crate::error::{QuarryError, Result};

/// Immutable set of entity maps, shared by every compilation.
#[derive(Debug, Default)]
pub struct EntityRegistry {
    maps: HashMap<CompactString, EntityMap>,
}

impl EntityRegistry {
    pub(crate) fn new(maps: HashMap<CompactString, EntityMap>) -> Self {
        Self { maps }
    }

    /// Map of `entity`, failing with [`QuarryError::UnknownEntity`].
    pub fn get_map(&self, entity: &str) -> Result<&EntityMap> {
        self.maps
            .get(entity)
            .ok_or_else(|| QuarryError::UnknownEntity {
                entity: entity.into(),
            })
    }

    pub fn try_get_map(&self, entity: &str) -> Option<&EntityMap> {
        self.maps.get(entity)
    }

    /// Registered entity names, in no particular order.
    pub fn entities(&self) -> impl Iterator<Item = &str> + '_ {
        self.maps.keys().map(CompactString::as_str)
    }

    pub fn len(&self) -> usize {
        self.maps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.maps.is_empty()
    }
}

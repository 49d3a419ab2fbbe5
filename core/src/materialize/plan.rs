use std::sync::Arc;

use compact_str::CompactString;
use smallvec::SmallVec;

use super::{FieldOrigin, ProjectedField};
use crate::error::{QuarryError, Result};
use crate::mapping::{Cardinality, EntityRegistry, TypeHandler};

/// One column feeding one member.
#[derive(Debug, Clone)]
pub struct FieldSlot {
    pub ordinal: usize,
    pub member: CompactString,
    pub handler: Option<Arc<dyn TypeHandler>>,
}

/// One object type in the result graph.
#[derive(Debug, Clone)]
pub struct PlanNode {
    /// Entity the object is built as, `None` for anonymous objects.
    pub entity: Option<CompactString>,
    /// Member of the parent object this node fills; `None` at the root.
    pub member: Option<CompactString>,
    pub cardinality: Cardinality,
    pub fields: Vec<FieldSlot>,
    /// Slots (indices into `fields`) identifying an object.
    pub key_slots: SmallVec<[usize; 2]>,
    pub children: Vec<PlanNode>,
}

impl PlanNode {
    fn new(member: Option<CompactString>, cardinality: Cardinality) -> Self {
        Self {
            entity: None,
            member,
            cardinality,
            fields: Vec::new(),
            key_slots: SmallVec::new(),
            children: Vec::new(),
        }
    }

    /// Slots compared to tell objects apart: the keys, or every field of
    /// an object without keys.
    pub fn identity_slots(&self) -> SmallVec<[usize; 2]> {
        if self.key_slots.is_empty() {
            (0..self.fields.len()).collect()
        } else {
            self.key_slots.clone()
        }
    }

    pub fn has_collections(&self) -> bool {
        self.children
            .iter()
            .any(|c| c.cardinality == Cardinality::ToMany || c.has_collections())
    }
}

/// How to rebuild objects from the rows of one compiled query.
#[derive(Debug, Clone)]
pub enum MaterializationPlan {
    /// Each row is one value.
    Scalar(FieldSlot),
    /// Each distinct root identity is one object.
    Object { root: PlanNode, grouped: bool },
}

impl MaterializationPlan {
    pub fn build(registry: &EntityRegistry, fields: &[ProjectedField]) -> Result<Self> {
        if let [only] = fields
            && only.path.is_empty()
        {
            return Ok(Self::Scalar(FieldSlot {
                ordinal: only.ordinal,
                member: only.name.clone(),
                handler: only.handler.clone(),
            }));
        }

        let mut root = PlanNode::new(None, Cardinality::ToOne);
        for field in fields {
            let Some((member, parents)) = field.path.split_last() else {
                return Err(QuarryError::ShapeMismatch {
                    entity: field.owner.clone().unwrap_or_else(|| "<projection>".into()),
                    member: field.name.clone(),
                });
            };

            let mut node = &mut root;
            for (depth, segment) in parents.iter().enumerate() {
                let index = match node
                    .children
                    .iter()
                    .position(|c| c.member.as_ref() == Some(segment))
                {
                    Some(index) => index,
                    None => {
                        node.children
                            .push(PlanNode::new(Some(segment.clone()), Cardinality::ToOne));
                        node.children.len() - 1
                    }
                };
                node = &mut node.children[index];
                if depth + 1 == parents.len()
                    && let FieldOrigin::Navigation(cardinality) = field.origin
                {
                    node.cardinality = cardinality;
                }
            }

            if node.entity.is_none() {
                node.entity.clone_from(&field.owner);
            }
            if field.is_key {
                node.key_slots.push(node.fields.len());
            }
            node.fields.push(FieldSlot {
                ordinal: field.ordinal,
                member: member.clone(),
                handler: field.handler.clone(),
            });
        }

        validate(registry, &root)?;
        let grouped = root.has_collections();
        Ok(Self::Object { root, grouped })
    }

    pub fn root(&self) -> Option<&PlanNode> {
        match self {
            Self::Scalar(_) => None,
            Self::Object { root, .. } => Some(root),
        }
    }
}

fn validate(registry: &EntityRegistry, node: &PlanNode) -> Result<()> {
    if let Some(entity) = &node.entity {
        let map = registry.get_map(entity)?;
        let missing = node
            .fields
            .iter()
            .map(|f| &f.member)
            .chain(node.children.iter().filter_map(|c| c.member.as_ref()))
            .find(|member| map.member(member).is_none());
        if let Some(member) = missing {
            return Err(QuarryError::ShapeMismatch {
                entity: entity.clone(),
                member: member.clone(),
            });
        }
    }
    node.children.iter().try_for_each(|child| validate(registry, child))
}

#[cfg(test)]
mod tests {
    use quarry_types::ScalarKind;

    use super::*;
    use crate::mapping::RegistryBuilder;

    fn registry() -> EntityRegistry {
        RegistryBuilder::new()
            .entity("User", |e| {
                e.member("id", ScalarKind::Int).key();
                e.member("name", ScalarKind::Text);
                e.has_many("orders", "Order");
            })
            .entity("Order", |e| {
                e.member("id", ScalarKind::Int).key();
                e.member("user_id", ScalarKind::Int);
            })
            .build()
            .unwrap()
    }

    fn field(ordinal: usize, path: &[&str], owner: &str, origin: FieldOrigin, is_key: bool) -> ProjectedField {
        ProjectedField {
            ordinal,
            name: path.join("_").into(),
            path: path.iter().map(|s| CompactString::from(*s)).collect(),
            owner: Some(owner.into()),
            table: None,
            origin,
            is_key,
            handler: None,
        }
    }

    #[test]
    fn test_nested_collection_plan() {
        let fields = [
            field(0, &["id"], "User", FieldOrigin::Target, true),
            field(1, &["name"], "User", FieldOrigin::Target, false),
            field(2, &["orders", "id"], "Order", FieldOrigin::Navigation(Cardinality::ToMany), true),
        ];
        let plan = MaterializationPlan::build(&registry(), &fields).unwrap();
        let MaterializationPlan::Object { root, grouped } = plan else {
            panic!("expected an object plan");
        };
        assert!(grouped);
        assert_eq!(root.entity.as_deref(), Some("User"));
        assert_eq!(root.fields.len(), 2);
        assert_eq!(root.children[0].cardinality, Cardinality::ToMany);
        assert_eq!(root.children[0].key_slots.as_slice(), &[0]);
    }

    #[test]
    fn test_unknown_member_is_shape_mismatch() {
        let fields = [field(0, &["email"], "User", FieldOrigin::Target, false)];
        let err = MaterializationPlan::build(&registry(), &fields).unwrap_err();
        assert!(matches!(err, QuarryError::ShapeMismatch { .. }));
    }

    #[test]
    fn test_scalar_plan() {
        let mut only = field(0, &[], "User", FieldOrigin::Target, false);
        only.owner = None;
        let plan = MaterializationPlan::build(&registry(), &[only]).unwrap();
        assert!(matches!(plan, MaterializationPlan::Scalar(_)));
    }
}

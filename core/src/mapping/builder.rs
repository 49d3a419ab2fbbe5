use std::sync::Arc;

use compact_str::{CompactString, format_compact};
use hashbrown::HashMap;
use heck::{ToLowerCamelCase, ToSnakeCase};
use quarry_types::NativeType;
use smallvec::SmallVec;

use super::entity::EntityMap;
use super::handler::TypeHandler;
use super::member::{Cardinality, MemberMap, MemberType, Navigation};
use super::registry::EntityRegistry;
use crate::error::{QuarryError, Result};

/// How default table and column names derive from entity and member names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FieldNaming {
    /// `UserName` stays `UserName`.
    #[default]
    AsIs,
    /// `UserName` becomes `user_name`.
    SnakeCase,
    /// `UserName` becomes `username`.
    LowerCase,
}

impl FieldNaming {
    pub fn apply(self, name: &str) -> CompactString {
        match self {
            Self::AsIs => name.into(),
            Self::SnakeCase => name.to_snake_case().into(),
            Self::LowerCase => name.to_lowercase().into(),
        }
    }
}

/// Declared navigation configuration, resolved at build time.
#[derive(Debug, Clone, Default)]
struct NavigationDecl {
    foreign_key: Option<CompactString>,
    map_to: Option<CompactString>,
}

/// Configuration of one member.
#[derive(Debug, Clone)]
pub struct MemberBuilder {
    name: CompactString,
    member_type: MemberType,
    column: Option<CompactString>,
    native_type: Option<NativeType>,
    is_key: bool,
    is_auto_increment: bool,
    is_ignored: bool,
    type_handler: Option<Arc<dyn TypeHandler>>,
    navigation: Option<NavigationDecl>,
}

impl MemberBuilder {
    fn new(name: CompactString, member_type: MemberType) -> Self {
        let navigation = matches!(
            member_type,
            MemberType::Entity(_) | MemberType::Collection(_)
        )
        .then(NavigationDecl::default);
        Self {
            name,
            member_type,
            column: None,
            native_type: None,
            is_key: false,
            is_auto_increment: false,
            is_ignored: false,
            type_handler: None,
            navigation,
        }
    }

    /// Column name, overriding the naming policy.
    pub fn field(&mut self, column: impl Into<CompactString>) -> &mut Self {
        self.column = Some(column.into());
        self
    }

    pub fn native_db_type(&mut self, native: impl Into<NativeType>) -> &mut Self {
        self.native_type = Some(native.into());
        self
    }

    pub fn key(&mut self) -> &mut Self {
        self.is_key = true;
        self
    }

    pub fn auto_increment(&mut self) -> &mut Self {
        self.is_auto_increment = true;
        self
    }

    pub fn ignore(&mut self) -> &mut Self {
        self.is_ignored = true;
        self
    }

    pub fn type_handler(&mut self, handler: impl TypeHandler + 'static) -> &mut Self {
        self.type_handler = Some(Arc::new(handler));
        self
    }

    /// Shares one handler instance between several members.
    pub fn shared_type_handler(&mut self, handler: Arc<dyn TypeHandler>) -> &mut Self {
        self.type_handler = Some(handler);
        self
    }
}

/// Navigation configuration returned by [`EntityBuilder::has_one`] and
/// [`EntityBuilder::has_many`].
#[derive(Debug)]
pub struct NavigationBuilder<'b> {
    member: &'b mut MemberBuilder,
}

impl NavigationBuilder<'_> {
    /// Foreign-key member: on the owner for `has_one`, on the target for
    /// `has_many`.
    pub fn has_foreign_key(self, member: impl Into<CompactString>) -> Self {
        if let Some(nav) = self.member.navigation.as_mut() {
            nav.foreign_key = Some(member.into());
        }
        self
    }

    /// Materialize the navigation into a projection entity instead of the
    /// full target.
    pub fn map_to(self, entity: impl Into<CompactString>) -> Self {
        if let Some(nav) = self.member.navigation.as_mut() {
            nav.map_to = Some(entity.into());
        }
        self
    }

    pub fn ignore(self) -> Self {
        self.member.is_ignored = true;
        self
    }
}

/// Configuration of one entity, handed to the closure passed to
/// [`RegistryBuilder::entity`].
#[derive(Debug, Clone)]
pub struct EntityBuilder {
    name: CompactString,
    table: Option<CompactString>,
    field_prefix: Option<CompactString>,
    keys: Vec<CompactString>,
    members: Vec<MemberBuilder>,
}

impl EntityBuilder {
    fn new(name: CompactString) -> Self {
        Self {
            name,
            table: None,
            field_prefix: None,
            keys: Vec::new(),
            members: Vec::new(),
        }
    }

    pub fn to_table(&mut self, table: impl Into<CompactString>) -> &mut Self {
        self.table = Some(table.into());
        self
    }

    /// Prefix prepended to every derived column name.
    pub fn field_prefix(&mut self, prefix: impl Into<CompactString>) -> &mut Self {
        self.field_prefix = Some(prefix.into());
        self
    }

    /// Declares the key members, replacing any earlier declaration.
    pub fn key<I, S>(&mut self, members: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<CompactString>,
    {
        self.keys = members.into_iter().map(Into::into).collect();
        self
    }

    /// Declares a member, or redeclares one with a new type.
    pub fn member(
        &mut self,
        name: impl Into<CompactString>,
        member_type: impl Into<MemberType>,
    ) -> &mut MemberBuilder {
        let name = name.into();
        let member = MemberBuilder::new(name.clone(), member_type.into());
        let index = match self.members.iter().position(|m| m.name == name) {
            Some(index) => {
                self.members[index] = member;
                index
            }
            None => {
                self.members.push(member);
                self.members.len() - 1
            }
        };
        &mut self.members[index]
    }

    /// Declares a member that is not persisted.
    pub fn ignore(
        &mut self,
        name: impl Into<CompactString>,
        member_type: impl Into<MemberType>,
    ) -> &mut MemberBuilder {
        self.member(name, member_type).ignore()
    }

    /// To-one navigation to `target`.
    pub fn has_one(
        &mut self,
        name: impl Into<CompactString>,
        target: impl Into<CompactString>,
    ) -> NavigationBuilder<'_> {
        let member = self.member(name, MemberType::Entity(target.into()));
        NavigationBuilder { member }
    }

    /// To-many navigation to `target`.
    pub fn has_many(
        &mut self,
        name: impl Into<CompactString>,
        target: impl Into<CompactString>,
    ) -> NavigationBuilder<'_> {
        let member = self.member(name, MemberType::Collection(target.into()));
        NavigationBuilder { member }
    }
}

#[derive(Debug, Clone)]
struct ProjectionDecl {
    name: CompactString,
    of: CompactString,
    members: Vec<CompactString>,
}

/// Collects entity configuration and builds an [`EntityRegistry`].
#[derive(Debug, Clone, Default)]
pub struct RegistryBuilder {
    naming: FieldNaming,
    entities: Vec<EntityBuilder>,
    projections: Vec<ProjectionDecl>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn naming(mut self, naming: FieldNaming) -> Self {
        self.naming = naming;
        self
    }

    pub fn entity<F>(mut self, name: impl Into<CompactString>, configure: F) -> Self
    where
        F: FnOnce(&mut EntityBuilder),
    {
        let mut entity = EntityBuilder::new(name.into());
        configure(&mut entity);
        self.entities.push(entity);
        self
    }

    /// Declares `name` as a narrower view of `of`: same table and keys, only
    /// the listed members (keys are always carried).
    pub fn projection<I, S>(
        mut self,
        name: impl Into<CompactString>,
        of: impl Into<CompactString>,
        members: I,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<CompactString>,
    {
        self.projections.push(ProjectionDecl {
            name: name.into(),
            of: of.into(),
            members: members.into_iter().map(Into::into).collect(),
        });
        self
    }

    /// Validates every declaration and resolves columns, keys, navigation
    /// join columns and projections.
    pub fn build(self) -> Result<EntityRegistry> {
        let mut maps: HashMap<CompactString, EntityMap> =
            HashMap::with_capacity(self.entities.len() + self.projections.len());
        let mut navigations = Vec::new();

        for entity in &self.entities {
            if maps.contains_key(&entity.name) {
                return Err(QuarryError::DuplicateEntity {
                    entity: entity.name.clone(),
                });
            }
            let map = self.resolve_entity(entity, &mut navigations)?;
            maps.insert(entity.name.clone(), map);
        }

        for pending in navigations {
            let navigation = resolve_navigation(&maps, &pending)?;
            if let Some(member) = maps
                .get_mut(&pending.owner)
                .and_then(|map| map.members.get_mut(pending.index))
            {
                member.navigation = Some(navigation);
            }
        }

        for projection in &self.projections {
            if maps.contains_key(&projection.name) {
                return Err(QuarryError::DuplicateEntity {
                    entity: projection.name.clone(),
                });
            }
            let source = maps
                .get(&projection.of)
                .ok_or_else(|| QuarryError::UnknownEntity {
                    entity: projection.of.clone(),
                })?;
            let map = project(source, projection)?;
            maps.insert(projection.name.clone(), map);
        }

        validate_map_to(&maps)?;

        let registry = EntityRegistry::new(maps);
        crate::quarry_trace_registry!(registry.len());
        Ok(registry)
    }

    fn resolve_entity(
        &self,
        entity: &EntityBuilder,
        navigations: &mut Vec<PendingNavigation>,
    ) -> Result<EntityMap> {
        let mut members = Vec::with_capacity(entity.members.len());

        for (index, decl) in entity.members.iter().enumerate() {
            let column = match (&decl.member_type, decl.is_ignored) {
                (_, true) => None,
                (MemberType::Scalar(_), false) => Some(self.column_name(entity, decl)),
                (MemberType::Custom(_), false) => {
                    if decl.type_handler.is_none() {
                        return Err(QuarryError::UnmappedMember {
                            entity: entity.name.clone(),
                            member: decl.name.clone(),
                        });
                    }
                    Some(self.column_name(entity, decl))
                }
                (MemberType::Entity(target) | MemberType::Collection(target), false) => {
                    let cardinality = match decl.member_type {
                        MemberType::Entity(_) => Cardinality::ToOne,
                        _ => Cardinality::ToMany,
                    };
                    let decl_nav = decl.navigation.clone().unwrap_or_default();
                    navigations.push(PendingNavigation {
                        owner: entity.name.clone(),
                        member: decl.name.clone(),
                        index,
                        target: target.clone(),
                        cardinality,
                        foreign_key: decl_nav.foreign_key,
                        map_to: decl_nav.map_to,
                    });
                    None
                }
            };

            members.push(MemberMap {
                name: decl.name.clone(),
                column,
                member_type: decl.member_type.clone(),
                native_type: decl.native_type,
                is_key: false,
                is_auto_increment: decl.is_auto_increment && !decl.is_ignored,
                is_ignored: decl.is_ignored,
                navigation: None,
                type_handler: decl.type_handler.clone(),
            });
        }

        let keys = resolve_keys(entity, &members)?;
        for &key in &keys {
            members[key].is_key = true;
        }

        let mut auto_increment = members.iter().enumerate().filter(|(_, m)| m.is_auto_increment);
        let first_auto = auto_increment.next().map(|(i, _)| i);
        if auto_increment.next().is_some() {
            return Err(QuarryError::InvalidMapping {
                entity: entity.name.clone(),
                reason: "more than one auto-increment member".into(),
            });
        }

        Ok(EntityMap {
            name: entity.name.clone(),
            table: entity
                .table
                .clone()
                .unwrap_or_else(|| self.naming.apply(&entity.name)),
            field_prefix: entity.field_prefix.clone(),
            members,
            keys,
            auto_increment: first_auto,
            projection_of: None,
        })
    }

    fn column_name(&self, entity: &EntityBuilder, member: &MemberBuilder) -> CompactString {
        if let Some(column) = &member.column {
            return column.clone();
        }
        let base = self.naming.apply(&member.name);
        match &entity.field_prefix {
            Some(prefix) => format_compact!("{prefix}{base}"),
            None => base,
        }
    }
}

fn resolve_keys(entity: &EntityBuilder, members: &[MemberMap]) -> Result<SmallVec<[usize; 2]>> {
    let mut keys: SmallVec<[usize; 2]> = SmallVec::new();
    for name in &entity.keys {
        let index = members
            .iter()
            .position(|m| &m.name == name)
            .ok_or_else(|| QuarryError::UnknownMember {
                entity: entity.name.clone(),
                member: name.clone(),
            })?;
        keys.push(index);
    }
    for (index, decl) in entity.members.iter().enumerate() {
        if decl.is_key && !keys.contains(&index) {
            keys.push(index);
        }
    }
    if keys.is_empty()
        && let Some(index) = members
            .iter()
            .position(|m| m.is_mapped() && m.member_type.scalar().is_some() && m.name.eq_ignore_ascii_case("id"))
    {
        keys.push(index);
    }
    if let Some(&bad) = keys.iter().find(|&&i| !members[i].is_mapped()) {
        return Err(QuarryError::InvalidMapping {
            entity: entity.name.clone(),
            reason: format!("key member `{}` is not stored in a column", members[bad].name),
        });
    }
    Ok(keys)
}

struct PendingNavigation {
    owner: CompactString,
    member: CompactString,
    index: usize,
    target: CompactString,
    cardinality: Cardinality,
    foreign_key: Option<CompactString>,
    map_to: Option<CompactString>,
}

impl PendingNavigation {
    fn error(&self, reason: impl Into<String>) -> QuarryError {
        QuarryError::NavigationKey {
            entity: self.owner.clone(),
            member: self.member.clone(),
            reason: reason.into(),
        }
    }
}

fn resolve_navigation(
    maps: &HashMap<CompactString, EntityMap>,
    pending: &PendingNavigation,
) -> Result<Navigation> {
    let owner = maps
        .get(&pending.owner)
        .ok_or_else(|| QuarryError::UnknownEntity {
            entity: pending.owner.clone(),
        })?;
    let target = maps
        .get(&pending.target)
        .ok_or_else(|| pending.error(format!("target entity `{}` is not mapped", pending.target)))?;
    let target_key = target
        .single_key()
        .ok_or_else(|| pending.error(format!("`{}` must have exactly one key", target.name)))?;

    let (owner_column, target_column, foreign_key) = match pending.cardinality {
        Cardinality::ToOne => {
            let fk = find_foreign_key(owner, pending, || {
                [
                    format_compact!("{}_id", pending.member),
                    format_compact!("{}Id", pending.member),
                    format_compact!("{}_id", pending.member.to_snake_case()),
                ]
            })?;
            (column_of(fk), column_of(target_key), fk.name.clone())
        }
        Cardinality::ToMany => {
            let owner_key = owner
                .single_key()
                .ok_or_else(|| pending.error(format!("`{}` must have exactly one key", owner.name)))?;
            let fk = find_foreign_key(target, pending, || {
                [
                    format_compact!("{}_id", owner.name.to_snake_case()),
                    format_compact!("{}Id", owner.name),
                    format_compact!("{}Id", owner.name.to_lower_camel_case()),
                ]
            })?;
            (column_of(owner_key), column_of(fk), fk.name.clone())
        }
    };

    Ok(Navigation {
        target: pending.target.clone(),
        map_to: pending.map_to.clone(),
        cardinality: pending.cardinality,
        foreign_key,
        owner_column,
        target_column,
    })
}

/// Looks up the explicit foreign key on `side`, or the first conventional
/// candidate that exists.
fn find_foreign_key<'m, F>(
    side: &'m EntityMap,
    pending: &PendingNavigation,
    candidates: F,
) -> Result<&'m MemberMap>
where
    F: FnOnce() -> [CompactString; 3],
{
    let found = match &pending.foreign_key {
        Some(name) => side.member(name).ok_or_else(|| {
            pending.error(format!("foreign key `{name}` is not a member of `{}`", side.name))
        })?,
        None => candidates()
            .iter()
            .find_map(|name| side.member(name))
            .ok_or_else(|| {
                pending.error(format!(
                    "no foreign key declared and none found by convention on `{}`",
                    side.name
                ))
            })?,
    };
    if !found.is_mapped() {
        return Err(pending.error(format!(
            "foreign key `{}` is not stored in a column",
            found.name
        )));
    }
    Ok(found)
}

fn column_of(member: &MemberMap) -> CompactString {
    member.column.clone().unwrap_or_else(|| member.name.clone())
}

fn project(source: &EntityMap, decl: &ProjectionDecl) -> Result<EntityMap> {
    let mut members = Vec::new();
    for member in source.key_members() {
        members.push(member.clone());
    }
    for name in &decl.members {
        if members.iter().any(|m: &MemberMap| &m.name == name) {
            continue;
        }
        members.push(source.require_member(name)?.clone());
    }

    let keys = members
        .iter()
        .enumerate()
        .filter(|(_, m)| m.is_key)
        .map(|(i, _)| i)
        .collect();
    let auto_increment = members.iter().position(|m| m.is_auto_increment);

    Ok(EntityMap {
        name: decl.name.clone(),
        table: source.table.clone(),
        field_prefix: source.field_prefix.clone(),
        members,
        keys,
        auto_increment,
        projection_of: Some(source.name.clone()),
    })
}

fn validate_map_to(maps: &HashMap<CompactString, EntityMap>) -> Result<()> {
    for map in maps.values() {
        for member in map.navigations() {
            let Some(nav) = &member.navigation else {
                continue;
            };
            let Some(exposed) = &nav.map_to else {
                continue;
            };
            let fits = maps
                .get(exposed)
                .is_some_and(|m| m.name == nav.target || m.projection_of() == Some(nav.target.as_str()));
            if !fits {
                return Err(QuarryError::NavigationKey {
                    entity: map.name.clone(),
                    member: member.name.clone(),
                    reason: format!("`{exposed}` is not a projection of `{}`", nav.target),
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use quarry_types::ScalarKind;
    use crate::mapping::FnTypeHandler;
    use crate::value::Value;

    fn shop() -> RegistryBuilder {
        RegistryBuilder::new()
            .entity("User", |e| {
                e.member("id", ScalarKind::Int).key().auto_increment();
                e.member("name", ScalarKind::Text).field("user_name");
                e.member("company_id", ScalarKind::Int);
                e.has_one("company", "Company");
                e.has_many("orders", "Order").has_foreign_key("buyer_id");
            })
            .entity("Company", |e| {
                e.to_table("companies");
                e.member("id", ScalarKind::Int);
                e.member("title", ScalarKind::Text);
            })
            .entity("Order", |e| {
                e.member("id", ScalarKind::Int);
                e.member("buyer_id", ScalarKind::Int);
            })
    }

    #[test]
    fn test_columns_and_keys() {
        let registry = shop().build().unwrap();
        let user = registry.get_map("User").unwrap();
        assert_eq!(user.table(), "User");
        assert_eq!(user.require_member("name").unwrap().column_name(), Some("user_name"));
        assert_eq!(user.single_key().unwrap().name, "id");
        assert_eq!(user.auto_increment().unwrap().name, "id");
        assert_eq!(user.columns().count(), 3);

        let company = registry.get_map("Company").unwrap();
        assert_eq!(company.table(), "companies");
        assert!(company.require_member("id").unwrap().is_key);
    }

    #[test]
    fn test_navigation_resolution() {
        let registry = shop().build().unwrap();
        let user = registry.get_map("User").unwrap();

        let company = user.member("company").unwrap().navigation.as_ref().unwrap();
        assert_eq!(company.cardinality, Cardinality::ToOne);
        assert_eq!(company.foreign_key, "company_id");
        assert_eq!(company.owner_column, "company_id");
        assert_eq!(company.target_column, "id");

        let orders = user.member("orders").unwrap().navigation.as_ref().unwrap();
        assert_eq!(orders.cardinality, Cardinality::ToMany);
        assert_eq!(orders.owner_column, "id");
        assert_eq!(orders.target_column, "buyer_id");
    }

    #[test]
    fn test_naming_and_prefix() {
        let registry = RegistryBuilder::new()
            .naming(FieldNaming::SnakeCase)
            .entity("OrderLine", |e| {
                e.field_prefix("ol_");
                e.member("Id", ScalarKind::Int);
                e.member("UnitPrice", ScalarKind::Decimal);
            })
            .build()
            .unwrap();
        let line = registry.get_map("OrderLine").unwrap();
        assert_eq!(line.table(), "order_line");
        assert_eq!(
            line.member("UnitPrice").unwrap().column_name(),
            Some("ol_unit_price")
        );
        assert_eq!(line.single_key().unwrap().name, "Id");
    }

    #[test]
    fn test_custom_member_needs_handler() {
        let err = RegistryBuilder::new()
            .entity("User", |e| {
                e.member("id", ScalarKind::Int);
                e.member("tags", MemberType::custom("Vec<String>"));
            })
            .build()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert!(matches!(
            err,
            QuarryError::UnmappedMember { ref entity, ref member } if entity == "User" && member == "tags"
        ));
        assert!(err.to_string().contains("User.tags"));
    }

    #[test]
    fn test_custom_member_with_handler_or_ignored() {
        let registry = RegistryBuilder::new()
            .entity("User", |e| {
                e.member("id", ScalarKind::Int);
                e.member("tags", MemberType::custom("Vec<String>"))
                    .type_handler(FnTypeHandler::new(
                        ScalarKind::Text,
                        |v| Ok(v.clone()),
                        |v| Ok(v.clone()),
                    ));
                e.ignore("cache", MemberType::custom("Cache"));
            })
            .build()
            .unwrap();
        let user = registry.get_map("User").unwrap();
        assert_eq!(user.member("tags").unwrap().store_kind(), Some(ScalarKind::Text));
        assert!(!user.member("cache").unwrap().is_mapped());
        assert_eq!(
            user.member("tags")
                .unwrap()
                .type_handler
                .as_ref()
                .unwrap()
                .to_store(&Value::Int(1))
                .unwrap(),
            Value::Int(1)
        );
    }

    #[test]
    fn test_missing_foreign_key() {
        let err = RegistryBuilder::new()
            .entity("User", |e| {
                e.member("id", ScalarKind::Int);
                e.has_one("company", "Company");
            })
            .entity("Company", |e| {
                e.member("id", ScalarKind::Int);
            })
            .build()
            .unwrap_err();
        assert!(matches!(err, QuarryError::NavigationKey { ref member, .. } if member == "company"));
    }

    #[test]
    fn test_navigation_target_needs_single_key() {
        let err = RegistryBuilder::new()
            .entity("User", |e| {
                e.member("id", ScalarKind::Int);
                e.member("tag_id", ScalarKind::Int);
                e.has_one("tag", "Tag");
            })
            .entity("Tag", |e| {
                e.member("a", ScalarKind::Int);
                e.member("b", ScalarKind::Int);
                e.key(["a", "b"]);
            })
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("exactly one key"));
    }

    #[test]
    fn test_duplicate_entity_and_auto_increment() {
        let err = RegistryBuilder::new()
            .entity("User", |e| {
                e.member("id", ScalarKind::Int);
            })
            .entity("User", |e| {
                e.member("id", ScalarKind::Int);
            })
            .build()
            .unwrap_err();
        assert!(matches!(err, QuarryError::DuplicateEntity { .. }));

        let err = RegistryBuilder::new()
            .entity("User", |e| {
                e.member("id", ScalarKind::Int).auto_increment();
                e.member("seq", ScalarKind::Int).auto_increment();
            })
            .build()
            .unwrap_err();
        assert!(matches!(err, QuarryError::InvalidMapping { .. }));
    }

    #[test]
    fn test_projection_and_map_to() {
        let registry = RegistryBuilder::new()
            .entity("User", |e| {
                e.member("id", ScalarKind::Int);
                e.member("company_id", ScalarKind::Int);
                e.has_one("company", "Company").map_to("CompanyInfo");
            })
            .entity("Company", |e| {
                e.to_table("companies");
                e.member("id", ScalarKind::Int);
                e.member("title", ScalarKind::Text);
                e.member("revenue", ScalarKind::Decimal);
            })
            .projection("CompanyInfo", "Company", ["title"])
            .build()
            .unwrap();
        let info = registry.get_map("CompanyInfo").unwrap();
        assert_eq!(info.table(), "companies");
        assert_eq!(info.projection_of(), Some("Company"));
        assert_eq!(info.members().len(), 2);
        assert_eq!(info.single_key().unwrap().name, "id");

        let user = registry.get_map("User").unwrap();
        let nav = user.member("company").unwrap().navigation.as_ref().unwrap();
        assert_eq!(nav.exposed_entity(), "CompanyInfo");

        let err = RegistryBuilder::new()
            .entity("User", |e| {
                e.member("id", ScalarKind::Int);
                e.member("company_id", ScalarKind::Int);
                e.has_one("company", "Company").map_to("Nope");
            })
            .entity("Company", |e| {
                e.member("id", ScalarKind::Int);
            })
            .build()
            .unwrap_err();
        assert!(matches!(err, QuarryError::NavigationKey { .. }));
    }
}

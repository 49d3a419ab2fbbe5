//! Expression compiler.
//!
//! One [`QueryCompiler`] compiles every clause of one statement. Clauses
//! share the table set and parameter list, so tables must be registered
//! (FROM, declared joins, includes) before clauses that reference them
//! are compiled.

mod deferred;
mod predicate;
mod projection;
mod segment;
mod tables;
mod visitor;

pub use deferred::{CompareOp, DeferredStack, Frame, LogicalOp};
pub use projection::Projection;
pub use segment::{ColumnBinding, Segment};
pub use tables::{JoinKind, TableInfo, TableSet, TableSource, alias_for};

use compact_str::CompactString;
use quarry_types::NativeType;

use crate::dialect::DialectAdapter;
use crate::error::{QuarryError, Result};
use crate::expr::{Expr, Lambda};
use crate::mapping::{EntityMap, EntityRegistry, MemberMap};
use crate::param::ParamCollector;
use crate::sql::{Fragment, Rendered, render};
use crate::value::Value;

/// Clause being compiled, named in diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClauseKind {
    Select,
    Join,
    Include,
    Where,
    GroupBy,
    Having,
    OrderBy,
    Set,
}

impl ClauseKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Select => "select",
            Self::Join => "join",
            Self::Include => "include",
            Self::Where => "where",
            Self::GroupBy => "group by",
            Self::Having => "having",
            Self::OrderBy => "order by",
            Self::Set => "set",
        }
    }
}

#[derive(Debug, Clone)]
struct GroupKey<'a> {
    name: Option<CompactString>,
    segment: Segment<'a>,
}

pub struct QueryCompiler<'a> {
    registry: &'a EntityRegistry,
    adapter: &'a dyn DialectAdapter,
    tables: TableSet,
    params: ParamCollector,
    deferred: DeferredStack<'a>,
    /// Lambda parameter name to table index, innermost last.
    bindings: Vec<(CompactString, usize)>,
    /// FROM table followed by declared joins.
    explicit: Vec<usize>,
    /// Root table of the subquery being compiled.
    scope: Option<usize>,
    group_keys: Vec<GroupKey<'a>>,
}

impl<'a> QueryCompiler<'a> {
    pub fn new(registry: &'a EntityRegistry, adapter: &'a dyn DialectAdapter) -> Self {
        Self {
            registry,
            adapter,
            tables: TableSet::new(),
            params: ParamCollector::new(),
            deferred: DeferredStack::new(),
            bindings: Vec::new(),
            explicit: Vec::new(),
            scope: None,
            group_keys: Vec::new(),
        }
    }

    pub fn adapter(&self) -> &'a dyn DialectAdapter {
        self.adapter
    }

    pub fn registry(&self) -> &'a EntityRegistry {
        self.registry
    }

    pub fn tables(&self) -> &TableSet {
        &self.tables
    }

    pub fn params(&self) -> &ParamCollector {
        &self.params
    }

    /// Renders a statement built from this compiler's fragments.
    pub fn render(&self, statement: &Fragment) -> Result<Rendered> {
        render(statement, &self.tables.refs(), &self.params, self.adapter)
    }

    /// Map of the entity behind table `index`.
    pub fn map_of(&self, index: usize) -> Result<&'a EntityMap> {
        let table = self.tables.get(index)?;
        self.registry.get_map(&table.entity)
    }

    pub(crate) fn native_of(&self, member: &MemberMap) -> Option<NativeType> {
        member
            .native_type
            .or_else(|| member.store_kind().map(|kind| self.adapter.native_type_for(kind)))
    }

    pub fn add_from(&mut self, entity: &str) -> Result<usize> {
        let map = self.registry.get_map(entity)?;
        let index = self
            .tables
            .add(map.name(), map.table(), TableSource::From, None);
        self.explicit.push(index);
        Ok(index)
    }

    /// Registers a declared join. Without `on`, the condition is inferred
    /// from a navigation between the new entity and an earlier table.
    pub fn add_join(&mut self, kind: JoinKind, entity: &str, on: Option<&'a Lambda>) -> Result<usize> {
        let map = self.registry.get_map(entity)?;
        let index = self
            .tables
            .add(map.name(), map.table(), TableSource::Join(kind), None);
        self.explicit.push(index);

        let condition = match on {
            Some(lambda) => {
                let tables = self.explicit.clone();
                self.clause(ClauseKind::Join, lambda, &tables, |c, body| c.predicate(body))?
            }
            None => self.infer_join(index, map)?,
        };
        self.tables.set_on(index, condition)?;
        Ok(index)
    }

    fn infer_join(&self, index: usize, map: &'a EntityMap) -> Result<Fragment> {
        for &earlier in &self.explicit {
            if earlier == index {
                continue;
            }
            let earlier_map = self.map_of(earlier)?;
            let forward = earlier_map
                .navigations()
                .filter_map(|m| m.navigation.as_ref())
                .find(|nav| nav.target == map.name());
            if let Some(nav) = forward {
                return Ok(equals(
                    Fragment::column(earlier, nav.owner_column.clone()),
                    Fragment::column(index, nav.target_column.clone()),
                ));
            }
            let backward = map
                .navigations()
                .filter_map(|m| m.navigation.as_ref())
                .find(|nav| nav.target == earlier_map.name());
            if let Some(nav) = backward {
                return Ok(equals(
                    Fragment::column(index, nav.owner_column.clone()),
                    Fragment::column(earlier, nav.target_column.clone()),
                ));
            }
        }
        Err(QuarryError::InvalidMapping {
            entity: map.name().into(),
            reason: "no navigation links it to an earlier table; give the join an explicit condition"
                .into(),
        })
    }

    /// Implicit `LEFT JOIN` for a to-one navigation, registered once per
    /// `(parent, member)`.
    pub fn add_navigation(&mut self, parent: usize, member: &str) -> Result<usize> {
        if let Some(index) = self.tables.find_navigation(parent, member) {
            return Ok(index);
        }
        let owner = self.map_of(parent)?;
        let nav = navigation_of(owner, member)?;
        let target = self.registry.get_map(&nav.target)?;
        let index = self.tables.add(
            target.name(),
            target.table(),
            TableSource::Navigation {
                parent,
                member: member.into(),
            },
            self.scope,
        );
        self.tables.set_on(
            index,
            equals(
                Fragment::column(parent, nav.owner_column.clone()),
                Fragment::column(index, nav.target_column.clone()),
            ),
        )?;
        Ok(index)
    }

    /// `LEFT JOIN` materializing an included navigation, with an optional
    /// filter ANDed into its condition.
    pub fn add_include(&mut self, parent: usize, member: &str, filter: Option<&'a Lambda>) -> Result<usize> {
        let owner = self.map_of(parent)?;
        let nav = navigation_of(owner, member)?;
        let target = self.registry.get_map(&nav.target)?;
        let index = self.tables.add(
            target.name(),
            target.table(),
            TableSource::Include {
                parent,
                member: member.into(),
            },
            None,
        );
        let mut on = equals(
            Fragment::column(parent, nav.owner_column.clone()),
            Fragment::column(index, nav.target_column.clone()),
        );
        if let Some(lambda) = filter {
            let filter = self.clause(ClauseKind::Include, lambda, &[index], |c, body| {
                c.scoped_predicate(LogicalOp::And, body)
            })?;
            on = on.push_str(" AND ").append(filter);
        }
        self.tables.set_on(index, on)?;
        Ok(index)
    }

    fn bind(&mut self, lambda: &Lambda, tables: &[usize]) -> Result<usize> {
        if let Some(unbound) = lambda.params.get(tables.len()) {
            return Err(QuarryError::UnboundParameter {
                name: unbound.clone(),
            });
        }
        for (name, &table) in lambda.params.iter().zip(tables) {
            self.bindings.push((name.clone(), table));
        }
        Ok(lambda.params.len())
    }

    fn unbind(&mut self, count: usize) {
        let keep = self.bindings.len().saturating_sub(count);
        self.bindings.truncate(keep);
    }

    /// Compiles one clause body with the lambda bound to `tables`, then
    /// checks the deferred stack was drained.
    fn clause<T, F>(&mut self, kind: ClauseKind, lambda: &'a Lambda, tables: &[usize], f: F) -> Result<T>
    where
        F: FnOnce(&mut Self, &'a Expr) -> Result<T>,
    {
        let bound = self.bind(lambda, tables)?;
        let result = f(self, &lambda.body);
        self.unbind(bound);
        match result {
            Ok(value) => {
                self.deferred.finish(kind.as_str())?;
                Ok(value)
            }
            Err(err) => {
                self.deferred.clear();
                Err(err)
            }
        }
    }

    /// Table bound to a lambda parameter. With nothing bound, a statement
    /// over a single table resolves every root to it.
    fn root_table(&self, name: &str) -> Result<usize> {
        if let Some((_, table)) = self.bindings.iter().rev().find(|(n, _)| n == name) {
            return Ok(*table);
        }
        match self.explicit.as_slice() {
            [only] if self.bindings.is_empty() => Ok(*only),
            _ => Err(QuarryError::UnboundParameter { name: name.into() }),
        }
    }

    /// Value compilation of a clause body, e.g. a scalar select.
    pub fn compile(&mut self, kind: ClauseKind, lambda: &'a Lambda) -> Result<Segment<'a>> {
        let tables = self.explicit.clone();
        self.clause(kind, lambda, &tables, |c, body| c.visit(body))
    }

    /// Predicate compilation of a clause body.
    pub fn compile_predicate(&mut self, kind: ClauseKind, lambda: &'a Lambda) -> Result<Fragment> {
        let tables = self.explicit.clone();
        self.clause(kind, lambda, &tables, |c, body| c.predicate(body))
    }

    /// ANDs several predicates; each is parenthesized when it is an OR.
    pub fn compile_predicates(&mut self, kind: ClauseKind, lambdas: &'a [Lambda]) -> Result<Option<Fragment>> {
        match lambdas {
            [] => Ok(None),
            [only] => self.compile_predicate(kind, only).map(Some),
            many => {
                let tables = self.explicit.clone();
                let mut parts = Vec::with_capacity(many.len());
                for lambda in many {
                    parts.push(self.clause(kind, lambda, &tables, |c, body| {
                        c.scoped_predicate(LogicalOp::And, body)
                    })?);
                }
                Ok(Some(Fragment::join(parts, LogicalOp::And.keyword())))
            }
        }
    }

    /// `expr` or `expr DESC`.
    pub fn compile_order_by(&mut self, lambda: &'a Lambda, descending: bool) -> Result<Fragment> {
        let segment = self.compile(ClauseKind::OrderBy, lambda)?;
        let sql = self.operand(&segment)?;
        Ok(if descending { sql.push_str(" DESC") } else { sql })
    }

    /// Grouping keys: a member access, or an object of member accesses.
    pub fn compile_group_by(&mut self, lambda: &'a Lambda) -> Result<Vec<Fragment>> {
        let tables = self.explicit.clone();
        let keys = self.clause(ClauseKind::GroupBy, lambda, &tables, |c, body| match body {
            Expr::Member { .. } => Ok(vec![GroupKey {
                name: None,
                segment: c.group_member(body)?,
            }]),
            Expr::New { members, .. } => members
                .iter()
                .map(|(name, expr)| {
                    Ok(GroupKey {
                        name: Some(name.clone()),
                        segment: c.group_member(expr)?,
                    })
                })
                .collect(),
            other => Err(QuarryError::unsupported(
                other,
                "grouping key must be a member access or an object of member accesses",
            )),
        })?;
        let mut fragments = Vec::with_capacity(keys.len());
        for key in &keys {
            fragments.push(self.operand(&key.segment)?);
        }
        self.group_keys = keys;
        Ok(fragments)
    }

    fn group_member(&mut self, expr: &'a Expr) -> Result<Segment<'a>> {
        if !matches!(expr, Expr::Member { .. }) {
            return Err(QuarryError::unsupported(
                expr,
                "grouping key members must be member accesses",
            ));
        }
        let segment = self.visit(expr)?;
        if segment.entity_table.is_some() {
            return Err(QuarryError::unsupported(
                expr,
                "cannot group by an entity; group by its columns",
            ));
        }
        Ok(segment)
    }

    fn group_key(&self, expr: &'a Expr, name: Option<&str>) -> Result<Segment<'a>> {
        let found = match name {
            None => match self.group_keys.as_slice() {
                [only] => Some(only),
                [] => None,
                _ => {
                    return Err(QuarryError::unsupported(
                        expr,
                        "the grouping key is composite; use key_member",
                    ));
                }
            },
            Some(name) => self
                .group_keys
                .iter()
                .find(|k| k.name.as_deref() == Some(name)),
        };
        found
            .map(|key| Segment {
                expr: Some(expr),
                ..key.segment.clone()
            })
            .ok_or_else(|| QuarryError::unsupported(expr, "no grouping key is in scope"))
    }

    /// Right-hand side of `SET column = expr` for `member` of `table`.
    pub fn compile_assignment(&mut self, table: usize, member: &str, expr: &'a Expr) -> Result<Fragment> {
        let member = self.map_of(table)?.require_member(member)?;
        let column = member.column_name().ok_or_else(|| {
            QuarryError::unsupported(expr, format!("member `{}` is not stored in a column", member.name))
        })?;
        let target = Segment {
            sql: Fragment::column(table, column),
            has_field: true,
            kind: member.store_kind(),
            native: self.native_of(member),
            column: Some(ColumnBinding {
                table,
                member: member.name.clone(),
                handler: member.type_handler.clone(),
            }),
            ..Segment::default()
        };
        let result = self.visit(expr).and_then(|mut value| {
            self.store_counterpart(&target, &mut value)?;
            self.operand(&value)
        });
        match result {
            Ok(sql) => {
                self.deferred.finish(ClauseKind::Set.as_str())?;
                Ok(sql)
            }
            Err(err) => {
                self.deferred.clear();
                Err(err)
            }
        }
    }

    /// Binds a value for `member`, converted by its type handler.
    pub fn bind_member(&mut self, member: &MemberMap, value: Value) -> Result<Fragment> {
        let value = match &member.type_handler {
            Some(handler) if !value.is_null() => {
                handler
                    .to_store(&value)
                    .map_err(|reason| QuarryError::TypeHandler {
                        member: member.name.clone(),
                        reason,
                    })?
            }
            _ => value,
        };
        Ok(self.params.push(value, self.native_of(member)))
    }

    /// Value SQL for a segment: inlined literal, parameter or expression.
    pub(crate) fn operand(&mut self, segment: &Segment<'a>) -> Result<Fragment> {
        segment.to_operand(&mut self.params, self.adapter)
    }
}

fn navigation_of<'m>(owner: &'m EntityMap, member: &str) -> Result<&'m crate::mapping::Navigation> {
    let map = owner.require_member(member)?;
    map.navigation.as_ref().ok_or_else(|| {
        QuarryError::unsupported(
            format_args!("{}.{}", owner.name(), member),
            "member is not a navigation",
        )
    })
}

pub(crate) fn equals(left: Fragment, right: Fragment) -> Fragment {
    left.push_str(" = ").append(right)
}

#[cfg(test)]
mod tests {
    use quarry_types::ScalarKind;

    use super::*;
    use crate::dialect::AnsiDialect;
    use crate::expr::root;
    use crate::mapping::RegistryBuilder;

    fn registry() -> EntityRegistry {
        RegistryBuilder::new()
            .entity("Author", |e| {
                e.to_table("authors");
                e.member("id", ScalarKind::Int).key();
                e.member("name", ScalarKind::Text);
                e.has_many("books", "Book");
            })
            .entity("Book", |e| {
                e.to_table("books");
                e.member("id", ScalarKind::Int).key();
                e.member("author_id", ScalarKind::Int);
                e.member("pages", ScalarKind::Int);
                e.has_one("author", "Author");
            })
            .entity("Tag", |e| {
                e.to_table("tags");
                e.member("id", ScalarKind::Int).key();
            })
            .build()
            .unwrap()
    }

    #[test]
    fn test_navigation_joins_are_shared() {
        let registry = registry();
        let mut compiler = QueryCompiler::new(&registry, &AnsiDialect);
        let book = compiler.add_from("Book").unwrap();
        let first = compiler.add_navigation(book, "author").unwrap();
        let second = compiler.add_navigation(book, "author").unwrap();
        assert_eq!(first, second);
        assert_eq!(compiler.tables().len(), 2);
        assert!(compiler.add_navigation(book, "pages").is_err());
    }

    #[test]
    fn test_join_without_link_fails() {
        let registry = registry();
        let mut compiler = QueryCompiler::new(&registry, &AnsiDialect);
        compiler.add_from("Book").unwrap();
        assert!(compiler.add_join(JoinKind::Inner, "Author", None).is_ok());
        let err = compiler.add_join(JoinKind::Inner, "Tag", None).unwrap_err();
        assert!(matches!(err, QuarryError::InvalidMapping { .. }));
    }

    #[test]
    fn test_single_table_resolves_any_root() {
        let registry = registry();
        let expr = root("anything").get("pages") + 1;
        let mut compiler = QueryCompiler::new(&registry, &AnsiDialect);
        let book = compiler.add_from("Book").unwrap();
        let sql = compiler.compile_assignment(book, "pages", &expr).unwrap();
        assert_eq!(compiler.render(&sql).unwrap().sql, r#""pages" + 1"#);
    }

    #[test]
    fn test_roots_must_be_bound_with_several_tables() {
        let registry = registry();
        let expr = root("b").get("pages");
        let mut compiler = QueryCompiler::new(&registry, &AnsiDialect);
        let book = compiler.add_from("Book").unwrap();
        compiler.add_join(JoinKind::Left, "Author", None).unwrap();
        let err = compiler.compile_assignment(book, "pages", &expr).unwrap_err();
        assert!(matches!(err, QuarryError::UnboundParameter { ref name } if name == "b"));
    }
}

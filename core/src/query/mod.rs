//! Query descriptors and their compilation.
//!
//! A [`Query`] is plain data: the root entity, declared joins, clause
//! lambdas and paging. [`Query::compile`] turns it into SQL text, bound
//! parameters and the projected fields the materializer needs.
//!
//! ```ignore
//! let compiled = Query::from("User")
//!     .r#where(Lambda::new(["u"], root("u").get("age").ge(18)))
//!     .include("orders")
//!     .order_by(Lambda::new(["u"], root("u").get("name")))
//!     .compile(&registry, &SQLiteDialect::new())?;
//! ```

mod include;
mod sql;

pub use include::Include;

use compact_str::CompactString;

use crate::compiler::{ClauseKind, JoinKind, Projection, QueryCompiler};
use crate::dialect::DialectAdapter;
use crate::error::{QuarryError, Result};
use crate::expr::{Expr, Lambda};
use crate::mapping::{Cardinality, EntityRegistry};
use crate::materialize::{FieldOrigin, MaterializationPlan, ProjectedField};
use crate::param::BoundParam;
use crate::sql::Fragment;

use sql::SelectParts;

#[derive(Debug, Clone, PartialEq)]
struct JoinClause {
    kind: JoinKind,
    entity: CompactString,
    on: Option<Lambda>,
}

/// A SELECT over one root entity.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    from: CompactString,
    joins: Vec<JoinClause>,
    filters: Vec<Lambda>,
    group_by: Option<Lambda>,
    having: Vec<Lambda>,
    order_by: Vec<(Lambda, bool)>,
    select: Option<Lambda>,
    includes: Vec<Include>,
    distinct: bool,
    skip: Option<u64>,
    take: Option<u64>,
}

impl Query {
    pub fn from(entity: impl Into<CompactString>) -> Self {
        Self {
            from: entity.into(),
            joins: Vec::new(),
            filters: Vec::new(),
            group_by: None,
            having: Vec::new(),
            order_by: Vec::new(),
            select: None,
            includes: Vec::new(),
            distinct: false,
            skip: None,
            take: None,
        }
    }

    fn join_with(mut self, kind: JoinKind, entity: impl Into<CompactString>, on: Option<Lambda>) -> Self {
        self.joins.push(JoinClause {
            kind,
            entity: entity.into(),
            on,
        });
        self
    }

    /// Inner join; `on` binds one parameter per table joined so far.
    pub fn inner_join(self, entity: impl Into<CompactString>, on: Lambda) -> Self {
        self.join_with(JoinKind::Inner, entity, Some(on))
    }

    pub fn left_join(self, entity: impl Into<CompactString>, on: Lambda) -> Self {
        self.join_with(JoinKind::Left, entity, Some(on))
    }

    pub fn right_join(self, entity: impl Into<CompactString>, on: Lambda) -> Self {
        self.join_with(JoinKind::Right, entity, Some(on))
    }

    /// Inner join whose condition comes from a navigation linking the
    /// entity to an earlier table.
    pub fn join(self, entity: impl Into<CompactString>) -> Self {
        self.join_with(JoinKind::Inner, entity, None)
    }

    /// Adds a filter; several filters are ANDed.
    pub fn r#where(mut self, predicate: Lambda) -> Self {
        self.filters.push(predicate);
        self
    }

    pub fn group_by(mut self, key: Lambda) -> Self {
        self.group_by = Some(key);
        self
    }

    pub fn having(mut self, predicate: Lambda) -> Self {
        self.having.push(predicate);
        self
    }

    pub fn order_by(mut self, key: Lambda) -> Self {
        self.order_by.push((key, false));
        self
    }

    pub fn order_by_desc(mut self, key: Lambda) -> Self {
        self.order_by.push((key, true));
        self
    }

    pub fn select(mut self, projection: Lambda) -> Self {
        self.select = Some(projection);
        self
    }

    pub fn include(mut self, include: impl Into<Include>) -> Self {
        self.includes.push(include.into());
        self
    }

    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    pub fn skip(mut self, rows: u64) -> Self {
        self.skip = Some(rows);
        self
    }

    pub fn take(mut self, rows: u64) -> Self {
        self.take = Some(rows);
        self
    }

    /// The projection is the FROM entity itself.
    fn selects_root(&self) -> bool {
        match &self.select {
            None => true,
            Some(lambda) => matches!(
                (&lambda.body, lambda.params.first()),
                (Expr::Root(name), Some(first)) if name == first
            ),
        }
    }

    pub fn compile(&self, registry: &EntityRegistry, adapter: &dyn DialectAdapter) -> Result<CompiledQuery> {
        let mut compiler = QueryCompiler::new(registry, adapter);
        let root = compiler.add_from(&self.from)?;
        for join in &self.joins {
            compiler.add_join(join.kind, &join.entity, join.on.as_ref())?;
        }

        if !self.includes.is_empty() && !self.selects_root() {
            return Err(QuarryError::unsupported(
                format_args!("include({})", self.includes[0].member),
                "includes require the query to project its root entity",
            ));
        }
        let mut included = Vec::new();
        for include in &self.includes {
            register_include(&mut compiler, root, include, &[], &mut included)?;
        }
        // LIMIT counts joined rows, not root objects
        if (self.take.is_some() || self.skip.is_some())
            && let Some(table) = included.iter().find(|t| t.cardinality == Cardinality::ToMany)
        {
            return Err(QuarryError::unsupported(
                format_args!("include({})", table.path.join(".")),
                "take/skip cannot page a query that includes a collection",
            ));
        }

        let filter = compiler.compile_predicates(ClauseKind::Where, &self.filters)?;
        let group_by = match &self.group_by {
            Some(key) => compiler.compile_group_by(key)?,
            None => Vec::new(),
        };
        let having = compiler.compile_predicates(ClauseKind::Having, &self.having)?;

        let mut projection: Projection = match &self.select {
            Some(lambda) => compiler.compile_select(lambda)?,
            None => compiler.project_root(root)?,
        };
        for table in &included {
            compiler.project_entity(
                &mut projection,
                table.index,
                Some(table.exposed.as_str()),
                &table.path,
                FieldOrigin::Navigation(table.cardinality),
            )?;
        }

        let mut order_by = Vec::with_capacity(self.order_by.len());
        for (key, descending) in &self.order_by {
            order_by.push(compiler.compile_order_by(key, *descending)?);
        }
        // rows of one root must be adjacent for collection grouping
        if included.iter().any(|t| t.cardinality == Cardinality::ToMany) {
            let map = compiler.map_of(root)?;
            for key in map.key_members() {
                if let Some(column) = key.column_name() {
                    let key_sql = Fragment::column(root, column);
                    if !order_by.contains(&key_sql) {
                        order_by.push(key_sql);
                    }
                }
            }
        }

        let statement = SelectParts {
            distinct: self.distinct,
            columns: projection.columns,
            root,
            filter,
            group_by,
            having,
            order_by,
            limit: adapter.limit_offset(self.take, self.skip),
        }
        .assemble(compiler.tables());

        let rendered = compiler.render(&statement)?;
        crate::quarry_trace_compile!("select", rendered.sql, rendered.parameters.len());
        Ok(CompiledQuery {
            sql: rendered.sql,
            parameters: rendered.parameters,
            fields: projection.fields,
        })
    }
}

struct IncludedTable {
    index: usize,
    exposed: CompactString,
    path: Vec<CompactString>,
    cardinality: Cardinality,
}

fn register_include<'a>(
    compiler: &mut QueryCompiler<'a>,
    parent: usize,
    include: &'a Include,
    path: &[CompactString],
    out: &mut Vec<IncludedTable>,
) -> Result<()> {
    let owner = compiler.map_of(parent)?;
    let member = owner.require_member(&include.member)?;
    let nav = member.navigation.as_ref().ok_or_else(|| {
        QuarryError::unsupported(
            format_args!("include({})", include.member),
            "member is not a navigation",
        )
    })?;

    let index = compiler.add_include(parent, &include.member, include.filter.as_ref())?;
    let mut own_path = path.to_vec();
    own_path.push(include.member.clone());
    out.push(IncludedTable {
        index,
        exposed: nav.exposed_entity().into(),
        path: own_path.clone(),
        cardinality: nav.cardinality,
    });
    for nested in &include.nested {
        register_include(compiler, index, nested, &own_path, out)?;
    }
    Ok(())
}

/// SQL text, bound parameters and field descriptors of one query.
#[derive(Debug, Clone)]
pub struct CompiledQuery {
    pub sql: String,
    pub parameters: Vec<BoundParam>,
    pub fields: Vec<ProjectedField>,
}

impl CompiledQuery {
    /// Plan for turning this query's rows into objects.
    pub fn plan(&self, registry: &EntityRegistry) -> Result<MaterializationPlan> {
        MaterializationPlan::build(registry, &self.fields)
    }
}

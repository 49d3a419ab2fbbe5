//! Select-list construction.

use compact_str::CompactString;
use smallvec::SmallVec;

use super::{ClauseKind, QueryCompiler};
use crate::error::Result;
use crate::expr::{Expr, Lambda};
use crate::mapping::Cardinality;
use crate::materialize::{FieldOrigin, ProjectedField};
use crate::sql::Fragment;

/// Select-list columns and the field descriptor of each.
#[derive(Debug, Clone, Default)]
pub struct Projection {
    pub columns: Vec<Fragment>,
    pub fields: Vec<ProjectedField>,
}

impl Projection {
    fn push(&mut self, sql: Fragment, mut field: ProjectedField) {
        field.ordinal = self.columns.len();
        self.columns.push(sql);
        self.fields.push(field);
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl<'a> QueryCompiler<'a> {
    pub fn compile_select(&mut self, lambda: &'a Lambda) -> Result<Projection> {
        let tables = self.explicit.clone();
        self.clause(ClauseKind::Select, lambda, &tables, |c, body| c.project(body))
    }

    /// Every mapped column of the entity at `table`.
    pub fn project_root(&mut self, table: usize) -> Result<Projection> {
        let mut projection = Projection::default();
        self.project_entity(&mut projection, table, None, &[], FieldOrigin::Target)?;
        Ok(projection)
    }

    fn project(&mut self, body: &'a Expr) -> Result<Projection> {
        let mut projection = Projection::default();
        if let Expr::New { members, .. } = body {
            for (name, expr) in members {
                let segment = self.visit(expr)?;
                if let Some(table) = segment.entity_table {
                    self.project_entity(
                        &mut projection,
                        table,
                        None,
                        core::slice::from_ref(name),
                        FieldOrigin::Navigation(Cardinality::ToOne),
                    )?;
                    continue;
                }
                let sql = self.operand(&segment)?;
                let sql = self.aliased(sql, name);
                let binding = segment.column.as_ref();
                projection.push(
                    sql,
                    ProjectedField {
                        ordinal: 0,
                        name: name.clone(),
                        path: SmallVec::from_iter([name.clone()]),
                        owner: None,
                        table: binding.map(|b| b.table),
                        origin: FieldOrigin::Target,
                        is_key: false,
                        handler: binding.and_then(|b| b.handler.clone()),
                    },
                );
            }
            return Ok(projection);
        }

        let segment = self.visit(body)?;
        if let Some(table) = segment.entity_table {
            self.project_entity(&mut projection, table, None, &[], FieldOrigin::Target)?;
            return Ok(projection);
        }
        let sql = self.operand(&segment)?;
        let binding = segment.column.as_ref();
        projection.push(
            sql,
            ProjectedField {
                ordinal: 0,
                name: binding.map_or_else(|| "value".into(), |b| b.member.clone()),
                path: SmallVec::new(),
                owner: None,
                table: binding.map(|b| b.table),
                origin: FieldOrigin::Target,
                is_key: false,
                handler: binding.and_then(|b| b.handler.clone()),
            },
        );
        Ok(projection)
    }

    /// Appends the columns of the entity at `table`, read through the
    /// `exposed` map when given. Nested columns are aliased by their
    /// member path joined with `_`.
    pub fn project_entity(
        &mut self,
        projection: &mut Projection,
        table: usize,
        exposed: Option<&str>,
        path: &[CompactString],
        origin: FieldOrigin,
    ) -> Result<()> {
        let map = match exposed {
            Some(entity) => self.registry.get_map(entity)?,
            None => self.map_of(table)?,
        };
        for member in map.columns() {
            let Some(column) = member.column_name() else {
                continue;
            };
            let mut field_path: SmallVec<[CompactString; 4]> = path.iter().cloned().collect();
            field_path.push(member.name.clone());
            let name = if path.is_empty() {
                member.name.clone()
            } else {
                CompactString::from(field_path.join("_"))
            };
            let sql = self.aliased(Fragment::column(table, column), &name);
            projection.push(
                sql,
                ProjectedField {
                    ordinal: 0,
                    name,
                    path: field_path,
                    owner: Some(map.name().into()),
                    table: Some(table),
                    origin,
                    is_key: member.is_key,
                    handler: member.type_handler.clone(),
                },
            );
        }
        Ok(())
    }

    /// `sql AS "name"`, unless `sql` is a column already called `name`.
    fn aliased(&self, sql: Fragment, name: &str) -> Fragment {
        if sql.as_column().is_some_and(|(_, column)| column == name) {
            return sql;
        }
        let alias = self.adapter.quote_identifier(name);
        sql.push_str(" AS ").push_str(&alias)
    }
}

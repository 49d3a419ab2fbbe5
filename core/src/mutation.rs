//! INSERT, UPDATE and DELETE.
//!
//! Mutations touch exactly one table and are rendered without aliases.

use compact_str::CompactString;

use crate::compiler::{ClauseKind, QueryCompiler};
use crate::dialect::DialectAdapter;
use crate::error::{QuarryError, Result};
use crate::expr::{Expr, IntoExpr, Lambda};
use crate::mapping::EntityRegistry;
use crate::param::BoundParam;
use crate::sql::Fragment;
use crate::value::{Record, Value};

/// SQL text and bound parameters of one statement.
#[derive(Debug, Clone)]
pub struct CompiledStatement {
    pub sql: String,
    pub parameters: Vec<BoundParam>,
}

fn single_table(compiler: &QueryCompiler<'_>, statement: &str) -> Result<()> {
    if compiler.tables().len() > 1 {
        return Err(QuarryError::unsupported(
            statement,
            "navigations and subqueries are not supported in this statement",
        ));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq)]
pub struct Insert {
    entity: CompactString,
    values: Vec<(CompactString, Value)>,
}

impl Insert {
    pub fn into(entity: impl Into<CompactString>) -> Self {
        Self {
            entity: entity.into(),
            values: Vec::new(),
        }
    }

    pub fn value(mut self, member: impl Into<CompactString>, value: impl Into<Value>) -> Self {
        self.values.push((member.into(), value.into()));
        self
    }

    /// Every field of `record`; members without a column of their own are
    /// skipped at compile time.
    pub fn record(mut self, record: &Record) -> Self {
        self.values.extend(record.fields.iter().cloned());
        self
    }

    pub fn compile(&self, registry: &EntityRegistry, adapter: &dyn DialectAdapter) -> Result<CompiledStatement> {
        let map = registry.get_map(&self.entity)?;
        let mut compiler = QueryCompiler::new(registry, adapter);
        let table = compiler.add_from(&self.entity)?;

        let mut columns = Vec::with_capacity(self.values.len());
        let mut values = Vec::with_capacity(self.values.len());
        for (name, value) in &self.values {
            let member = map.require_member(name)?;
            if member.is_auto_increment || !member.is_mapped() {
                continue;
            }
            let Some(column) = member.column_name() else {
                continue;
            };
            columns.push(Fragment::raw(adapter.quote_identifier(column)));
            values.push(compiler.bind_member(member, value.clone())?);
        }

        let mut sql = Fragment::raw("INSERT INTO ").append(Fragment::table(table));
        if columns.is_empty() {
            sql = sql.push_str(" DEFAULT VALUES");
        } else {
            sql = sql
                .push_str(" (")
                .append(Fragment::join(columns, ", "))
                .push_str(") VALUES (")
                .append(Fragment::join(values, ", "))
                .push_str(")");
        }
        if let Some(identity) = map.auto_increment().and_then(|m| m.column_name())
            && let Some(returning) = adapter.returning(identity)
        {
            sql = sql.push_str(" ").push_str(&returning);
        }

        let rendered = compiler.render(&sql)?;
        crate::quarry_trace_compile!("insert", rendered.sql, rendered.parameters.len());
        Ok(CompiledStatement {
            sql: rendered.sql,
            parameters: rendered.parameters,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Update {
    entity: CompactString,
    assignments: Vec<(CompactString, Expr)>,
    filters: Vec<Lambda>,
}

impl Update {
    pub fn table(entity: impl Into<CompactString>) -> Self {
        Self {
            entity: entity.into(),
            assignments: Vec::new(),
            filters: Vec::new(),
        }
    }

    /// `member = value`; the value may reference the row's own columns
    /// through any root name.
    pub fn set(mut self, member: impl Into<CompactString>, value: impl IntoExpr) -> Self {
        self.assignments.push((member.into(), value.into_expr()));
        self
    }

    pub fn r#where(mut self, predicate: Lambda) -> Self {
        self.filters.push(predicate);
        self
    }

    pub fn compile(&self, registry: &EntityRegistry, adapter: &dyn DialectAdapter) -> Result<CompiledStatement> {
        if self.assignments.is_empty() {
            return Err(QuarryError::unsupported(
                format_args!("update {}", self.entity),
                "an update needs at least one assignment",
            ));
        }
        let map = registry.get_map(&self.entity)?;
        let mut compiler = QueryCompiler::new(registry, adapter);
        let table = compiler.add_from(&self.entity)?;

        let mut assignments = Vec::with_capacity(self.assignments.len());
        for (name, expr) in &self.assignments {
            let member = map.require_member(name)?;
            let column = member.column_name().filter(|_| member.is_mapped()).ok_or_else(|| {
                QuarryError::unsupported(expr, format!("member `{name}` is not stored in a column"))
            })?;
            let value = compiler.compile_assignment(table, name, expr)?;
            assignments.push(
                Fragment::raw(adapter.quote_identifier(column))
                    .push_str(" = ")
                    .append(value),
            );
        }
        let filter = compiler.compile_predicates(ClauseKind::Where, &self.filters)?;
        single_table(&compiler, "update")?;

        let mut sql = Fragment::raw("UPDATE ")
            .append(Fragment::table(table))
            .push_str(" SET ")
            .append(Fragment::join(assignments, ", "));
        if let Some(filter) = filter {
            sql = sql.push_str(" WHERE ").append(filter);
        }

        let rendered = compiler.render(&sql)?;
        crate::quarry_trace_compile!("update", rendered.sql, rendered.parameters.len());
        Ok(CompiledStatement {
            sql: rendered.sql,
            parameters: rendered.parameters,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Delete {
    entity: CompactString,
    filters: Vec<Lambda>,
}

impl Delete {
    pub fn from(entity: impl Into<CompactString>) -> Self {
        Self {
            entity: entity.into(),
            filters: Vec::new(),
        }
    }

    pub fn r#where(mut self, predicate: Lambda) -> Self {
        self.filters.push(predicate);
        self
    }

    pub fn compile(&self, registry: &EntityRegistry, adapter: &dyn DialectAdapter) -> Result<CompiledStatement> {
        let mut compiler = QueryCompiler::new(registry, adapter);
        let table = compiler.add_from(&self.entity)?;
        let filter = compiler.compile_predicates(ClauseKind::Where, &self.filters)?;
        single_table(&compiler, "delete")?;

        let mut sql = Fragment::raw("DELETE FROM ").append(Fragment::table(table));
        if let Some(filter) = filter {
            sql = sql.push_str(" WHERE ").append(filter);
        }

        let rendered = compiler.render(&sql)?;
        crate::quarry_trace_compile!("delete", rendered.sql, rendered.parameters.len());
        Ok(CompiledStatement {
            sql: rendered.sql,
            parameters: rendered.parameters,
        })
    }
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
            .entity("User", |e| {
                e.to_table("users");
                e.member("id", ScalarKind::Int).key().auto_increment();
                e.member("name", ScalarKind::Text).field("user_name");
                e.member("age", ScalarKind::Int);
            })
            .build()
            .unwrap()
    }

    #[test]
    fn test_insert_skips_identity() {
        let registry = registry();
        let stmt = Insert::into("User")
            .value("id", 9)
            .value("name", "ann")
            .value("age", 30)
            .compile(&registry, &AnsiDialect)
            .unwrap();
        assert_eq!(
            stmt.sql,
            r#"INSERT INTO "users" ("user_name", "age") VALUES (?, ?) RETURNING "id""#
        );
        assert_eq!(stmt.parameters.len(), 2);
        assert_eq!(stmt.parameters[1].value, Value::Int(30));
    }

    #[test]
    fn test_update_reads_own_columns() {
        let registry = registry();
        let stmt = Update::table("User")
            .set("age", root("u").get("age") + 1)
            .r#where(Lambda::new(["u"], root("u").get("id").eq(3)))
            .compile(&registry, &AnsiDialect)
            .unwrap();
        assert_eq!(stmt.sql, r#"UPDATE "users" SET "age" = "age" + 1 WHERE "id" = 3"#);
    }

    #[test]
    fn test_delete_without_filter() {
        let registry = registry();
        let stmt = Delete::from("User").compile(&registry, &AnsiDialect).unwrap();
        assert_eq!(stmt.sql, r#"DELETE FROM "users""#);
        assert!(stmt.parameters.is_empty());
    }
}

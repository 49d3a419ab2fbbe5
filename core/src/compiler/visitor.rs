//! Value-position compilation.

use quarry_types::ScalarKind;

use super::{ColumnBinding, Frame, LogicalOp, QueryCompiler, Segment, TableSource, equals};
use crate::dialect::FunctionContext;
use crate::error::{QuarryError, Result};
use crate::expr::{BinaryOp, Expr, Lambda, Method, UnaryOp};
use crate::mapping::Cardinality;
use crate::sql::Fragment;
use crate::value::Value;

impl<'a> QueryCompiler<'a> {
    /// Compiles `expr` as a value.
    pub(crate) fn visit(&mut self, expr: &'a Expr) -> Result<Segment<'a>> {
        match expr {
            Expr::Constant(value) => Ok(Segment::literal(value.clone(), Some(expr))),
            Expr::Variable { value, .. } => Ok(Segment::variable(value.clone(), Some(expr))),
            Expr::Root(name) => Ok(Segment::entity(self.root_table(name)?, Some(expr))),
            Expr::Member { parent, name } => self.visit_member(expr, parent, name),
            Expr::Unary { op, operand } => self.visit_unary(expr, *op, operand),
            Expr::Binary { op, left, right } => match op {
                op if op.is_comparison() || op.is_logical() => self.predicate_value(expr),
                BinaryOp::Coalesce => {
                    let l = self.visit(left)?;
                    let mut r = self.visit(right)?;
                    hint(&l, &mut r);
                    let sql = Fragment::func("COALESCE", [self.operand(&l)?, self.operand(&r)?]);
                    Ok(Segment::sql(sql, l.kind.or(r.kind), Some(expr)).merged(&[&l, &r]))
                }
                BinaryOp::Add => self.visit_add(expr),
                _ => self.visit_arithmetic(expr, *op, left, right),
            },
            Expr::Call {
                method,
                target,
                args,
            } => {
                if method.is_predicate() {
                    self.predicate_value(expr)
                } else {
                    self.call(expr, method, target.as_deref(), args, false)
                }
            }
            Expr::Conditional {
                test,
                if_true,
                if_false,
            } => {
                let test = self.barrier_predicate(test)?;
                let a = self.visit(if_true)?;
                let b = self.visit(if_false)?;
                let sql = Fragment::raw("CASE WHEN ")
                    .append(test)
                    .push_str(" THEN ")
                    .append(self.operand(&a)?)
                    .push_str(" ELSE ")
                    .append(self.operand(&b)?)
                    .push_str(" END");
                Ok(Segment::sql(sql, a.kind.or(b.kind), Some(expr)).merged(&[&a, &b]))
            }
            Expr::GroupKey(name) => self.group_key(expr, name.as_deref()),
            Expr::New { .. } => Err(QuarryError::unsupported(
                expr,
                "object construction is only valid as a projection or grouping key",
            )),
            Expr::Array(_) => Err(QuarryError::unsupported(
                expr,
                "an array is only valid as the receiver of contains",
            )),
            Expr::Lambda(_) => Err(QuarryError::unsupported(
                expr,
                "a lambda is only valid as the argument of any",
            )),
        }
    }

    /// A predicate used as a value, compiled in isolation from the
    /// surrounding scopes.
    fn predicate_value(&mut self, expr: &'a Expr) -> Result<Segment<'a>> {
        let sql = self.barrier_predicate(expr)?;
        Ok(Segment {
            has_field: true,
            ..Segment::predicate(sql, Some(expr))
        })
    }

    pub(crate) fn barrier_predicate(&mut self, expr: &'a Expr) -> Result<Fragment> {
        self.deferred.push(Frame::Scope {
            op: None,
            negated: false,
        });
        let sql = self.predicate(expr)?;
        self.deferred.pop_scope()?;
        Ok(sql)
    }

    /// Table of the entity `expr` denotes: a lambda root or a to-one
    /// navigation, joined on demand.
    pub(crate) fn entity_of(&mut self, expr: &'a Expr) -> Result<Option<usize>> {
        match expr {
            Expr::Root(name) => self.root_table(name).map(Some),
            Expr::Member { parent, name } => {
                let Some(owner) = self.entity_of(parent)? else {
                    return Ok(None);
                };
                let member = self.map_of(owner)?.require_member(name)?;
                if member.is_to_one() && !member.is_ignored {
                    self.add_navigation(owner, name).map(Some)
                } else {
                    Ok(None)
                }
            }
            _ => Ok(None),
        }
    }

    fn visit_member(&mut self, expr: &'a Expr, parent: &'a Expr, name: &str) -> Result<Segment<'a>> {
        if let Some(owner) = self.entity_of(parent)? {
            let map = self.map_of(owner)?;
            let member = map.require_member(name)?;
            if member.is_ignored {
                return Err(QuarryError::unsupported(expr, "member is ignored by the mapping"));
            }
            if let Some(nav) = &member.navigation {
                return match nav.cardinality {
                    Cardinality::ToOne => {
                        let table = self.add_navigation(owner, name)?;
                        Ok(Segment::entity(table, Some(expr)))
                    }
                    Cardinality::ToMany => Err(QuarryError::unsupported(
                        expr,
                        "a to-many navigation can only be used through any or count",
                    )),
                };
            }
            let column = member
                .column_name()
                .ok_or_else(|| QuarryError::unsupported(expr, "member has no column"))?;
            return Ok(Segment {
                sql: Fragment::column(owner, column),
                has_field: true,
                kind: member.store_kind(),
                native: self.native_of(member),
                column: Some(ColumnBinding {
                    table: owner,
                    member: member.name.clone(),
                    handler: member.type_handler.clone(),
                }),
                expr: Some(expr),
                ..Segment::default()
            });
        }

        // member of a captured or literal record
        let holder = self.visit(parent)?;
        match &holder.value {
            Some(Value::Record(record)) => {
                let value = record.get(name).cloned().unwrap_or_default();
                Ok(if holder.is_variable {
                    Segment::variable(value, Some(expr))
                } else {
                    Segment::literal(value, Some(expr))
                })
            }
            _ => Err(QuarryError::unsupported(
                expr,
                "member access on a value that is neither an entity nor a record",
            )),
        }
    }

    fn visit_unary(&mut self, expr: &'a Expr, op: UnaryOp, operand: &'a Expr) -> Result<Segment<'a>> {
        match op {
            UnaryOp::Not => self.predicate_value(expr),
            UnaryOp::Negate => {
                let inner = self.visit(operand)?;
                if !inner.is_variable {
                    let folded = match inner.value {
                        Some(Value::Int(i)) => i.checked_neg().map(Value::Int),
                        Some(Value::Float(f)) => Some(Value::Float(-f)),
                        _ => None,
                    };
                    if let Some(value) = folded {
                        return Ok(Segment::literal(value, Some(expr)));
                    }
                }
                // an inlined negative constant would otherwise render as `--`
                let constant = !inner.is_variable && inner.value.is_some();
                let sql = self.operand(&inner)?;
                let sql = if constant || matches!(operand, Expr::Binary { .. }) {
                    sql.parens()
                } else {
                    sql
                };
                Ok(Segment::sql(Fragment::raw("-").append(sql), inner.kind, Some(expr))
                    .merged(&[&inner]))
            }
            UnaryOp::Convert(kind) => {
                let inner = self.visit(operand)?;
                let cast = self.adapter.native_type_for(kind).to_cast_type();
                let sql = Fragment::raw("CAST(")
                    .append(self.operand(&inner)?)
                    .push_str(" AS ")
                    .push_str(cast)
                    .push_str(")");
                Ok(Segment {
                    native: Some(self.adapter.native_type_for(kind)),
                    ..Segment::sql(sql, Some(kind), Some(expr)).merged(&[&inner])
                })
            }
        }
    }

    /// A `+` chain: string concatenation when any operand is text,
    /// addition otherwise.
    fn visit_add(&mut self, expr: &'a Expr) -> Result<Segment<'a>> {
        let mut operands = Vec::new();
        flatten(expr, BinaryOp::Add, &mut operands);

        self.deferred.push(Frame::Concat(Vec::with_capacity(operands.len())));
        for &operand in &operands {
            let segment = self.visit(operand)?;
            self.deferred.push_concat(segment)?;
        }
        let parts = self.deferred.pop_concat()?;
        let refs: Vec<&Segment<'a>> = parts.iter().collect();

        if parts.iter().any(|p| p.kind == Some(ScalarKind::Text)) {
            let mut fragments = Vec::with_capacity(parts.len());
            for part in &parts {
                fragments.push(self.operand(part)?);
            }
            let sql = self.adapter.concat(fragments);
            return Ok(Segment {
                is_method_call: true,
                ..Segment::sql(sql, Some(ScalarKind::Text), Some(expr)).merged(&refs)
            });
        }

        let mut fragments = Vec::with_capacity(parts.len());
        for (part, operand) in parts.iter().zip(&operands) {
            let sql = self.operand(part)?;
            fragments.push(if needs_parens(operand, BinaryOp::Add, false) {
                sql.parens()
            } else {
                sql
            });
        }
        let kind = numeric_kind(parts.iter().map(|p| p.kind));
        Ok(Segment::sql(Fragment::join(fragments, " + "), kind, Some(expr)).merged(&refs))
    }

    fn visit_arithmetic(
        &mut self,
        expr: &'a Expr,
        op: BinaryOp,
        left: &'a Expr,
        right: &'a Expr,
    ) -> Result<Segment<'a>> {
        let mut l = self.visit(left)?;
        let mut r = self.visit(right)?;
        hint(&l, &mut r);
        hint(&r, &mut l);

        let mut ls = self.operand(&l)?;
        if needs_parens(left, op, false) {
            ls = ls.parens();
        }
        let mut rs = self.operand(&r)?;
        if needs_parens(right, op, true) {
            rs = rs.parens();
        }
        let sql = ls.push_str(" ").push_str(op.symbol()).push_str(" ").append(rs);
        let kind = numeric_kind([l.kind, r.kind]);
        Ok(Segment::sql(sql, kind, Some(expr)).merged(&[&l, &r]))
    }

    /// Method call through the adapter's function table, or one of the
    /// forms the compiler owns: navigation subqueries and `IN` lists.
    pub(crate) fn call(
        &mut self,
        expr: &'a Expr,
        method: &'a Method,
        target: Option<&'a Expr>,
        args: &'a [Expr],
        negated: bool,
    ) -> Result<Segment<'a>> {
        if matches!(method, Method::Any | Method::Count)
            && let Some(target) = target
            && self.is_collection(target)?
        {
            let predicate = match args.first() {
                Some(Expr::Lambda(lambda)) => Some(&**lambda),
                Some(other) => {
                    return Err(QuarryError::unsupported(
                        other,
                        "the argument of a navigation any/count must be a lambda",
                    ));
                }
                None => None,
            };
            return if *method == Method::Any {
                let sql = self.subquery(target, predicate, false, negated)?;
                Ok(Segment {
                    has_field: true,
                    ..Segment::predicate(sql, Some(expr))
                })
            } else {
                let sql = self.subquery(target, predicate, true, false)?;
                Ok(Segment {
                    has_field: true,
                    ..Segment::sql(sql, Some(ScalarKind::Int), Some(expr))
                })
            };
        }

        if *method == Method::Contains
            && let Some(target) = target
            && let Some(needle) = args.first()
        {
            match target {
                Expr::Array(items) => return self.in_list(expr, needle, ListSource::Exprs(items), negated),
                Expr::Constant(Value::List(values)) => {
                    return self.in_list(expr, needle, ListSource::Values(values, false), negated);
                }
                Expr::Variable {
                    value: Value::List(values),
                    ..
                } => return self.in_list(expr, needle, ListSource::Values(values, true), negated),
                _ => {}
            }
        }

        if *method == Method::Any {
            return Err(QuarryError::unsupported(
                expr,
                "any is only supported on a to-many navigation",
            ));
        }

        let function = *self
            .adapter
            .resolve_function(method)
            .ok_or_else(|| QuarryError::UnknownFunction {
                method: method.name().to_owned(),
            })?;

        let target = target.map(|t| self.visit(t)).transpose()?;
        let mut arg_segments = Vec::with_capacity(args.len());
        for arg in args {
            arg_segments.push(self.visit(arg)?);
        }
        if let Some(receiver) = &target {
            for arg in &mut arg_segments {
                hint(receiver, arg);
            }
        }

        let operand_kind = target
            .as_ref()
            .and_then(|t| t.kind)
            .or_else(|| arg_segments.first().and_then(|a| a.kind));
        let mut flags = Segment::none();
        for part in target.iter().chain(&arg_segments) {
            flags = flags.merged(&[part]);
        }

        let pass_negation = negated && function.negatable;
        let mut ctx = FunctionContext::new(
            method,
            target,
            arg_segments,
            pass_negation,
            self.adapter,
            &mut self.params,
        );
        let mut sql = (function.format)(&mut ctx)?;
        if negated && !function.negatable {
            sql = Fragment::raw("NOT (").append(sql).push_str(")");
        }

        Ok(Segment {
            sql,
            is_method_call: true,
            is_predicate: method.is_predicate(),
            kind: method.result_kind(operand_kind),
            expr: Some(expr),
            ..flags
        })
    }

    fn is_collection(&mut self, expr: &'a Expr) -> Result<bool> {
        let Expr::Member { parent, name } = expr else {
            return Ok(false);
        };
        let Some(owner) = self.entity_of(parent)? else {
            return Ok(false);
        };
        let member = self.map_of(owner)?.require_member(name)?;
        Ok(member
            .navigation
            .as_ref()
            .is_some_and(|nav| nav.cardinality == Cardinality::ToMany))
    }

    /// Correlated subquery over a to-many navigation: `EXISTS (...)` or
    /// `(SELECT COUNT(*) ...)`.
    fn subquery(
        &mut self,
        collection: &'a Expr,
        predicate: Option<&'a Lambda>,
        count: bool,
        negated: bool,
    ) -> Result<Fragment> {
        let Expr::Member { parent, name } = collection else {
            return Err(QuarryError::unsupported(collection, "expected a navigation"));
        };
        let owner = self
            .entity_of(parent)?
            .ok_or_else(|| QuarryError::unsupported(collection, "expected a navigation"))?;
        let nav = super::navigation_of(self.map_of(owner)?, name)?;
        let target = self.registry.get_map(&nav.target)?;
        let sub = self
            .tables
            .add(target.name(), target.table(), TableSource::Subquery, self.scope);

        let mut condition = equals(
            Fragment::column(owner, nav.owner_column.clone()),
            Fragment::column(sub, nav.target_column.clone()),
        );

        let outer = self.scope.replace(sub);
        let filter = match predicate {
            Some(lambda) => self.subquery_filter(lambda, sub),
            None => Ok(None),
        };
        self.scope = outer;
        if let Some(filter) = filter? {
            condition = condition.push_str(" AND ").append(filter);
        }

        let body = Fragment::raw(" FROM ")
            .append(Fragment::table(sub))
            .append(self.tables.joins(Some(sub)))
            .push_str(" WHERE ")
            .append(condition);
        Ok(if count {
            Fragment::raw("(SELECT COUNT(*)").append(body).push_str(")")
        } else {
            let head = if negated { "NOT EXISTS (SELECT 1" } else { "EXISTS (SELECT 1" };
            Fragment::raw(head).append(body).push_str(")")
        })
    }

    fn subquery_filter(&mut self, lambda: &'a Lambda, sub: usize) -> Result<Option<Fragment>> {
        let bound = self.bind(lambda, &[sub])?;
        let sql = self.scoped_predicate(LogicalOp::And, &lambda.body);
        self.unbind(bound);
        sql.map(Some)
    }

    /// `needle IN (...)`; an empty list is a constant predicate.
    fn in_list(
        &mut self,
        expr: &'a Expr,
        needle: &'a Expr,
        items: ListSource<'a>,
        negated: bool,
    ) -> Result<Segment<'a>> {
        let needle = self.visit(needle)?;
        let mut segments = Vec::new();
        match items {
            ListSource::Exprs(exprs) => {
                for item in exprs {
                    segments.push(self.visit(item)?);
                }
            }
            ListSource::Values(values, captured) => {
                segments.extend(values.iter().map(|v| {
                    if captured {
                        Segment::variable(v.clone(), None)
                    } else {
                        Segment::literal(v.clone(), None)
                    }
                }));
            }
        }

        if segments.is_empty() {
            let sql = Fragment::raw(if negated { "1 = 1" } else { "1 = 0" });
            return Ok(Segment::predicate(sql, Some(expr)));
        }

        let mut fragments = Vec::with_capacity(segments.len());
        for segment in &mut segments {
            self.store_counterpart(&needle, segment)?;
            fragments.push(self.operand(segment)?);
        }
        let keyword = if negated { " NOT IN (" } else { " IN (" };
        let sql = self
            .operand(&needle)?
            .push_str(keyword)
            .append(Fragment::join(fragments, ", "))
            .push_str(")");
        Ok(Segment::predicate(sql, Some(expr)).merged(&[&needle]))
    }

    /// Converts a literal compared with a handled column to its stored
    /// form, and gives it the column's native type.
    pub(crate) fn store_counterpart(&self, column: &Segment<'a>, literal: &mut Segment<'a>) -> Result<()> {
        let Some(value) = &literal.value else {
            return Ok(());
        };
        if let Some(binding) = &column.column
            && let Some(handler) = &binding.handler
            && !value.is_null()
        {
            let stored = handler
                .to_store(value)
                .map_err(|reason| QuarryError::TypeHandler {
                    member: binding.member.clone(),
                    reason,
                })?;
            literal.kind = stored.scalar_kind();
            literal.value = Some(stored);
        }
        hint(column, literal);
        Ok(())
    }
}

enum ListSource<'a> {
    Exprs(&'a [Expr]),
    /// Values of a list constant; `true` when captured from the caller.
    Values(&'a [Value], bool),
}

/// Gives a bare value the native type of the column it meets.
fn hint(column: &Segment<'_>, value: &mut Segment<'_>) {
    if value.value.is_some() && value.native.is_none() && column.column.is_some() {
        value.native = column.native;
    }
}

/// Operands of a left- or right-nested chain of `op`, in textual order.
pub(crate) fn flatten<'a>(expr: &'a Expr, op: BinaryOp, out: &mut Vec<&'a Expr>) {
    match expr {
        Expr::Binary {
            op: inner,
            left,
            right,
        } if *inner == op => {
            flatten(left, op, out);
            flatten(right, op, out);
        }
        other => out.push(other),
    }
}

fn needs_parens(child: &Expr, parent: BinaryOp, right_side: bool) -> bool {
    let Expr::Binary { op, .. } = child else {
        return false;
    };
    if !op.is_arithmetic() {
        return false;
    }
    let (child, parent_prec) = (op.precedence(), parent.precedence());
    child < parent_prec
        || (right_side
            && child == parent_prec
            && matches!(parent, BinaryOp::Sub | BinaryOp::Div | BinaryOp::Rem))
}

fn numeric_kind(kinds: impl IntoIterator<Item = Option<ScalarKind>>) -> Option<ScalarKind> {
    let mut out = None;
    for kind in kinds.into_iter().flatten() {
        out = match (out, kind) {
            (_, ScalarKind::Float) | (Some(ScalarKind::Float), _) => Some(ScalarKind::Float),
            (_, ScalarKind::Decimal) | (Some(ScalarKind::Decimal), _) => Some(ScalarKind::Decimal),
            (None, kind) => Some(kind),
            (current, _) => current,
        };
    }
    out
}

//! Predicate-position compilation.
//!
//! NOT is never emitted around a group. It is pushed down as a pending
//! frame: comparisons invert, AND/OR swap, and negatable functions render
//! their negated form.

use super::{CompareOp, Frame, LogicalOp, QueryCompiler, Segment};
use crate::error::Result;
use crate::expr::{BinaryOp, Expr, UnaryOp};
use crate::sql::Fragment;
use crate::value::Value;

use super::visitor::flatten;

impl<'a> QueryCompiler<'a> {
    /// Compiles `expr` as a boolean condition under the current polarity.
    pub(crate) fn predicate(&mut self, expr: &'a Expr) -> Result<Fragment> {
        match expr {
            Expr::Unary {
                op: UnaryOp::Not,
                operand,
            } => {
                self.deferred.push(Frame::Not);
                let sql = self.predicate(operand)?;
                self.deferred.pop_not()?;
                Ok(sql)
            }
            Expr::Binary {
                op: op @ (BinaryOp::And | BinaryOp::Or),
                ..
            } => self.logical(expr, *op),
            Expr::Binary {
                op: op @ (BinaryOp::Eq | BinaryOp::Ne),
                left,
                right,
            } if right.as_bool_constant().is_some() || left.as_bool_constant().is_some() => {
                match (left.as_bool_constant(), right.as_bool_constant()) {
                    (_, Some(value)) if left.as_bool_constant().is_none() => {
                        self.bool_compare(*op, value, left)
                    }
                    (Some(value), _) if right.as_bool_constant().is_none() => {
                        self.bool_compare(*op, value, right)
                    }
                    (Some(l), Some(r)) => {
                        let holds = (l == r) == (*op == BinaryOp::Eq);
                        Ok(truth(holds ^ self.deferred.negated()))
                    }
                    _ => self.comparison(*op, left, right),
                }
            }
            Expr::Binary { op, left, right } if op.is_comparison() => {
                self.comparison(*op, left, right)
            }
            Expr::Call {
                method,
                target,
                args,
            } if method.is_predicate() => {
                let negated = self.deferred.negated();
                let segment = self.call(expr, method, target.as_deref(), args, negated)?;
                Ok(segment.sql)
            }
            Expr::Constant(Value::Bool(value)) => Ok(truth(*value ^ self.deferred.negated())),
            _ => {
                let segment = self.visit(expr)?;
                self.truthy(&segment)
            }
        }
    }

    /// Compiles `expr` inside a scope whose connective is `op` and whose
    /// polarity resets to positive.
    pub(crate) fn scoped_predicate(&mut self, op: LogicalOp, expr: &'a Expr) -> Result<Fragment> {
        self.deferred.push(Frame::Scope {
            op: Some(op),
            negated: false,
        });
        let sql = self.predicate(expr)?;
        self.deferred.pop_scope()?;
        Ok(sql)
    }

    fn logical(&mut self, expr: &'a Expr, op: BinaryOp) -> Result<Fragment> {
        let negated = self.deferred.negated();
        let own = if op == BinaryOp::And {
            LogicalOp::And
        } else {
            LogicalOp::Or
        };
        let effective = if negated { own.flip() } else { own };
        let parent = self.deferred.scope_op();

        let mut operands = Vec::new();
        flatten(expr, op, &mut operands);

        self.deferred.push(Frame::Scope {
            op: Some(effective),
            negated,
        });
        let mut parts = Vec::with_capacity(operands.len());
        for operand in operands {
            parts.push(self.predicate(operand)?);
        }
        self.deferred.pop_scope()?;

        let sql = Fragment::join(parts, effective.keyword());
        Ok(match parent {
            Some(parent) if parent != effective => sql.parens(),
            _ => sql,
        })
    }

    /// `operand == true`, `operand != false` and friends fold into the
    /// operand's own predicate.
    fn bool_compare(&mut self, op: BinaryOp, value: bool, operand: &'a Expr) -> Result<Fragment> {
        let op = if op == BinaryOp::Eq {
            CompareOp::Eq
        } else {
            CompareOp::Ne
        };
        self.deferred.push(Frame::Compare { op, value });
        let sql = self.predicate(operand)?;
        self.deferred.pop_compare()?;
        Ok(sql)
    }

    fn comparison(&mut self, op: BinaryOp, left: &'a Expr, right: &'a Expr) -> Result<Fragment> {
        let op = if self.deferred.negated() {
            op.inverse()
        } else {
            op
        };
        let mut l = self.visit(left)?;
        let mut r = self.visit(right)?;

        if matches!(op, BinaryOp::Eq | BinaryOp::Ne) {
            let null_test = if op == BinaryOp::Eq {
                " IS NULL"
            } else {
                " IS NOT NULL"
            };
            if r.is_null() && !l.is_null() {
                return Ok(self.operand(&l)?.push_str(null_test));
            }
            if l.is_null() && !r.is_null() {
                return Ok(self.operand(&r)?.push_str(null_test));
            }
        }

        self.store_counterpart(&l, &mut r)?;
        self.store_counterpart(&r, &mut l)?;
        let ls = self.operand(&l)?;
        let rs = self.operand(&r)?;
        Ok(ls.push_str(" ").push_str(op.symbol()).push_str(" ").append(rs))
    }

    /// A value used as a condition: `x = TRUE`, or `x = FALSE` when negated.
    fn truthy(&mut self, segment: &Segment<'a>) -> Result<Fragment> {
        let negated = self.deferred.negated();
        if segment.is_predicate {
            return Ok(if negated {
                Fragment::raw("NOT (").append(segment.sql.clone()).push_str(")")
            } else {
                segment.sql.clone()
            });
        }
        if !segment.is_variable
            && let Some(Value::Bool(value)) = segment.value
        {
            return Ok(truth(value ^ negated));
        }
        let literal = self.adapter.bool_literal(!negated);
        Ok(self.operand(segment)?.push_str(" = ").push_str(literal))
    }
}

fn truth(value: bool) -> Fragment {
    Fragment::raw(if value { "1 = 1" } else { "1 = 0" })
}

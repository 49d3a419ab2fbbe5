use std::sync::Arc;

use compact_str::CompactString;
use quarry_types::{NativeType, ScalarKind};

use crate::dialect::DialectAdapter;
use crate::error::{QuarryError, Result};
use crate::expr::Expr;
use crate::mapping::TypeHandler;
use crate::param::{ParamCollector, inline_literal};
use crate::sql::Fragment;
use crate::value::Value;

/// The mapped column a segment reads.
#[derive(Debug, Clone)]
pub struct ColumnBinding {
    pub table: usize,
    pub member: CompactString,
    pub handler: Option<Arc<dyn TypeHandler>>,
}

/// The compiler's working value: SQL plus what is known about it.
#[derive(Debug, Clone, Default)]
pub struct Segment<'a> {
    pub sql: Fragment,
    /// References at least one column.
    pub has_field: bool,
    /// Contains a bound parameter.
    pub is_parameter: bool,
    /// Produced by a function translation.
    pub is_method_call: bool,
    /// Boolean condition text (needs `CASE` to be used as a value).
    pub is_predicate: bool,
    /// Literal or captured value not yet rendered.
    pub value: Option<Value>,
    /// `value` came from a variable and must be bound.
    pub is_variable: bool,
    pub kind: Option<ScalarKind>,
    /// Native type used when `value` becomes a parameter.
    pub native: Option<NativeType>,
    pub column: Option<ColumnBinding>,
    /// The segment denotes a whole entity (a lambda root or a to-one
    /// navigation) whose table has this index.
    pub entity_table: Option<usize>,
    pub expr: Option<&'a Expr>,
}

impl<'a> Segment<'a> {
    /// Empty segment.
    pub fn none() -> Self {
        Self::default()
    }

    /// SQL `NULL`.
    pub fn null() -> Self {
        Self {
            value: Some(Value::Null),
            ..Self::default()
        }
    }

    /// Boolean true.
    pub fn truth() -> Self {
        Self {
            value: Some(Value::Bool(true)),
            kind: Some(ScalarKind::Bool),
            ..Self::default()
        }
    }

    pub fn literal(value: Value, expr: Option<&'a Expr>) -> Self {
        Self {
            kind: value.scalar_kind(),
            value: Some(value),
            expr,
            ..Self::default()
        }
    }

    pub fn variable(value: Value, expr: Option<&'a Expr>) -> Self {
        Self {
            kind: value.scalar_kind(),
            value: Some(value),
            is_variable: true,
            is_parameter: true,
            expr,
            ..Self::default()
        }
    }

    pub fn sql(sql: Fragment, kind: Option<ScalarKind>, expr: Option<&'a Expr>) -> Self {
        Self {
            sql,
            kind,
            expr,
            ..Self::default()
        }
    }

    pub fn predicate(sql: Fragment, expr: Option<&'a Expr>) -> Self {
        Self {
            sql,
            is_predicate: true,
            kind: Some(ScalarKind::Bool),
            expr,
            ..Self::default()
        }
    }

    pub fn entity(table: usize, expr: Option<&'a Expr>) -> Self {
        Self {
            entity_table: Some(table),
            expr,
            ..Self::default()
        }
    }

    pub fn is_none(&self) -> bool {
        self.sql.is_empty() && self.value.is_none() && self.entity_table.is_none()
    }

    /// Null constant or a variable holding null.
    pub fn is_null(&self) -> bool {
        matches!(self.value, Some(Value::Null))
    }

    /// Copies the flags of `parts` onto a segment built from them.
    pub fn merged(mut self, parts: &[&Segment<'_>]) -> Self {
        for part in parts {
            self.has_field |= part.has_field;
            self.is_parameter |= part.is_parameter || part.is_variable || part.value.is_some();
            self.is_method_call |= part.is_method_call;
        }
        self
    }

    /// Node text for diagnostics.
    pub fn describe(&self) -> String {
        match self.expr {
            Some(expr) => expr.to_string(),
            None => "<expression>".to_owned(),
        }
    }

    /// SQL usable in value position.
    ///
    /// Inlines safe literals, binds everything else, and turns predicates
    /// into `CASE WHEN ... THEN TRUE ELSE FALSE END`.
    pub fn to_operand(
        &self,
        params: &mut ParamCollector,
        adapter: &dyn DialectAdapter,
    ) -> Result<Fragment> {
        if let Some(value) = &self.value {
            if !self.is_variable
                && let Some(fragment) = inline_literal(value, adapter)
            {
                return Ok(fragment);
            }
            return Ok(params.push(value.clone(), self.native));
        }
        if self.entity_table.is_some() {
            return Err(QuarryError::unsupported(
                self.describe(),
                "an entity cannot be used as a scalar value",
            ));
        }
        if self.is_predicate {
            return Ok(Fragment::raw("CASE WHEN ")
                .append(self.sql.clone())
                .push_str(" THEN ")
                .push_str(adapter.bool_literal(true))
                .push_str(" ELSE ")
                .push_str(adapter.bool_literal(false))
                .push_str(" END"));
        }
        Ok(self.sql.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::AnsiDialect;

    #[test]
    fn test_sentinels() {
        assert!(Segment::none().is_none());
        assert!(Segment::null().is_null());
        assert_eq!(Segment::truth().value, Some(Value::Bool(true)));
    }

    #[test]
    fn test_operand_policy() {
        let mut params = ParamCollector::new();
        let number = Segment::literal(Value::Int(4), None);
        assert_eq!(
            number.to_operand(&mut params, &AnsiDialect).unwrap().as_raw(),
            Some("4")
        );
        assert!(params.is_empty());

        let captured = Segment::variable(Value::Int(4), None);
        captured.to_operand(&mut params, &AnsiDialect).unwrap();
        assert_eq!(params.len(), 1);

        let predicate = Segment::predicate(Fragment::raw("x > 1"), None);
        assert_eq!(
            predicate.to_operand(&mut params, &AnsiDialect).unwrap().as_raw(),
            Some("CASE WHEN x > 1 THEN TRUE ELSE FALSE END")
        );

        assert!(Segment::entity(0, None).to_operand(&mut params, &AnsiDialect).is_err());
    }
}

//! Parameter collection and binding.
//!
//! Values are collected while clauses compile and bound, with their final
//! placeholder, when the statement renders.

use std::borrow::Cow;

use compact_str::{CompactString, format_compact};
use quarry_types::NativeType;

use crate::dialect::DialectAdapter;
use crate::error::{QuarryError, Result};
use crate::sql::Fragment;
use crate::value::Value;

/// A value waiting for its placeholder.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingParam {
    pub value: Value,
    /// Native type of the column the value is compared with or written to.
    pub native: Option<NativeType>,
}

/// A parameter of a compiled statement, in placeholder order.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundParam {
    /// `p1`, `p2`, ... in placeholder order.
    pub name: CompactString,
    /// Placeholder text as written in the SQL.
    pub placeholder: Cow<'static, str>,
    pub value: Value,
    pub native_type: Option<NativeType>,
}

/// Collects parameter values for one statement.
#[derive(Debug, Clone, Default)]
pub struct ParamCollector {
    pending: Vec<PendingParam>,
}

impl ParamCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a value and returns the fragment referencing it.
    pub fn push(&mut self, value: Value, native: Option<NativeType>) -> Fragment {
        let index = self.pending.len();
        self.pending.push(PendingParam { value, native });
        Fragment::param(index)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&PendingParam> {
        self.pending.get(index)
    }

    /// Binds the value at `index` to the 1-based placeholder `position`.
    pub fn bind(
        &self,
        index: usize,
        position: usize,
        adapter: &dyn DialectAdapter,
    ) -> Result<BoundParam> {
        let pending = self
            .pending
            .get(index)
            .ok_or(QuarryError::UnknownParameter { index })?;
        let native_type = pending.native.or_else(|| {
            pending
                .value
                .scalar_kind()
                .map(|kind| adapter.native_type_for(kind))
        });
        Ok(BoundParam {
            name: format_compact!("p{position}"),
            placeholder: adapter.parameter_placeholder(position),
            value: pending.value.clone(),
            native_type,
        })
    }
}

/// SQL text for a value that is safe to inline, `None` when it must be bound.
///
/// Numbers, booleans, dates and null inline; text and bytes never do.
pub fn inline_literal(value: &Value, adapter: &dyn DialectAdapter) -> Option<Fragment> {
    match value {
        Value::Null => Some(Fragment::raw("NULL")),
        Value::Bool(b) => Some(Fragment::raw(adapter.bool_literal(*b))),
        Value::Int(i) => Some(Fragment::raw(format_compact!("{i}"))),
        Value::Float(f) if f.is_finite() => Some(Fragment::raw(format_compact!("{f:?}"))),
        Value::DateTime(dt) => Some(Fragment::raw(adapter.datetime_literal(dt))),
        _ => None,
    }
}

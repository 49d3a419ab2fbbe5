//! Flat rows to object graphs.
//!
//! A [`MaterializationPlan`] is derived once from a compiled query's
//! projected fields; a [`Materializer`] then folds result rows into
//! records, nesting to-one navigations and collecting to-many ones.

mod field;
mod materializer;
mod plan;

pub use field::{FieldOrigin, ProjectedField};
pub use materializer::Materializer;
pub use plan::{FieldSlot, MaterializationPlan, PlanNode};

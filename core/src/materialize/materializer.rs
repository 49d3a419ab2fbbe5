use compact_str::CompactString;

use super::{FieldSlot, MaterializationPlan, PlanNode};
use crate::error::{QuarryError, Result};
use crate::mapping::Cardinality;
use crate::row::{FromRecord, FromValue, Row};
use crate::value::{Record, Value};

/// Folds result rows into values following a [`MaterializationPlan`].
///
/// Rows are consumed in order. When the plan has to-many members, rows
/// sharing a root identity must be contiguous and are merged into one
/// object; otherwise every row yields one value.
#[derive(Debug, Clone)]
pub struct Materializer<'p> {
    plan: &'p MaterializationPlan,
    /// Root object still collecting rows, with its identity.
    pending: Option<(Vec<Value>, Record)>,
    rows: usize,
}

impl<'p> Materializer<'p> {
    pub fn new(plan: &'p MaterializationPlan) -> Self {
        Self {
            plan,
            pending: None,
            rows: 0,
        }
    }

    /// Consumes one row. Returns the previous object once a row with a
    /// new root identity shows it is complete.
    pub fn feed<R: Row + ?Sized>(&mut self, row: &R) -> Result<Option<Value>> {
        self.rows += 1;
        let (root, grouped) = match self.plan {
            MaterializationPlan::Scalar(slot) => return read(row, slot).map(Some),
            MaterializationPlan::Object { root, grouped } => (root, *grouped),
        };
        let identity = identity_of(root, &root.identity_slots(), row)?;
        if !grouped {
            return Ok(Some(Value::Record(Box::new(build(root, row)?))));
        }
        if let Some((current, record)) = &mut self.pending
            && *current == identity
        {
            merge(root, row, record)?;
            return Ok(None);
        }
        let record = build(root, row)?;
        Ok(self
            .pending
            .replace((identity, record))
            .map(|(_, done)| Value::Record(Box::new(done))))
    }

    /// The last object still collecting rows, if any.
    pub fn finish(&mut self) -> Option<Value> {
        self.pending
            .take()
            .map(|(_, record)| Value::Record(Box::new(record)))
    }

    /// Materializes every row with a fresh stream over the same plan.
    pub fn materialize<I>(&self, rows: I) -> Result<Vec<Value>>
    where
        I: IntoIterator,
        I::Item: Row,
    {
        let mut stream = Materializer::new(self.plan);
        let mut out = Vec::new();
        for row in rows {
            if let Some(value) = stream.feed(&row)? {
                out.push(value);
            }
        }
        out.extend(stream.finish());
        crate::quarry_trace_materialize!(stream.rows, out.len());
        Ok(out)
    }

    /// Materializes and converts every object.
    pub fn materialize_as<T, I>(&self, rows: I) -> Result<Vec<T>>
    where
        T: FromRecord,
        I: IntoIterator,
        I::Item: Row,
    {
        self.materialize(rows)?
            .iter()
            .map(|value| match value {
                Value::Record(record) => T::from_record(record),
                other => Err(QuarryError::Conversion {
                    expected: "record",
                    found: other.type_name(),
                }),
            })
            .collect()
    }

    /// Materializes a scalar projection and converts every value.
    pub fn materialize_scalars<T, I>(&self, rows: I) -> Result<Vec<T>>
    where
        T: FromValue,
        I: IntoIterator,
        I::Item: Row,
    {
        self.materialize(rows)?.iter().map(T::from_value).collect()
    }
}

fn read<R: Row + ?Sized>(row: &R, slot: &FieldSlot) -> Result<Value> {
    let cell = row.cell(slot.ordinal)?;
    match &slot.handler {
        Some(handler) if !cell.is_null() => {
            handler
                .from_store(cell)
                .map_err(|reason| QuarryError::TypeHandler {
                    member: slot.member.clone(),
                    reason,
                })
        }
        _ => Ok(cell.clone()),
    }
}

fn identity_of<R: Row + ?Sized>(node: &PlanNode, slots: &[usize], row: &R) -> Result<Vec<Value>> {
    slots
        .iter()
        .filter_map(|&slot| node.fields.get(slot))
        .map(|field| read(row, field))
        .collect()
}

fn build<R: Row + ?Sized>(node: &PlanNode, row: &R) -> Result<Record> {
    let mut record = Record::new(node.entity.clone());
    for slot in &node.fields {
        record.fields.push((slot.member.clone(), read(row, slot)?));
    }
    for child in &node.children {
        let member = child_member(child);
        match child.cardinality {
            Cardinality::ToOne => {
                let value = build_optional(child, row)?
                    .map_or(Value::Null, |r| Value::Record(Box::new(r)));
                record.fields.push((member, value));
            }
            Cardinality::ToMany => {
                let mut items = Vec::new();
                collect(child, row, &mut items)?;
                record.fields.push((member, Value::List(items)));
            }
        }
    }
    Ok(record)
}

/// A navigated object, `None` when every identity column is null.
fn build_optional<R: Row + ?Sized>(node: &PlanNode, row: &R) -> Result<Option<Record>> {
    let identity = identity_of(node, &node.identity_slots(), row)?;
    if identity.iter().all(Value::is_null) {
        return Ok(None);
    }
    build(node, row).map(Some)
}

/// Adds this row's contribution to the collections below `record`.
fn merge<R: Row + ?Sized>(node: &PlanNode, row: &R, record: &mut Record) -> Result<()> {
    for child in &node.children {
        let Some(slot) = record.get_mut(child_member(child).as_str()) else {
            continue;
        };
        match (child.cardinality, slot) {
            (Cardinality::ToMany, Value::List(items)) => collect(child, row, items)?,
            (Cardinality::ToOne, Value::Record(nested)) => merge(child, row, nested)?,
            _ => {}
        }
    }
    Ok(())
}

/// Appends the row's child object unless an equal identity is already
/// present, in which case its own collections are extended.
fn collect<R: Row + ?Sized>(node: &PlanNode, row: &R, items: &mut Vec<Value>) -> Result<()> {
    let slots = node.identity_slots();
    let identity = identity_of(node, &slots, row)?;
    if identity.iter().all(Value::is_null) {
        return Ok(());
    }
    let members: Vec<&CompactString> = slots
        .iter()
        .filter_map(|&slot| node.fields.get(slot))
        .map(|f| &f.member)
        .collect();

    let existing = items.iter_mut().rev().find_map(|item| match item {
        Value::Record(record)
            if members
                .iter()
                .zip(&identity)
                .all(|(member, value)| record.get(member) == Some(value)) =>
        {
            Some(record)
        }
        _ => None,
    });
    match existing {
        Some(record) => merge(node, row, record),
        None => {
            items.push(Value::Record(Box::new(build(node, row)?)));
            Ok(())
        }
    }
}

fn child_member(node: &PlanNode) -> CompactString {
    node.member.clone().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use compact_str::CompactString;
    use smallvec::SmallVec;

    use super::*;
    use crate::materialize::{FieldOrigin, ProjectedField};
    use crate::mapping::{EntityRegistry, RegistryBuilder};
    use quarry_types::ScalarKind;

    fn registry() -> EntityRegistry {
        RegistryBuilder::new()
            .entity("User", |e| {
                e.member("id", ScalarKind::Int).key();
                e.member("name", ScalarKind::Text);
                e.member("company_id", ScalarKind::Int);
                e.has_one("company", "Company");
                e.has_many("orders", "Order");
            })
            .entity("Company", |e| {
                e.member("id", ScalarKind::Int).key();
            })
            .entity("Order", |e| {
                e.member("id", ScalarKind::Int).key();
                e.member("user_id", ScalarKind::Int);
            })
            .build()
            .unwrap()
    }

    fn field(ordinal: usize, path: &[&str], owner: &str, origin: FieldOrigin, is_key: bool) -> ProjectedField {
        ProjectedField {
            ordinal,
            name: path.join("_").into(),
            path: path.iter().map(|s| CompactString::from(*s)).collect::<SmallVec<_>>(),
            owner: Some(owner.into()),
            table: None,
            origin,
            is_key,
            handler: None,
        }
    }

    #[test]
    fn test_to_many_groups_rows() {
        let fields = [
            field(0, &["id"], "User", FieldOrigin::Target, true),
            field(1, &["orders", "id"], "Order", FieldOrigin::Navigation(Cardinality::ToMany), true),
        ];
        let plan = MaterializationPlan::build(&registry(), &fields).unwrap();
        let rows = vec![
            vec![Value::Int(1), Value::Int(10)],
            vec![Value::Int(1), Value::Int(11)],
            vec![Value::Int(1), Value::Int(11)],
            vec![Value::Int(2), Value::Null],
        ];
        let users = Materializer::new(&plan).materialize(rows).unwrap();
        assert_eq!(users.len(), 2);
        let first = users[0].as_record().unwrap();
        assert_eq!(first.get("orders").unwrap().as_list().unwrap().len(), 2);
        let second = users[1].as_record().unwrap();
        assert_eq!(second.get("orders"), Some(&Value::List(vec![])));
    }

    #[test]
    fn test_to_one_all_null_is_null() {
        let fields = [
            field(0, &["id"], "User", FieldOrigin::Target, true),
            field(1, &["company", "id"], "Company", FieldOrigin::Navigation(Cardinality::ToOne), true),
        ];
        let plan = MaterializationPlan::build(&registry(), &fields).unwrap();
        let users = Materializer::new(&plan)
            .materialize([vec![Value::Int(1), Value::Null], vec![Value::Int(2), Value::Int(5)]])
            .unwrap();
        assert_eq!(users[0].as_record().unwrap().get("company"), Some(&Value::Null));
        assert!(users[1].as_record().unwrap().get("company").unwrap().as_record().is_some());
    }

    #[test]
    fn test_short_row_is_an_error() {
        let fields = [
            field(0, &["id"], "User", FieldOrigin::Target, true),
            field(1, &["name"], "User", FieldOrigin::Target, false),
        ];
        let plan = MaterializationPlan::build(&registry(), &fields).unwrap();
        let err = Materializer::new(&plan).materialize([vec![Value::Int(1)]]).unwrap_err();
        assert!(matches!(err, QuarryError::RowShape { ordinal: 1, width: 1 }));
    }

    #[test]
    fn test_streaming_emits_completed_parents() {
        let fields = [
            field(0, &["id"], "User", FieldOrigin::Target, true),
            field(1, &["orders", "id"], "Order", FieldOrigin::Navigation(Cardinality::ToMany), true),
        ];
        let plan = MaterializationPlan::build(&registry(), &fields).unwrap();
        let mut stream = Materializer::new(&plan);
        assert!(stream.feed(&[Value::Int(1), Value::Int(10)]).unwrap().is_none());
        assert!(stream.feed(&[Value::Int(1), Value::Int(11)]).unwrap().is_none());
        let first = stream.feed(&[Value::Int(2), Value::Int(12)]).unwrap().unwrap();
        assert_eq!(first.as_record().unwrap().get("id"), Some(&Value::Int(1)));
        let last = stream.finish().unwrap();
        assert_eq!(last.as_record().unwrap().get("id"), Some(&Value::Int(2)));
        assert!(stream.finish().is_none());
    }
}

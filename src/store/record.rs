use std::cmp::Ordering;

use serde_json::{Map, Value};

use super::query::{Condition, FilterOp};

/// One row as the store hands it back: column name to JSON value.
pub type Record = Map<String, Value>;

/// Canonical text form of a scalar used to correlate ids across tables.
///
/// Ids arrive as JSON numbers from the store and often as strings from clients or URL
/// paths, so `101` and `"101"` must land on the same key.
pub fn record_key(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

pub fn values_equal(left: &Value, right: &Value) -> bool {
    if let (Some(l), Some(r)) = (left.as_f64(), right.as_f64()) {
        return l == r;
    }
    match (record_key(left), record_key(right)) {
        (Some(l), Some(r)) => l == r,
        _ => left.is_null() && right.is_null(),
    }
}

/// Total order used for sorting rows: nulls first, numbers numerically, then text.
pub fn compare_values(left: &Value, right: &Value) -> Ordering {
    match (left, right) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Less,
        (_, Value::Null) => Ordering::Greater,
        _ => match (left.as_f64(), right.as_f64()) {
            (Some(l), Some(r)) => l.partial_cmp(&r).unwrap_or(Ordering::Equal),
            _ => record_key(left).cmp(&record_key(right)),
        },
    }
}

/// Evaluates one condition against a row. A missing column reads as null.
pub fn matches(record: &Record, condition: &Condition) -> bool {
    let field = record.get(&condition.column).unwrap_or(&Value::Null);
    match condition.op {
        FilterOp::Eq => values_equal(field, &condition.value),
        FilterOp::Gte => match (field.as_f64(), condition.value.as_f64()) {
            (Some(f), Some(v)) => f >= v,
            _ => false,
        },
        FilterOp::In => match &condition.value {
            Value::Array(values) => !field.is_null() && values.iter().any(|v| values_equal(field, v)),
            other => values_equal(field, other),
        },
    }
}

pub fn matches_all(record: &Record, conditions: &[Condition]) -> bool {
    conditions.iter().all(|c| matches(record, c))
}

/// Keeps only the named columns; an empty list or `*` keeps the whole row.
pub fn project(record: &Record, columns: &[String]) -> Record {
    if columns.is_empty() || columns.iter().any(|c| c == "*") {
        return record.clone();
    }
    columns
        .iter()
        .map(|c| (c.clone(), record.get(c).cloned().unwrap_or(Value::Null)))
        .collect()
}

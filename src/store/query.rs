use serde_json::{Map, Value};

/// Comparison operators understood by every record store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    Gte,
    In,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub column: String,
    pub op: FilterOp,
    pub value: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub column: String,
    pub direction: SortDirection,
}

/// Inclusive row window, `from..=to`, as a paging client thinks about it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Range {
    pub from: i64,
    pub to: i64,
}

impl Range {
    pub fn new(from: i64, to: i64) -> Self {
        Self { from, to }
    }

    pub fn offset(&self) -> i64 {
        self.from
    }

    pub fn limit(&self) -> i64 {
        (self.to - self.from + 1).max(0)
    }
}

/// A filtered select against one table.
///
/// An empty column list selects every column.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub table: String,
    pub columns: Vec<String>,
    pub conditions: Vec<Condition>,
    pub order: Vec<Order>,
    pub range: Option<Range>,
}

impl Query {
    pub fn table(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            columns: vec![],
            conditions: vec![],
            order: vec![],
            range: None,
        }
    }

    pub fn columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn eq(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.push(condition(column, FilterOp::Eq, value.into()));
        self
    }

    pub fn gte(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.push(condition(column, FilterOp::Gte, value.into()));
        self
    }

    pub fn is_in(mut self, column: impl Into<String>, values: Vec<Value>) -> Self {
        self.conditions.push(condition(column, FilterOp::In, Value::Array(values)));
        self
    }

    pub fn order_by(mut self, column: impl Into<String>, direction: SortDirection) -> Self {
        self.order.push(Order { column: column.into(), direction });
        self
    }

    pub fn range(mut self, from: i64, to: i64) -> Self {
        self.range = Some(Range::new(from, to));
        self
    }
}

/// A conditional bulk update. Only rows matching every condition are patched; the
/// `returning` columns of each patched row come back to the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct Update {
    pub table: String,
    pub patch: Map<String, Value>,
    pub conditions: Vec<Condition>,
    pub returning: Vec<String>,
}

impl Update {
    pub fn table(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            patch: Map::new(),
            conditions: vec![],
            returning: vec![],
        }
    }

    pub fn set(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.patch.insert(column.into(), value.into());
        self
    }

    pub fn eq(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.push(condition(column, FilterOp::Eq, value.into()));
        self
    }

    pub fn is_in(mut self, column: impl Into<String>, values: Vec<Value>) -> Self {
        self.conditions.push(condition(column, FilterOp::In, Value::Array(values)));
        self
    }

    pub fn returning<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.returning = columns.into_iter().map(Into::into).collect();
        self
    }
}

fn condition(column: impl Into<String>, op: FilterOp, value: Value) -> Condition {
    Condition { column: column.into(), op, value }
}

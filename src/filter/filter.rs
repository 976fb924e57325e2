use serde_json::{Map, Value};

use super::error::FilterError;
use super::filter_order::FilterOrder;
use super::filter_where::FilterWhere;
use super::types::SqlResult;
use crate::store::{Condition, Order, Query, Range, Update};

/// SQL builder for one table. Rows come back as a single JSON column named `record`
/// so callers never need a per-table row type.
pub struct Filter {
    table_name: String,
    select_columns: Vec<String>,
    conditions: Vec<Condition>,
    order_data: Vec<Order>,
    range: Option<Range>,
}

impl Filter {
    pub fn new(table_name: impl Into<String>) -> Result<Self, FilterError> {
        let table_name = table_name.into();
        validate_identifier(&table_name).map_err(FilterError::InvalidTableName)?;
        Ok(Self {
            table_name,
            select_columns: vec![],
            conditions: vec![],
            order_data: vec![],
            range: None,
        })
    }

    pub fn from_query(query: &Query) -> Result<Self, FilterError> {
        let mut filter = Self::new(&query.table)?;
        filter.select(query.columns.clone())?;
        filter.where_clause(query.conditions.clone());
        filter.order(query.order.clone());
        if let Some(range) = query.range { filter.range(range)?; }
        Ok(filter)
    }

    pub fn select(&mut self, columns: Vec<String>) -> Result<&mut Self, FilterError> {
        for column in &columns {
            if column == "*" { continue; }
            validate_identifier(column).map_err(FilterError::InvalidColumn)?;
        }
        self.select_columns = columns;
        Ok(self)
    }

    pub fn where_clause(&mut self, conditions: Vec<Condition>) -> &mut Self {
        self.conditions = conditions;
        self
    }

    pub fn order(&mut self, order: Vec<Order>) -> &mut Self {
        self.order_data = order;
        self
    }

    pub fn range(&mut self, range: Range) -> Result<&mut Self, FilterError> {
        if range.offset() < 0 { return Err(FilterError::InvalidOffset("Offset must be non-negative".to_string())); }
        if range.to < range.from { return Err(FilterError::InvalidLimit(format!("Empty range {}..={}", range.from, range.to))); }
        self.range = Some(range);
        Ok(self)
    }

    pub fn to_sql(&self) -> Result<SqlResult, FilterError> {
        let (where_clause, params) = FilterWhere::generate(&self.conditions, 0)?;
        let order_clause = FilterOrder::generate(&self.order_data)?;
        let limit_clause = self.build_limit_clause();

        let query = [
            format!("SELECT {} AS record", self.build_record_expr(&self.select_columns)),
            format!("FROM \"{}\" t", self.table_name),
            format!("WHERE {}", where_clause),
            order_clause,
            limit_clause,
        ].into_iter().filter(|s| !s.is_empty()).collect::<Vec<_>>().join(" ");

        Ok(SqlResult::new(query, params))
    }

    pub fn to_count_sql(&self) -> Result<SqlResult, FilterError> {
        let (where_clause, params) = FilterWhere::generate(&self.conditions, 0)?;
        let query = format!("SELECT COUNT(*) AS count FROM \"{}\" WHERE {}", self.table_name, where_clause);
        Ok(SqlResult::new(query, params))
    }

    /// `UPDATE` whose patch travels as one JSONB parameter and is expanded with
    /// `jsonb_populate_record`, so every value is converted to its column's real type.
    pub fn to_update_sql(&self, patch: &Map<String, Value>, returning: &[String]) -> Result<SqlResult, FilterError> {
        if patch.is_empty() { return Err(FilterError::EmptyPatch); }
        for column in patch.keys().chain(returning.iter()) {
            if column == "*" { continue; }
            validate_identifier(column).map_err(FilterError::InvalidColumn)?;
        }

        let targets = patch.keys().map(|c| format!("\"{}\"", c)).collect::<Vec<_>>().join(", ");
        let sources = patch.keys().map(|c| format!("p.\"{}\"", c)).collect::<Vec<_>>().join(", ");
        let (where_clause, mut where_params) = FilterWhere::generate(&self.conditions, 1)?;

        let query = format!(
            "UPDATE \"{table}\" t SET ({targets}) = (SELECT {sources} FROM jsonb_populate_record(NULL::\"{table}\", $1) p) WHERE {where_clause} RETURNING {record} AS record",
            table = self.table_name,
            record = self.build_record_expr(returning),
        );

        let mut params = vec![Value::Object(patch.clone())];
        params.append(&mut where_params);
        Ok(SqlResult::new(query, params))
    }

    fn build_record_expr(&self, columns: &[String]) -> String {
        if columns.is_empty() || columns.iter().any(|c| c == "*") {
            "row_to_json(t)".to_string()
        } else {
            let pairs = columns.iter().map(|c| format!("'{}', t.\"{}\"", c, c)).collect::<Vec<_>>().join(", ");
            format!("json_build_object({})", pairs)
        }
    }

    fn build_limit_clause(&self) -> String {
        match self.range {
            Some(range) => format!("LIMIT {} OFFSET {}", range.limit(), range.offset()),
            None => String::new(),
        }
    }
}

/// Table and column names are interpolated into SQL, so only plain identifiers pass.
pub(crate) fn validate_identifier(name: &str) -> Result<(), String> {
    let mut chars = name.chars();
    match chars.next() {
        None => Err("Identifier cannot be empty".to_string()),
        Some(first) if !(first.is_ascii_alphabetic() || first == '_') => Err(format!("Invalid identifier format: {}", name)),
        Some(_) if !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') => Err(format!("Invalid identifier format: {}", name)),
        Some(_) => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::SortDirection;
    use serde_json::json;

    #[test]
    fn select_projects_columns_into_json() {
        let query = Query::table("debt")
            .columns(["account_id", "amount"])
            .eq("stage", "candidates")
            .gte("amount", 500);
        let sql = Filter::from_query(&query).unwrap().to_sql().unwrap();
        assert_eq!(
            sql.query,
            "SELECT json_build_object('account_id', t.\"account_id\", 'amount', t.\"amount\") AS record FROM \"debt\" t WHERE \"stage\"::text = $1 AND \"amount\" >= $2"
        );
        assert_eq!(sql.params, vec![json!("candidates"), json!(500)]);
    }

    #[test]
    fn paged_select_orders_and_limits() {
        let query = Query::table("accounts")
            .is_in("house_id", vec![json!(1), json!(2)])
            .order_by("id", SortDirection::Asc)
            .range(40, 59);
        let sql = Filter::from_query(&query).unwrap().to_sql().unwrap();
        assert_eq!(
            sql.query,
            "SELECT row_to_json(t) AS record FROM \"accounts\" t WHERE \"house_id\" IN ($1, $2) ORDER BY \"id\" ASC LIMIT 20 OFFSET 40"
        );
    }

    #[test]
    fn count_ignores_range_and_order() {
        let query = Query::table("accounts").is_in("id", vec![json!(3)]).range(0, 19);
        let sql = Filter::from_query(&query).unwrap().to_count_sql().unwrap();
        assert_eq!(sql.query, "SELECT COUNT(*) AS count FROM \"accounts\" WHERE \"id\" IN ($1)");
    }

    #[test]
    fn update_binds_patch_first() {
        let update = Update::table("debt")
            .set("stage", "new")
            .is_in("account_id", vec![json!(1), json!(2)])
            .eq("stage", "candidates")
            .returning(["account_id"]);
        let mut filter = Filter::new(&update.table).unwrap();
        filter.where_clause(update.conditions.clone());
        let sql = filter.to_update_sql(&update.patch, &update.returning).unwrap();
        assert_eq!(
            sql.query,
            "UPDATE \"debt\" t SET (\"stage\") = (SELECT p.\"stage\" FROM jsonb_populate_record(NULL::\"debt\", $1) p) WHERE \"account_id\" IN ($2, $3) AND \"stage\"::text = $4 RETURNING json_build_object('account_id', t.\"account_id\") AS record"
        );
        assert_eq!(sql.params[0], json!({ "stage": "new" }));
        assert_eq!(sql.params.len(), 4);
    }

    #[test]
    fn rejects_unsafe_identifiers() {
        assert!(matches!(Filter::new("debt\"; --"), Err(FilterError::InvalidTableName(_))));
        assert!(matches!(Filter::new(""), Err(FilterError::InvalidTableName(_))));
        assert!(Filter::new("_accounts2").is_ok());
        let mut filter = Filter::new("debt").unwrap();
        assert!(matches!(filter.select(vec!["1bad".to_string()]), Err(FilterError::InvalidColumn(_))));
    }

    #[test]
    fn empty_patch_is_rejected() {
        let filter = Filter::new("debt").unwrap();
        assert!(matches!(filter.to_update_sql(&Map::new(), &[]), Err(FilterError::EmptyPatch)));
    }
}

use serde_json::Value;

use super::error::FilterError;
use super::filter::validate_identifier;
use crate::store::record::record_key;
use crate::store::{Condition, FilterOp};

/// Compiles store conditions into a WHERE clause.
///
/// Text values compare against `"column"::text` so the same condition works whether the
/// column is text, uuid, an enum or an integer id that a client sent as a string.
pub struct FilterWhere {
    param_values: Vec<Value>,
    param_index: usize,
}

impl FilterWhere {
    pub fn new(starting_param_index: usize) -> Self {
        Self {
            param_values: vec![],
            param_index: starting_param_index,
        }
    }

    /// Returns the clause (without the `WHERE` keyword, `1=1` when there is nothing to
    /// filter) and the values for `$starting_param_index+1..`.
    pub fn generate(conditions: &[Condition], starting_param_index: usize) -> Result<(String, Vec<Value>), FilterError> {
        let mut filter_where = Self::new(starting_param_index);
        let mut sql_conditions = Vec::with_capacity(conditions.len());
        for condition in conditions {
            sql_conditions.push(filter_where.build_sql_condition(condition)?);
        }
        let where_clause = if sql_conditions.is_empty() { "1=1".to_string() } else { sql_conditions.join(" AND ") };
        Ok((where_clause, filter_where.param_values))
    }

    fn build_sql_condition(&mut self, condition: &Condition) -> Result<String, FilterError> {
        validate_identifier(&condition.column).map_err(FilterError::InvalidColumn)?;
        let quoted_column = format!("\"{}\"", condition.column);

        match condition.op {
            FilterOp::Eq => Ok(self.equality(&quoted_column, &condition.value)),
            FilterOp::Gte => {
                if !condition.value.is_number() {
                    return Err(FilterError::InvalidOperatorData(format!(
                        "{} >= requires a number, got {}",
                        condition.column, condition.value
                    )));
                }
                Ok(format!("{} >= {}", quoted_column, self.param(condition.value.clone())))
            }
            FilterOp::In => {
                let Value::Array(values) = &condition.value else {
                    return Ok(self.equality(&quoted_column, &condition.value));
                };
                let values: Vec<&Value> = values.iter().filter(|v| !v.is_null()).collect();
                if values.is_empty() {
                    return Ok("1=0".to_string());
                }
                if values.iter().all(|v| v.is_number()) {
                    let params: Vec<String> = values.into_iter().map(|v| self.param(v.clone())).collect();
                    return Ok(format!("{} IN ({})", quoted_column, params.join(", ")));
                }
                let mut params = Vec::with_capacity(values.len());
                for value in values {
                    let text = record_key(value).ok_or_else(|| {
                        FilterError::InvalidOperatorData(format!("{} IN accepts scalars only, got {}", condition.column, value))
                    })?;
                    params.push(self.param(Value::String(text)));
                }
                Ok(format!("{}::text IN ({})", quoted_column, params.join(", ")))
            }
        }
    }

    fn equality(&mut self, quoted_column: &str, value: &Value) -> String {
        match value {
            Value::Null => format!("{} IS NULL", quoted_column),
            Value::Number(_) => format!("{} = {}", quoted_column, self.param(value.clone())),
            other => {
                let text = record_key(other).unwrap_or_else(|| other.to_string());
                format!("{}::text = {}", quoted_column, self.param(Value::String(text)))
            }
        }
    }

    fn param(&mut self, value: Value) -> String {
        self.param_values.push(value);
        self.param_index += 1;
        format!("${}", self.param_index)
    }
}

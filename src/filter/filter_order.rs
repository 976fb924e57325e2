use super::error::FilterError;
use super::filter::validate_identifier;
use crate::store::{Order, SortDirection};

pub struct FilterOrder;

impl FilterOrder {
    pub fn generate(orders: &[Order]) -> Result<String, FilterError> {
        if orders.is_empty() { return Ok(String::new()); }
        let mut parts = Vec::with_capacity(orders.len());
        for order in orders {
            validate_identifier(&order.column).map_err(FilterError::InvalidColumn)?;
            parts.push(format!("\"{}\" {}", order.column, Self::direction(order.direction)));
        }
        Ok(format!("ORDER BY {}", parts.join(", ")))
    }

    fn direction(direction: SortDirection) -> &'static str {
        match direction {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

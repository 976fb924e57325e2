// handlers/mod.rs - HTTP handlers grouped by resource
//
// debts/    listings and stage transitions (the core of the API)
// accounts, users, houses, login    thin passthroughs over the record store
// root      service info and health
pub mod accounts;
pub mod debts;
pub mod houses;
pub mod login;
pub mod root;
pub mod users;

use axum::Json;
use serde_json::Value;

/// Request body as JSON, or `null` when it is missing or unparseable. Handlers then
/// apply their own defaults and validation to the fields they read.
pub(crate) fn body_or_null(body: Option<Json<Value>>) -> Value {
    body.map(|Json(value)| value).unwrap_or(Value::Null)
}

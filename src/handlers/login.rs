use axum::{extract::State, Json};
use serde_json::Value;

use super::users::USERS_TABLE;
use crate::error::{ApiError, ApiResult};
use crate::handlers::body_or_null;
use crate::store::{Query, Record};
use crate::state::AppState;

const REJECTED: &str = "User not found";

/// POST /login - look up a user by `user_name` and `password`
///
/// Any failure, including a store error, answers 403 so callers cannot tell a missing
/// user from a broken store.
pub async fn login(State(state): State<AppState>, body: Option<Json<Value>>) -> ApiResult<Record> {
    let body = body_or_null(body);
    let (Some(user_name), Some(password)) = (
        body.get("user_name").and_then(Value::as_str),
        body.get("password").and_then(Value::as_str),
    ) else {
        return Err(ApiError::forbidden(REJECTED));
    };

    let query = Query::table(USERS_TABLE)
        .eq("user_name", user_name)
        .eq("password", password)
        .range(0, 0);

    match state.store().select(&query).await {
        Ok(rows) => rows.into_iter().next().map(Json).ok_or_else(|| ApiError::forbidden(REJECTED)),
        Err(e) => {
            tracing::error!("Login lookup failed: {}", e);
            Err(ApiError::forbidden(REJECTED))
        }
    }
}

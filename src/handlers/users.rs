use axum::{
    extract::{Path, State},
    Json,
};

use crate::error::{ApiError, ApiResult};
use crate::store::{Query, Record, SortDirection};
use crate::state::AppState;

pub const USERS_TABLE: &str = "users";

/// GET /users - every user
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<Record>> {
    let query = Query::table(USERS_TABLE).order_by("id", SortDirection::Asc);
    Ok(Json(state.store().select(&query).await?))
}

/// GET /users/:id - one user by id
pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Record> {
    if id.trim().is_empty() {
        return Err(ApiError::bad_request("User ID is required"));
    }

    let query = Query::table(USERS_TABLE).eq("id", id.as_str()).range(0, 0);
    let user = state
        .store()
        .select(&query)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| ApiError::not_found("User not found"))?;
    Ok(Json(user))
}

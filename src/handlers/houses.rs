use axum::{extract::State, Json};

use crate::error::ApiResult;
use crate::store::{Query, Record, SortDirection};
use crate::state::AppState;

/// GET /houses - every house
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<Record>> {
    let query = Query::table("houses").order_by("id", SortDirection::Asc);
    Ok(Json(state.store().select(&query).await?))
}

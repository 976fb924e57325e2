use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::Value;

use crate::debts::{ACCOUNTS_TABLE, DEBT_TABLE};
use crate::error::{ApiError, ApiResult};
use crate::models::Stage;
use crate::store::{Query, Record, SortDirection};
use crate::state::AppState;

/// GET /accounts - every account
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<Record>> {
    let query = Query::table(ACCOUNTS_TABLE).order_by("id", SortDirection::Asc);
    Ok(Json(state.store().select(&query).await?))
}

/// GET /accounts/:id - one account with its first new-stage debt as `active_debt`
pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Record> {
    let query = Query::table(ACCOUNTS_TABLE).eq("id", id.as_str()).range(0, 0);
    let mut account = state
        .store()
        .select(&query)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| ApiError::not_found("Account not found"))?;

    let debt_query = Query::table(DEBT_TABLE)
        .eq("account_id", id.as_str())
        .eq("stage", Stage::New.as_str())
        .range(0, 0);
    let active_debt = state
        .store()
        .select(&debt_query)
        .await?
        .into_iter()
        .next()
        .map(Value::Object)
        .unwrap_or(Value::Null);

    account.insert("active_debt".to_string(), active_debt);
    Ok(Json(account))
}

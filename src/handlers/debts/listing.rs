use axum::{extract::State, Json};
use serde_json::Value;

use crate::debts::{self, DebtPage, FilterCriteria, ListingProfile};
use crate::error::ApiResult;
use crate::handlers::body_or_null;
use crate::state::AppState;

/// POST /debts/candidates - accounts with candidate-stage debts, filtered by house,
/// minimum amount and term, combined with `filterMode`
pub async fn candidates(State(state): State<AppState>, body: Option<Json<Value>>) -> ApiResult<DebtPage> {
    run(&state, &ListingProfile::CANDIDATES, body_or_null(body)).await
}

/// POST /debts/new - accounts with new-stage debts, filtered by house only
pub async fn new(State(state): State<AppState>, body: Option<Json<Value>>) -> ApiResult<DebtPage> {
    run(&state, &ListingProfile::NEW, body_or_null(body)).await
}

async fn run(state: &AppState, profile: &ListingProfile, body: Value) -> ApiResult<DebtPage> {
    let criteria = FilterCriteria::parse(&body, profile)?;
    let page = debts::list(state.store(), profile, &criteria).await?;
    Ok(Json(page))
}

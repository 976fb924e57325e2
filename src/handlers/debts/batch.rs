use axum::{extract::State, Json};
use serde_json::Value;

use crate::debts::{self, TransitionOutcome};
use crate::error::BatchError;
use crate::handlers::body_or_null;
use crate::models::Stage;
use crate::state::AppState;

/// POST /debts/batch-to-new - move `accountIds` from candidates to new
pub async fn to_new(State(state): State<AppState>, body: Option<Json<Value>>) -> Result<Json<TransitionOutcome>, BatchError> {
    run(&state, body_or_null(body), Stage::New).await
}

/// POST /debts/batch-to-candidates - move `accountIds` from new back to candidates
pub async fn to_candidates(State(state): State<AppState>, body: Option<Json<Value>>) -> Result<Json<TransitionOutcome>, BatchError> {
    run(&state, body_or_null(body), Stage::Candidates).await
}

async fn run(state: &AppState, body: Value, to: Stage) -> Result<Json<TransitionOutcome>, BatchError> {
    let outcome = debts::transition(state.store(), body.get("accountIds"), to).await?;
    Ok(Json(outcome))
}

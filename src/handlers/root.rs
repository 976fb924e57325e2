use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET / - service name, version and endpoint map
pub async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "Debts API",
            "version": version,
            "description": "Debt listing and stage transition backend",
            "endpoints": {
                "home": "/",
                "health": "/health",
                "listings": "/debts/candidates, /debts/new (POST)",
                "transitions": "/debts/batch-to-new, /debts/batch-to-candidates (POST)",
                "accounts": "/accounts[/:id]",
                "users": "/users[/:id]",
                "houses": "/houses",
                "login": "/login (POST)",
            }
        }
    }))
}

/// GET /health - store reachability
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();
    let store = state.store();

    match store.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "store": store.kind()
                }
            })),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "success": false,
                "error": "store unavailable",
                "data": {
                    "status": "degraded",
                    "timestamp": now,
                    "store": store.kind(),
                    "store_error": e.to_string()
                }
            })),
        ),
    }
}

use std::any::Any;

use axum::{
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{Any as CorsAny, CorsLayer},
    trace::TraceLayer,
};

use crate::error::INTERNAL_ERROR_MESSAGE;
use crate::handlers;
use crate::state::AppState;

/// Full HTTP surface over the given state. `cors_origins` empty means any origin.
pub fn app(state: AppState, cors_origins: &[String]) -> Router {
    Router::new()
        // Public
        .route("/", get(handlers::root::root))
        .route("/health", get(handlers::root::health))
        .merge(debt_routes())
        .merge(collaborator_routes())
        .with_state(state)
        // Global middleware
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(cors_layer(cors_origins))
        .layer(TraceLayer::new_for_http())
}

fn debt_routes() -> Router<AppState> {
    use handlers::debts;

    Router::new()
        // Listings
        .route("/debts/candidates", post(debts::candidates))
        .route("/debts/new", post(debts::new))
        // Stage transitions
        .route("/debts/batch-to-new", post(debts::batch_to_new))
        .route("/debts/batch-to-candidates", post(debts::batch_to_candidates))
}

fn collaborator_routes() -> Router<AppState> {
    use handlers::{accounts, houses, login, users};

    Router::new()
        .route("/accounts", get(accounts::list))
        .route("/accounts/:id", get(accounts::get))
        .route("/users", get(users::list))
        .route("/users/:id", get(users::get))
        .route("/houses", get(houses::list))
        .route("/login", post(login::login))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(CorsAny)
        .allow_headers(CorsAny)
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    tracing::error!("Handler panicked: {}", detail);

    (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": INTERNAL_ERROR_MESSAGE }))).into_response()
}

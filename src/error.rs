// HTTP API error types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::debts::DebtError;
use crate::store::StoreError;

pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// HTTP API error with its status code and client-facing message
#[derive(Debug, Clone, PartialEq)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),

    // 403 Forbidden
    Forbidden(String),

    // 404 Not Found
    NotFound(String),

    // 500, store message passed through to the client
    Store(String),

    // 500, generic message only
    InternalServerError(String),

    // 503 Service Unavailable
    ServiceUnavailable(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg) => msg,
            ApiError::Forbidden(msg) => msg,
            ApiError::NotFound(msg) => msg,
            ApiError::Store(msg) => msg,
            ApiError::InternalServerError(msg) => msg,
            ApiError::ServiceUnavailable(msg) => msg,
        }
    }

    /// Response body. Login rejections use `message`, everything else `error`.
    pub fn to_json(&self) -> Value {
        match self {
            ApiError::Forbidden(msg) => json!({ "message": msg }),
            _ => json!({ "error": self.message() }),
        }
    }
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn internal_server_error() -> Self {
        ApiError::InternalServerError(INTERNAL_ERROR_MESSAGE.to_string())
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        ApiError::ServiceUnavailable(message.into())
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        tracing::error!("Store error: {}", err);
        ApiError::Store(err.to_string())
    }
}

impl From<DebtError> for ApiError {
    fn from(err: DebtError) -> Self {
        match err {
            DebtError::InvalidFilterMode | DebtError::EmptyAccountIds => ApiError::bad_request(err.to_string()),
            DebtError::Store(store_err) => store_err.into(),
            DebtError::MalformedRow { .. } => {
                // Don't expose row details to clients
                tracing::error!("{}", err);
                ApiError::internal_server_error()
            }
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status_code(), Json(self.to_json())).into_response()
    }
}

/// Error rendering for the batch endpoints, which answer `{ success: false, error }`.
#[derive(Debug)]
pub struct BatchError(pub ApiError);

impl From<ApiError> for BatchError {
    fn from(err: ApiError) -> Self {
        BatchError(err)
    }
}

impl From<DebtError> for BatchError {
    fn from(err: DebtError) -> Self {
        BatchError(err.into())
    }
}

impl IntoResponse for BatchError {
    fn into_response(self) -> axum::response::Response {
        let body = json!({ "success": false, "error": self.0.message() });
        (self.0.status_code(), Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<Json<T>, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_errors_map_to_400() {
        let err: ApiError = DebtError::InvalidFilterMode.into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_json(), json!({ "error": "filterMode must be 'all' or 'any'" }));
    }

    #[test]
    fn store_errors_pass_their_message_through() {
        let err: ApiError = DebtError::Store(StoreError::UnknownTable("debt".into())).into();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message(), "Unknown table: debt");
    }

    #[test]
    fn malformed_rows_are_hidden_behind_a_generic_message() {
        let err: ApiError = DebtError::MalformedRow { table: "debt", reason: "bad amount".into() }.into();
        assert_eq!(err.to_json(), json!({ "error": "Internal server error" }));
    }

    #[test]
    fn forbidden_uses_message_field() {
        assert_eq!(ApiError::forbidden("User not found").to_json(), json!({ "message": "User not found" }));
    }

    #[test]
    fn batch_errors_carry_success_false() {
        let err: BatchError = DebtError::EmptyAccountIds.into();
        assert_eq!(err.0.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.0.message(), "accountIds must be a non-empty array");
    }
}

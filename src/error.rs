// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::database::repository::RepositoryError;
use crate::services::ServiceError;

/// HTTP API error with appropriate status codes and client-friendly messages.
/// Every failure response renders as `{"error": "<message>"}`.
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    Validation(String),

    // 401 Unauthorized
    Unauthenticated(String),

    // 403 Forbidden
    Forbidden(String),

    // 404 Not Found
    NotFound(String),

    // 409 Conflict
    Conflict(String),

    // 500 Internal Server Error (suggestion provider failure, wrapped)
    UpstreamUnavailable(String),

    // 500 Internal Server Error
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::UpstreamUnavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ApiError::Validation(msg)
            | ApiError::Unauthenticated(msg)
            | ApiError::Forbidden(msg)
            | ApiError::NotFound(msg)
            | ApiError::Conflict(msg)
            | ApiError::UpstreamUnavailable(msg)
            | ApiError::Internal(msg) => msg,
        }
    }

    pub fn to_json(&self) -> Value {
        json!({ "error": self.message() })
    }
}

// Static constructor methods
impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation(message.into())
    }

    pub fn unauthenticated(message: impl Into<String>) -> Self {
        ApiError::Unauthenticated(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::Internal(message.into())
    }
}

/// Workflow errors carry business meaning; handlers translate each kind to
/// its HTTP status without re-interpreting it.
impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::InvalidInput | ServiceError::InvalidOrderStatus => {
                ApiError::Validation(err.to_string())
            }
            ServiceError::InvalidCredentials => ApiError::Unauthenticated(err.to_string()),
            ServiceError::UnauthorizedAccess => ApiError::Forbidden(err.to_string()),
            ServiceError::UserNotFound
            | ServiceError::OrderNotFound
            | ServiceError::FlagNotFound => ApiError::NotFound(err.to_string()),
            ServiceError::EmailExists => ApiError::Conflict(err.to_string()),
            ServiceError::SuggestionUnavailable(msg) => {
                tracing::error!("suggestion provider failure: {}", msg);
                ApiError::UpstreamUnavailable("failed to get AI suggestions".to_string())
            }
            ServiceError::Storage(store_err) => {
                // Don't expose internal storage errors to clients
                tracing::error!("storage error: {}", store_err);
                ApiError::internal("an error occurred while processing your request")
            }
            ServiceError::Internal(msg) => {
                tracing::error!("internal service error: {}", msg);
                ApiError::internal("an error occurred while processing your request")
            }
        }
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        tracing::error!("storage error: {}", err);
        ApiError::internal("an error occurred while processing your request")
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status_code(), Json(self.to_json())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::from(ServiceError::UnauthorizedAccess).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::from(ServiceError::OrderNotFound).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(ServiceError::EmailExists).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::from(ServiceError::InvalidOrderStatus).status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_storage_errors_are_not_leaked() {
        let err = ApiError::from(ServiceError::Storage(RepositoryError::NotFound));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.message().contains("not found"));
        assert_eq!(err.to_json(), serde_json::json!({"error": err.message()}));
    }

    #[test]
    fn test_invalid_credentials_message() {
        let err = ApiError::from(ServiceError::InvalidCredentials);
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(err.message(), "invalid email or password");
    }
}

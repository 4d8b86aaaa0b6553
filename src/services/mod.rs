use thiserror::Error;

use crate::database::repository::RepositoryError;

pub mod ai_service;
pub mod auth_service;
pub mod feature_flag_service;
pub mod order_service;
pub mod user_service;

pub use ai_service::{OpenAiSuggestionService, SuggestionError, SuggestionProvider};
pub use auth_service::{hash_password, AuthService, LoginResponse};
pub use feature_flag_service::FeatureFlagService;
pub use order_service::{
    CreateOrderRequest, OrderService, SuggestionRequest, UpdateOrderRequest,
};
pub use user_service::{CreateUserRequest, UpdateUserRequest, UserService};

/// Closed set of workflow failures. Handlers translate kinds to HTTP
/// statuses; no sentinel comparison, no re-interpretation of meaning.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("invalid input")]
    InvalidInput,

    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("user not found")]
    UserNotFound,

    #[error("email already exists")]
    EmailExists,

    #[error("order not found")]
    OrderNotFound,

    #[error("invalid order status")]
    InvalidOrderStatus,

    #[error("unauthorized to access this order")]
    UnauthorizedAccess,

    #[error("feature flag not found")]
    FlagNotFound,

    #[error("suggestions unavailable: {0}")]
    SuggestionUnavailable(String),

    #[error(transparent)]
    Storage(#[from] RepositoryError),

    #[error("internal error: {0}")]
    Internal(String),
}

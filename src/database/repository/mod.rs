use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::database::models::{FeatureFlag, Order, User};

pub mod feature_flags;
pub mod orders;
pub mod users;

pub use feature_flags::PgFeatureFlagRepository;
pub use orders::PgOrderRepository;
pub use users::PgUserRepository;

/// Errors from the persistence layer. Classified kinds are handled at the
/// workflow boundary; everything else is normalized to a generic internal
/// failure before it reaches a client.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("record not found")]
    NotFound,

    #[error("unique constraint violated: {0}")]
    Duplicate(String),

    #[error(transparent)]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for RepositoryError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => RepositoryError::NotFound,
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                RepositoryError::Duplicate(db.message().to_string())
            }
            _ => RepositoryError::Database(err),
        }
    }
}

/// Filter, sort, and pagination options for owner-scoped order queries.
/// Status and preference values are passed through to the store unvalidated;
/// sortable columns are whitelisted by the Postgres implementation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderFilters {
    pub status: Option<String>,
    pub delivery_preference: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub limit: i64,
    pub offset: i64,
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: &User) -> Result<(), RepositoryError>;
    async fn get_by_id(&self, id: Uuid) -> Result<Option<User>, RepositoryError>;
    async fn get_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError>;
    async fn update(&self, user: &User) -> Result<(), RepositoryError>;
    /// Soft delete: sets the tombstone, the row remains.
    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError>;
    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<User>, RepositoryError>;
    async fn count(&self) -> Result<i64, RepositoryError>;
}

#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn create(&self, order: &Order) -> Result<(), RepositoryError>;
    async fn get_by_id(&self, id: Uuid) -> Result<Option<Order>, RepositoryError>;
    async fn list_by_owner(
        &self,
        user_id: Uuid,
        filters: &OrderFilters,
    ) -> Result<Vec<Order>, RepositoryError>;
    async fn update(&self, order: &Order) -> Result<(), RepositoryError>;
}

#[async_trait]
pub trait FeatureFlagRepository: Send + Sync {
    async fn get_all(&self) -> Result<Vec<FeatureFlag>, RepositoryError>;
    async fn get_by_name(&self, name: &str) -> Result<Option<FeatureFlag>, RepositoryError>;
    async fn update(&self, flag: &FeatureFlag) -> Result<(), RepositoryError>;
}

use async_trait::async_trait;
use sqlx::PgPool;

use super::{FeatureFlagRepository, RepositoryError};
use crate::database::models::FeatureFlag;

pub struct PgFeatureFlagRepository {
    pool: PgPool,
}

impl PgFeatureFlagRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FeatureFlagRepository for PgFeatureFlagRepository {
    async fn get_all(&self) -> Result<Vec<FeatureFlag>, RepositoryError> {
        let flags = sqlx::query_as::<_, FeatureFlag>(
            "SELECT * FROM feature_flags WHERE deleted_at IS NULL ORDER BY name ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(flags)
    }

    async fn get_by_name(&self, name: &str) -> Result<Option<FeatureFlag>, RepositoryError> {
        let flag = sqlx::query_as::<_, FeatureFlag>(
            "SELECT * FROM feature_flags WHERE name = $1 AND deleted_at IS NULL",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(flag)
    }

    async fn update(&self, flag: &FeatureFlag) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            UPDATE feature_flags
            SET description = $2, enabled = $3, updated_at = $4
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(flag.id)
        .bind(&flag.description)
        .bind(flag.enabled)
        .bind(flag.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

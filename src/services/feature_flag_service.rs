use chrono::Utc;
use std::sync::Arc;

use super::ServiceError;
use crate::database::models::FeatureFlag;
use crate::database::repository::FeatureFlagRepository;

/// Read-mostly flag lookups; mutation is administrative only.
pub struct FeatureFlagService {
    flags: Arc<dyn FeatureFlagRepository>,
}

impl FeatureFlagService {
    pub fn new(flags: Arc<dyn FeatureFlagRepository>) -> Self {
        Self { flags }
    }

    pub async fn all_flags(&self) -> Result<Vec<FeatureFlag>, ServiceError> {
        Ok(self.flags.get_all().await?)
    }

    pub async fn flag_by_name(&self, name: &str) -> Result<FeatureFlag, ServiceError> {
        self.flags
            .get_by_name(name)
            .await?
            .ok_or(ServiceError::FlagNotFound)
    }

    /// Missing or unreadable flags read as disabled; this never errors.
    pub async fn is_enabled(&self, name: &str) -> bool {
        match self.flags.get_by_name(name).await {
            Ok(Some(flag)) => flag.enabled,
            _ => false,
        }
    }

    pub async fn update_flag(&self, name: &str, enabled: bool) -> Result<FeatureFlag, ServiceError> {
        let mut flag = self
            .flags
            .get_by_name(name)
            .await?
            .ok_or(ServiceError::FlagNotFound)?;

        flag.enabled = enabled;
        flag.updated_at = Utc::now();
        self.flags.update(&flag).await?;
        Ok(flag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::InMemoryFeatureFlagRepository;

    #[tokio::test]
    async fn test_is_enabled_defaults_to_false() {
        let repo = Arc::new(InMemoryFeatureFlagRepository::new());
        let service = FeatureFlagService::new(repo.clone());

        assert!(!service.is_enabled("nonexistent").await);

        repo.seed("ai_suggestions", "Enable AI order suggestions", true);
        assert!(service.is_enabled("ai_suggestions").await);
    }

    #[tokio::test]
    async fn test_flag_by_name() {
        let repo = Arc::new(InMemoryFeatureFlagRepository::new());
        repo.seed("dark_mode", "Dark theme", false);
        let service = FeatureFlagService::new(repo);

        let flag = service.flag_by_name("dark_mode").await.unwrap();
        assert!(!flag.enabled);

        let err = service.flag_by_name("missing").await.unwrap_err();
        assert!(matches!(err, ServiceError::FlagNotFound));
    }

    #[tokio::test]
    async fn test_update_flag_toggles() {
        let repo = Arc::new(InMemoryFeatureFlagRepository::new());
        repo.seed("dark_mode", "Dark theme", false);
        let service = FeatureFlagService::new(repo);

        let flag = service.update_flag("dark_mode", true).await.unwrap();
        assert!(flag.enabled);
        assert!(service.is_enabled("dark_mode").await);

        let err = service.update_flag("missing", true).await.unwrap_err();
        assert!(matches!(err, ServiceError::FlagNotFound));
    }
}

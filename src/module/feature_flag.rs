use async_trait::async_trait;
use axum::Router;
use sqlx::PgPool;
use std::sync::Arc;

use super::Module;
use crate::database::repository::PgFeatureFlagRepository;
use crate::handlers;
use crate::services::FeatureFlagService;

/// Read-only feature-flag surface.
#[derive(Default)]
pub struct FeatureFlagModule {
    flags: Option<Arc<FeatureFlagService>>,
}

impl FeatureFlagModule {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Module for FeatureFlagModule {
    fn name(&self) -> &'static str {
        "feature_flag"
    }

    async fn initialize(&mut self, pool: PgPool) -> anyhow::Result<()> {
        let repo = Arc::new(PgFeatureFlagRepository::new(pool));
        self.flags = Some(Arc::new(FeatureFlagService::new(repo)));
        Ok(())
    }

    fn register_routes(&self, router: Router) -> Router {
        let flags = self
            .flags
            .as_ref()
            .expect("initialize() must run before register_routes()");
        router.merge(handlers::feature_flags::routes(flags.clone()))
    }
}

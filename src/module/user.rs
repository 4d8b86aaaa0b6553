use async_trait::async_trait;
use axum::Router;
use sqlx::PgPool;
use std::sync::Arc;

use super::Module;
use crate::database::repository::PgUserRepository;
use crate::handlers;
use crate::services::UserService;

/// User account management endpoints.
#[derive(Default)]
pub struct UserModule {
    users: Option<Arc<UserService>>,
}

impl UserModule {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Module for UserModule {
    fn name(&self) -> &'static str {
        "user"
    }

    async fn initialize(&mut self, pool: PgPool) -> anyhow::Result<()> {
        let repo = Arc::new(PgUserRepository::new(pool));
        self.users = Some(Arc::new(UserService::new(repo)));
        Ok(())
    }

    fn register_routes(&self, router: Router) -> Router {
        let users = self
            .users
            .as_ref()
            .expect("initialize() must run before register_routes()");
        router.merge(handlers::users::routes(users.clone()))
    }
}

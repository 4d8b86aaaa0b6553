use async_trait::async_trait;
use axum::Router;
use sqlx::PgPool;
use std::sync::Arc;

use super::Module;
use crate::auth::JwtService;
use crate::config;
use crate::database::repository::PgUserRepository;
use crate::handlers;
use crate::services::AuthService;

/// Login and current-identity endpoints.
#[derive(Default)]
pub struct AuthModule {
    state: Option<AuthState>,
}

struct AuthState {
    auth: Arc<AuthService>,
    jwt: Arc<JwtService>,
}

impl AuthModule {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Module for AuthModule {
    fn name(&self) -> &'static str {
        "auth"
    }

    async fn initialize(&mut self, pool: PgPool) -> anyhow::Result<()> {
        let users = Arc::new(PgUserRepository::new(pool));
        let jwt = Arc::new(JwtService::new(&config::config().security));
        self.state = Some(AuthState {
            auth: Arc::new(AuthService::new(users, jwt.clone())),
            jwt,
        });
        Ok(())
    }

    fn register_routes(&self, router: Router) -> Router {
        let state = self
            .state
            .as_ref()
            .expect("initialize() must run before register_routes()");
        router.merge(handlers::auth::routes(state.auth.clone(), state.jwt.clone()))
    }
}

use async_trait::async_trait;
use axum::Router;
use sqlx::PgPool;
use std::sync::Arc;

use super::Module;
use crate::auth::JwtService;
use crate::config;
use crate::database::repository::PgOrderRepository;
use crate::handlers;
use crate::services::{OpenAiSuggestionService, OrderService};

/// Order lifecycle plus the public suggestions endpoint.
#[derive(Default)]
pub struct OrderModule {
    state: Option<OrderState>,
}

struct OrderState {
    orders: Arc<OrderService>,
    jwt: Arc<JwtService>,
}

impl OrderModule {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Module for OrderModule {
    fn name(&self) -> &'static str {
        "order"
    }

    async fn initialize(&mut self, pool: PgPool) -> anyhow::Result<()> {
        let cfg = config::config();
        let orders = Arc::new(PgOrderRepository::new(pool));
        let suggestions = Arc::new(OpenAiSuggestionService::new(&cfg.ai));
        self.state = Some(OrderState {
            orders: Arc::new(OrderService::new(orders, suggestions)),
            jwt: Arc::new(JwtService::new(&cfg.security)),
        });
        Ok(())
    }

    fn register_routes(&self, router: Router) -> Router {
        let state = self
            .state
            .as_ref()
            .expect("initialize() must run before register_routes()");
        router.merge(handlers::orders::routes(
            state.orders.clone(),
            state.jwt.clone(),
        ))
    }
}

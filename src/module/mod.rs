use async_trait::async_trait;
use axum::{routing::get, Json, Router};
use serde_json::{json, Value};
use sqlx::PgPool;
use thiserror::Error;

pub mod auth;
pub mod feature_flag;
pub mod order;
pub mod user;

pub use auth::AuthModule;
pub use feature_flag::FeatureFlagModule;
pub use order::OrderModule;
pub use user::UserModule;

#[derive(Debug, Error)]
pub enum ModuleError {
    #[error("module {module} failed to initialize: {source}")]
    Init {
        module: &'static str,
        #[source]
        source: anyhow::Error,
    },
}

/// One independently initializable bundle of a business capability's
/// services and routes.
///
/// `initialize` wires the module's persistence-backed services from the
/// shared pool without performing I/O beyond object construction;
/// `register_routes` binds the module's routes onto the shared router.
/// The registry guarantees `initialize` has succeeded for every module
/// before any `register_routes` call is made.
#[async_trait]
pub trait Module: Send + Sync {
    /// Stable identifier used for diagnostics only; uniqueness across
    /// modules is not enforced.
    fn name(&self) -> &'static str;

    async fn initialize(&mut self, pool: PgPool) -> anyhow::Result<()>;

    fn register_routes(&self, router: Router) -> Router;
}

/// Composition root. Modules are registered in order; registration order is
/// route-binding order, and later bindings can shadow earlier path prefixes.
#[derive(Default)]
pub struct ModuleRegistry {
    modules: Vec<Box<dyn Module>>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, module: Box<dyn Module>) {
        tracing::debug!(module = module.name(), "module registered");
        self.modules.push(module);
    }

    /// Two-phase startup: every module is wired before a single route is
    /// bound, so a failure in one module's wiring never leaves the router
    /// partially exposed with half-initialized handlers.
    pub async fn initialize(&mut self, pool: PgPool) -> Result<Router, ModuleError> {
        for module in self.modules.iter_mut() {
            let name = module.name();
            module
                .initialize(pool.clone())
                .await
                .map_err(|source| ModuleError::Init { module: name, source })?;
            tracing::info!(module = name, "module initialized");
        }

        let mut router = Router::new().route("/health", get(health));
        for module in self.modules.iter() {
            router = module.register_routes(router);
        }
        Ok(router)
    }
}

/// Liveness probe; always 200 regardless of downstream health.
async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

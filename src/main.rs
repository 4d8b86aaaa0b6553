use tower_http::{cors::CorsLayer, trace::TraceLayer};

use medcart_api::config;
use medcart_api::database;
use medcart_api::module::{
    AuthModule, FeatureFlagModule, ModuleRegistry, OrderModule, UserModule,
};

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = config::config();
    if config.security.uses_default_jwt_secret() {
        tracing::warn!(
            "JWT_SECRET not set; tokens are signed with the insecure default secret - unsafe for production"
        );
    }

    let pool = match database::connect(&config.database).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("failed to connect to database: {}", e);
            std::process::exit(1);
        }
    };

    // Registration order is route-binding order.
    let mut registry = ModuleRegistry::new();
    registry.register(Box::new(FeatureFlagModule::new()));
    registry.register(Box::new(AuthModule::new()));
    registry.register(Box::new(OrderModule::new()));
    registry.register(Box::new(UserModule::new()));

    let app = match registry.initialize(pool).await {
        Ok(router) => router,
        Err(e) => {
            tracing::error!("failed to initialize application: {}", e);
            std::process::exit(1);
        }
    };

    // Global middleware
    let app = app
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    tracing::info!("medcart API listening on http://{}", bind_addr);

    axum::serve(listener, app).await.expect("server");
}

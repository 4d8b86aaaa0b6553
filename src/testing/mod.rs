//! Test doubles and router harness: in-memory repositories standing in for
//! the Postgres-backed ones, plus helpers for driving the composed router
//! in-process.

use async_trait::async_trait;
use axum::body::Body;
use axum::http::Request;
use axum::response::Response;
use axum::Router;
use chrono::Utc;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::JwtService;
use crate::config::SecurityConfig;
use crate::database::models::{FeatureFlag, Order, SuggestedItem, User};
use crate::database::repository::{
    FeatureFlagRepository, OrderFilters, OrderRepository, RepositoryError, UserRepository,
};
use crate::handlers;
use crate::services::{
    hash_password, AuthService, FeatureFlagService, OrderService, SuggestionError,
    SuggestionProvider, UserService,
};

const TEST_JWT_SECRET: &str = "test-suite-secret";

// ---------------------------------------------------------------------------
// Suggestion provider doubles

/// Always returns an empty list; stands in for an unconfigured adapter.
pub struct NoSuggestions;

#[async_trait]
impl SuggestionProvider for NoSuggestions {
    async fn suggest(
        &self,
        _summary: &str,
        _address: Option<&str>,
    ) -> Result<Vec<SuggestedItem>, SuggestionError> {
        Ok(Vec::new())
    }
}

/// Always fails, as a provider with a broken upstream would.
pub struct FailingSuggestionProvider;

#[async_trait]
impl SuggestionProvider for FailingSuggestionProvider {
    async fn suggest(
        &self,
        _summary: &str,
        _address: Option<&str>,
    ) -> Result<Vec<SuggestedItem>, SuggestionError> {
        Err(SuggestionError::Upstream("provider unreachable".to_string()))
    }
}

// ---------------------------------------------------------------------------
// In-memory repositories

#[derive(Default)]
pub struct InMemoryUserRepository {
    rows: Mutex<HashMap<Uuid, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: &User) -> Result<(), RepositoryError> {
        let mut rows = self.rows.lock().unwrap();
        // Mimic the store's unique email index.
        if rows
            .values()
            .any(|u| u.email == user.email && u.deleted_at.is_none())
        {
            return Err(RepositoryError::Duplicate(user.email.clone()));
        }
        rows.insert(user.id, user.clone());
        Ok(())
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<User>, RepositoryError> {
        let rows = self.rows.lock().unwrap();
        Ok(rows.get(&id).filter(|u| u.deleted_at.is_none()).cloned())
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .values()
            .find(|u| u.email == email && u.deleted_at.is_none())
            .cloned())
    }

    async fn update(&self, user: &User) -> Result<(), RepositoryError> {
        self.rows.lock().unwrap().insert(user.id, user.clone());
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
        if let Some(user) = self.rows.lock().unwrap().get_mut(&id) {
            user.deleted_at = Some(Utc::now());
        }
        Ok(())
    }

    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<User>, RepositoryError> {
        let rows = self.rows.lock().unwrap();
        let mut users: Vec<User> = rows
            .values()
            .filter(|u| u.deleted_at.is_none())
            .cloned()
            .collect();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(users
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn count(&self) -> Result<i64, RepositoryError> {
        let rows = self.rows.lock().unwrap();
        Ok(rows.values().filter(|u| u.deleted_at.is_none()).count() as i64)
    }
}

#[derive(Default)]
pub struct InMemoryOrderRepository {
    rows: Mutex<HashMap<Uuid, Order>>,
    last_filters: Mutex<Option<OrderFilters>>,
}

impl InMemoryOrderRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Filters the most recent `list_by_owner` call was made with.
    pub fn last_filters(&self) -> Option<OrderFilters> {
        self.last_filters.lock().unwrap().clone()
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn create(&self, order: &Order) -> Result<(), RepositoryError> {
        self.rows.lock().unwrap().insert(order.id, order.clone());
        Ok(())
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<Order>, RepositoryError> {
        let rows = self.rows.lock().unwrap();
        Ok(rows.get(&id).filter(|o| o.deleted_at.is_none()).cloned())
    }

    async fn list_by_owner(
        &self,
        user_id: Uuid,
        filters: &OrderFilters,
    ) -> Result<Vec<Order>, RepositoryError> {
        *self.last_filters.lock().unwrap() = Some(filters.clone());

        let rows = self.rows.lock().unwrap();
        let mut orders: Vec<Order> = rows
            .values()
            .filter(|o| o.user_id == user_id && o.deleted_at.is_none())
            .cloned()
            .collect();

        if let Some(status) = filters.status.as_deref().filter(|s| !s.is_empty()) {
            orders.retain(|o| o.status.as_str() == status);
        }
        if let Some(pref) = filters.delivery_preference.as_deref().filter(|p| !p.is_empty()) {
            orders.retain(|o| o.delivery_preference.as_str() == pref);
        }

        match filters.sort_by.as_deref() {
            Some("updated_at") => orders.sort_by(|a, b| a.updated_at.cmp(&b.updated_at)),
            _ => orders.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
        }
        if filters.sort_order.as_deref() != Some("asc") {
            orders.reverse();
        }

        let limit = if filters.limit > 0 {
            filters.limit as usize
        } else {
            usize::MAX
        };
        Ok(orders
            .into_iter()
            .skip(filters.offset.max(0) as usize)
            .take(limit)
            .collect())
    }

    async fn update(&self, order: &Order) -> Result<(), RepositoryError> {
        self.rows.lock().unwrap().insert(order.id, order.clone());
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryFeatureFlagRepository {
    rows: Mutex<HashMap<Uuid, FeatureFlag>>,
}

impl InMemoryFeatureFlagRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&self, name: &str, description: &str, enabled: bool) {
        let now = Utc::now();
        let flag = FeatureFlag {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: description.to_string(),
            enabled,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        self.rows.lock().unwrap().insert(flag.id, flag);
    }
}

#[async_trait]
impl FeatureFlagRepository for InMemoryFeatureFlagRepository {
    async fn get_all(&self) -> Result<Vec<FeatureFlag>, RepositoryError> {
        let rows = self.rows.lock().unwrap();
        let mut flags: Vec<FeatureFlag> = rows
            .values()
            .filter(|f| f.deleted_at.is_none())
            .cloned()
            .collect();
        flags.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(flags)
    }

    async fn get_by_name(&self, name: &str) -> Result<Option<FeatureFlag>, RepositoryError> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .values()
            .find(|f| f.name == name && f.deleted_at.is_none())
            .cloned())
    }

    async fn update(&self, flag: &FeatureFlag) -> Result<(), RepositoryError> {
        self.rows.lock().unwrap().insert(flag.id, flag.clone());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Router harness

pub struct TestApp {
    pub router: Router,
    pub users: Arc<InMemoryUserRepository>,
    pub orders: Arc<InMemoryOrderRepository>,
    pub flags: Arc<InMemoryFeatureFlagRepository>,
    pub jwt: Arc<JwtService>,
}

/// Full route surface composed over in-memory repositories, mirroring the
/// production module registration order.
pub async fn test_app() -> TestApp {
    let users = Arc::new(InMemoryUserRepository::new());
    let orders = Arc::new(InMemoryOrderRepository::new());
    let flags = Arc::new(InMemoryFeatureFlagRepository::new());
    let jwt = Arc::new(JwtService::new(&SecurityConfig {
        jwt_secret: TEST_JWT_SECRET.to_string(),
        jwt_expiry_hours: 24,
    }));

    let flag_service = Arc::new(FeatureFlagService::new(flags.clone()));
    let auth_service = Arc::new(AuthService::new(users.clone(), jwt.clone()));
    let order_service = Arc::new(OrderService::new(orders.clone(), Arc::new(NoSuggestions)));
    let user_service = Arc::new(UserService::new(users.clone()));

    let router = Router::new()
        .merge(handlers::feature_flags::routes(flag_service))
        .merge(handlers::auth::routes(auth_service, jwt.clone()))
        .merge(handlers::orders::routes(order_service, jwt.clone()))
        .merge(handlers::users::routes(user_service));

    TestApp {
        router,
        users,
        orders,
        flags,
        jwt,
    }
}

impl TestApp {
    pub async fn seed_user(&self, email: &str, password: &str) -> User {
        let user = User::new(
            email.to_string(),
            hash_password(password).unwrap(),
            "Test".to_string(),
            "User".to_string(),
        );
        self.users.create(&user).await.unwrap();
        user
    }

    /// Seed a user and return a valid bearer token for them.
    pub async fn login_user(&self, email: &str) -> String {
        let user = self.seed_user(email, "pass-123456").await;
        self.jwt.issue(user.id, &user.email).unwrap()
    }

    /// A structurally valid token whose expiry is already in the past.
    pub fn expired_token(&self, user_id: Uuid, email: &str) -> String {
        use jsonwebtoken::{encode, EncodingKey, Header};

        let now = Utc::now();
        let claims = crate::auth::Claims {
            user_id,
            email: email.to_string(),
            iat: (now - chrono::Duration::hours(48)).timestamp(),
            nbf: (now - chrono::Duration::hours(48)).timestamp(),
            exp: (now - chrono::Duration::hours(24)).timestamp(),
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(TEST_JWT_SECRET.as_bytes()),
        )
        .unwrap()
    }
}

// ---------------------------------------------------------------------------
// Request/response helpers

pub fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn authed_json_request(method: &str, uri: &str, token: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {}", token))
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn get_request(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

pub async fn body_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

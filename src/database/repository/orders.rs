use async_trait::async_trait;
use sqlx::{PgPool, QueryBuilder};
use uuid::Uuid;

use super::{OrderFilters, OrderRepository, RepositoryError};
use crate::database::models::Order;

/// Columns the list query may sort by. Anything else falls back to
/// `created_at` rather than being interpolated into the query.
const SORTABLE_COLUMNS: &[&str] = &["created_at", "updated_at", "status", "delivery_preference"];

pub struct PgOrderRepository {
    pool: PgPool,
}

impl PgOrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn sort_column(filters: &OrderFilters) -> &str {
    match filters.sort_by.as_deref() {
        Some(col) if SORTABLE_COLUMNS.contains(&col) => col,
        _ => "created_at",
    }
}

/// Only the literal `asc` sorts ascending; every other value, including
/// absence, resolves to descending.
fn sort_direction(filters: &OrderFilters) -> &'static str {
    match filters.sort_order.as_deref() {
        Some("asc") => "ASC",
        _ => "DESC",
    }
}

#[async_trait]
impl OrderRepository for PgOrderRepository {
    async fn create(&self, order: &Order) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO orders (id, user_id, summary, delivery_preference, delivery_address,
                                postal_code, suggested_items, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(order.id)
        .bind(order.user_id)
        .bind(&order.summary)
        .bind(order.delivery_preference.as_str())
        .bind(&order.delivery_address)
        .bind(&order.postal_code)
        .bind(&order.suggested_items)
        .bind(order.status.as_str())
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<Order>, RepositoryError> {
        let order = sqlx::query_as::<_, Order>(
            "SELECT * FROM orders WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(order)
    }

    async fn list_by_owner(
        &self,
        user_id: Uuid,
        filters: &OrderFilters,
    ) -> Result<Vec<Order>, RepositoryError> {
        let mut query = QueryBuilder::new(
            "SELECT * FROM orders WHERE deleted_at IS NULL AND user_id = ",
        );
        query.push_bind(user_id);

        if let Some(status) = filters.status.as_deref().filter(|s| !s.is_empty()) {
            query.push(" AND status = ");
            query.push_bind(status.to_string());
        }
        if let Some(pref) = filters.delivery_preference.as_deref().filter(|p| !p.is_empty()) {
            query.push(" AND delivery_preference = ");
            query.push_bind(pref.to_string());
        }

        query.push(format!(
            " ORDER BY {} {}",
            sort_column(filters),
            sort_direction(filters)
        ));

        if filters.limit > 0 {
            query.push(" LIMIT ");
            query.push_bind(filters.limit);
        }
        if filters.offset > 0 {
            query.push(" OFFSET ");
            query.push_bind(filters.offset);
        }

        let orders = query
            .build_query_as::<Order>()
            .fetch_all(&self.pool)
            .await?;
        Ok(orders)
    }

    async fn update(&self, order: &Order) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            UPDATE orders
            SET summary = $2, delivery_preference = $3, delivery_address = $4,
                postal_code = $5, suggested_items = $6, status = $7, updated_at = $8
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(order.id)
        .bind(&order.summary)
        .bind(order.delivery_preference.as_str())
        .bind(&order.delivery_address)
        .bind(&order.postal_code)
        .bind(&order.suggested_items)
        .bind(order.status.as_str())
        .bind(order.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use super::{ServiceError, SuggestionProvider};
use crate::database::models::{DeliveryPreference, Order, OrderStatus, SuggestedItem};
use crate::database::repository::{OrderFilters, OrderRepository};

const DEFAULT_LIST_LIMIT: i64 = 100;

#[derive(Debug, Clone, Deserialize)]
pub struct CreateOrderRequest {
    pub summary: String,
    pub delivery_preference: String,
    pub delivery_address: Option<String>,
    pub postal_code: Option<String>,
    /// Items the caller pre-selected from an earlier suggestion round.
    pub selected_items: Option<Vec<SuggestedItem>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateOrderRequest {
    pub status: Option<String>,
    pub suggested_items: Option<Vec<SuggestedItem>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SuggestionRequest {
    pub summary: String,
    pub delivery_address: Option<String>,
}

/// Owns order validation, ownership checks, and status transitions. All
/// order mutation goes through here; handlers never touch the store.
pub struct OrderService {
    orders: Arc<dyn OrderRepository>,
    suggestions: Arc<dyn SuggestionProvider>,
}

impl OrderService {
    pub fn new(orders: Arc<dyn OrderRepository>, suggestions: Arc<dyn SuggestionProvider>) -> Self {
        Self {
            orders,
            suggestions,
        }
    }

    pub async fn ai_suggestions(
        &self,
        req: &SuggestionRequest,
    ) -> Result<Vec<SuggestedItem>, ServiceError> {
        self.suggestions
            .suggest(&req.summary, req.delivery_address.as_deref())
            .await
            .map_err(|e| ServiceError::SuggestionUnavailable(e.to_string()))
    }

    pub async fn create_order(
        &self,
        user_id: Uuid,
        req: CreateOrderRequest,
    ) -> Result<Order, ServiceError> {
        if req.summary.is_empty() {
            return Err(ServiceError::InvalidInput);
        }

        let preference = DeliveryPreference::parse(&req.delivery_preference)
            .ok_or(ServiceError::InvalidInput)?;

        // Home delivery is the only preference that needs somewhere to go.
        if preference == DeliveryPreference::Delivery
            && req.delivery_address.as_deref().unwrap_or("").is_empty()
        {
            return Err(ServiceError::InvalidInput);
        }

        let now = Utc::now();
        let mut order = Order {
            id: Uuid::new_v4(),
            user_id,
            summary: req.summary,
            delivery_preference: preference,
            delivery_address: req.delivery_address,
            postal_code: req.postal_code,
            suggested_items: None,
            status: OrderStatus::Pending,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };

        if let Some(items) = &req.selected_items {
            order
                .set_suggested_items(items)
                .map_err(|_| ServiceError::InvalidInput)?;
        }

        self.orders.create(&order).await?;
        Ok(order)
    }

    pub async fn list_orders(
        &self,
        user_id: Uuid,
        mut filters: OrderFilters,
    ) -> Result<Vec<Order>, ServiceError> {
        if filters.limit == 0 {
            filters.limit = DEFAULT_LIST_LIMIT;
        }
        Ok(self.orders.list_by_owner(user_id, &filters).await?)
    }

    pub async fn get_order(&self, order_id: Uuid, user_id: Uuid) -> Result<Order, ServiceError> {
        let order = self
            .orders
            .get_by_id(order_id)
            .await?
            .ok_or(ServiceError::OrderNotFound)?;

        // Owner mismatch is reported as forbidden, not masked as not-found.
        if order.user_id != user_id {
            return Err(ServiceError::UnauthorizedAccess);
        }
        Ok(order)
    }

    pub async fn update_order(
        &self,
        order_id: Uuid,
        user_id: Uuid,
        req: UpdateOrderRequest,
    ) -> Result<Order, ServiceError> {
        let mut order = self
            .orders
            .get_by_id(order_id)
            .await?
            .ok_or(ServiceError::OrderNotFound)?;

        if order.user_id != user_id {
            return Err(ServiceError::UnauthorizedAccess);
        }

        if let Some(status) = &req.status {
            order.status = OrderStatus::parse(status).ok_or(ServiceError::InvalidOrderStatus)?;
        }

        if let Some(items) = &req.suggested_items {
            order
                .set_suggested_items(items)
                .map_err(|_| ServiceError::InvalidInput)?;
        }

        order.updated_at = Utc::now();
        self.orders.update(&order).await?;
        Ok(order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FailingSuggestionProvider, InMemoryOrderRepository, NoSuggestions};

    fn service_with(repo: Arc<InMemoryOrderRepository>) -> OrderService {
        OrderService::new(repo, Arc::new(NoSuggestions))
    }

    fn delivery_request() -> CreateOrderRequest {
        CreateOrderRequest {
            summary: "weekly refill of blood pressure medication".to_string(),
            delivery_preference: "DELIVERY".to_string(),
            delivery_address: Some("123 Main St, Springfield".to_string()),
            postal_code: Some("12345".to_string()),
            selected_items: None,
        }
    }

    #[tokio::test]
    async fn test_create_delivery_order() {
        let repo = Arc::new(InMemoryOrderRepository::new());
        let service = service_with(repo.clone());
        let user_id = Uuid::new_v4();

        let order = service.create_order(user_id, delivery_request()).await.unwrap();

        assert_eq!(order.user_id, user_id);
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.delivery_preference, DeliveryPreference::Delivery);
        assert_eq!(order.delivery_address.as_deref(), Some("123 Main St, Springfield"));
        assert!(repo.get_by_id(order.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_create_in_store_order_without_address() {
        let service = service_with(Arc::new(InMemoryOrderRepository::new()));

        let order = service
            .create_order(
                Uuid::new_v4(),
                CreateOrderRequest {
                    delivery_preference: "IN_STORE".to_string(),
                    delivery_address: None,
                    ..delivery_request()
                },
            )
            .await
            .unwrap();

        assert_eq!(order.delivery_preference, DeliveryPreference::InStore);
        assert!(order.delivery_address.is_none());
    }

    #[tokio::test]
    async fn test_create_curbside_order_without_address() {
        let service = service_with(Arc::new(InMemoryOrderRepository::new()));

        let order = service
            .create_order(
                Uuid::new_v4(),
                CreateOrderRequest {
                    delivery_preference: "CURBSIDE".to_string(),
                    delivery_address: None,
                    ..delivery_request()
                },
            )
            .await
            .unwrap();

        assert_eq!(order.delivery_preference, DeliveryPreference::Curbside);
    }

    #[tokio::test]
    async fn test_create_delivery_order_requires_address() {
        let service = service_with(Arc::new(InMemoryOrderRepository::new()));

        for address in [None, Some(String::new())] {
            let err = service
                .create_order(
                    Uuid::new_v4(),
                    CreateOrderRequest {
                        delivery_address: address,
                        ..delivery_request()
                    },
                )
                .await
                .unwrap_err();
            assert!(matches!(err, ServiceError::InvalidInput));
        }
    }

    #[tokio::test]
    async fn test_create_order_rejects_empty_summary() {
        let service = service_with(Arc::new(InMemoryOrderRepository::new()));

        let err = service
            .create_order(
                Uuid::new_v4(),
                CreateOrderRequest {
                    summary: String::new(),
                    ..delivery_request()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput));
    }

    #[tokio::test]
    async fn test_create_order_rejects_unknown_preference() {
        let service = service_with(Arc::new(InMemoryOrderRepository::new()));

        let err = service
            .create_order(
                Uuid::new_v4(),
                CreateOrderRequest {
                    delivery_preference: "INVALID".to_string(),
                    ..delivery_request()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput));
    }

    #[tokio::test]
    async fn test_create_order_normalizes_empty_selection() {
        let service = service_with(Arc::new(InMemoryOrderRepository::new()));

        let order = service
            .create_order(
                Uuid::new_v4(),
                CreateOrderRequest {
                    selected_items: Some(Vec::new()),
                    ..delivery_request()
                },
            )
            .await
            .unwrap();

        assert!(order.suggested_items.is_none());
    }

    #[tokio::test]
    async fn test_create_order_stores_selected_items() {
        let service = service_with(Arc::new(InMemoryOrderRepository::new()));
        let items = vec![SuggestedItem {
            name: "Lisinopril 10mg".to_string(),
            quantity: 1,
            price: 12.50,
            reason: None,
        }];

        let order = service
            .create_order(
                Uuid::new_v4(),
                CreateOrderRequest {
                    selected_items: Some(items.clone()),
                    ..delivery_request()
                },
            )
            .await
            .unwrap();

        assert_eq!(order.suggested_items().unwrap(), items);
    }

    #[tokio::test]
    async fn test_get_order_ownership() {
        let repo = Arc::new(InMemoryOrderRepository::new());
        let service = service_with(repo.clone());
        let owner = Uuid::new_v4();
        let stranger = Uuid::new_v4();

        let order = service.create_order(owner, delivery_request()).await.unwrap();

        let fetched = service.get_order(order.id, owner).await.unwrap();
        assert_eq!(fetched.id, order.id);

        // Wrong owner is forbidden, never masked as not-found.
        let err = service.get_order(order.id, stranger).await.unwrap_err();
        assert!(matches!(err, ServiceError::UnauthorizedAccess));

        let err = service.get_order(Uuid::new_v4(), owner).await.unwrap_err();
        assert!(matches!(err, ServiceError::OrderNotFound));
    }

    #[tokio::test]
    async fn test_update_order_status() {
        let repo = Arc::new(InMemoryOrderRepository::new());
        let service = service_with(repo.clone());
        let owner = Uuid::new_v4();
        let order = service.create_order(owner, delivery_request()).await.unwrap();

        let updated = service
            .update_order(
                order.id,
                owner,
                UpdateOrderRequest {
                    status: Some("completed".to_string()),
                    suggested_items: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.status, OrderStatus::Completed);
        let stored = repo.get_by_id(order.id).await.unwrap().unwrap();
        assert_eq!(stored.status, OrderStatus::Completed);
    }

    #[tokio::test]
    async fn test_update_order_rejects_unknown_status() {
        let service = service_with(Arc::new(InMemoryOrderRepository::new()));
        let owner = Uuid::new_v4();
        let order = service.create_order(owner, delivery_request()).await.unwrap();

        let err = service
            .update_order(
                order.id,
                owner,
                UpdateOrderRequest {
                    status: Some("shipped".to_string()),
                    suggested_items: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidOrderStatus));
    }

    #[tokio::test]
    async fn test_update_order_checks_ownership() {
        let service = service_with(Arc::new(InMemoryOrderRepository::new()));
        let order = service
            .create_order(Uuid::new_v4(), delivery_request())
            .await
            .unwrap();

        let err = service
            .update_order(
                order.id,
                Uuid::new_v4(),
                UpdateOrderRequest {
                    status: Some("completed".to_string()),
                    suggested_items: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::UnauthorizedAccess));
    }

    #[tokio::test]
    async fn test_update_replaces_items_wholesale() {
        let service = service_with(Arc::new(InMemoryOrderRepository::new()));
        let owner = Uuid::new_v4();
        let first = vec![SuggestedItem {
            name: "Vitamin D".to_string(),
            quantity: 1,
            price: 8.0,
            reason: None,
        }];
        let order = service
            .create_order(
                owner,
                CreateOrderRequest {
                    selected_items: Some(first),
                    ..delivery_request()
                },
            )
            .await
            .unwrap();

        let second = vec![
            SuggestedItem {
                name: "Zinc".to_string(),
                quantity: 2,
                price: 5.0,
                reason: None,
            },
            SuggestedItem {
                name: "Vitamin C".to_string(),
                quantity: 1,
                price: 4.0,
                reason: None,
            },
        ];
        let updated = service
            .update_order(
                order.id,
                owner,
                UpdateOrderRequest {
                    status: None,
                    suggested_items: Some(second.clone()),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.suggested_items().unwrap(), second);

        // Replacing with an empty list clears the field entirely.
        let cleared = service
            .update_order(
                order.id,
                owner,
                UpdateOrderRequest {
                    status: None,
                    suggested_items: Some(Vec::new()),
                },
            )
            .await
            .unwrap();
        assert!(cleared.suggested_items.is_none());
    }

    #[tokio::test]
    async fn test_list_orders_defaults_limit() {
        let repo = Arc::new(InMemoryOrderRepository::new());
        let service = service_with(repo.clone());
        let owner = Uuid::new_v4();

        service.list_orders(owner, OrderFilters::default()).await.unwrap();
        assert_eq!(repo.last_filters().unwrap().limit, 100);

        service
            .list_orders(
                owner,
                OrderFilters {
                    limit: 25,
                    ..OrderFilters::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(repo.last_filters().unwrap().limit, 25);
    }

    #[tokio::test]
    async fn test_list_orders_scoped_to_owner() {
        let repo = Arc::new(InMemoryOrderRepository::new());
        let service = service_with(repo.clone());
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();

        service.create_order(alice, delivery_request()).await.unwrap();
        service.create_order(alice, delivery_request()).await.unwrap();
        service.create_order(bob, delivery_request()).await.unwrap();

        let orders = service.list_orders(alice, OrderFilters::default()).await.unwrap();
        assert_eq!(orders.len(), 2);
        assert!(orders.iter().all(|o| o.user_id == alice));
    }

    #[tokio::test]
    async fn test_suggestions_pass_through_disabled_provider() {
        let service = service_with(Arc::new(InMemoryOrderRepository::new()));
        let items = service
            .ai_suggestions(&SuggestionRequest {
                summary: "something for hay fever".to_string(),
                delivery_address: None,
            })
            .await
            .unwrap();
        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn test_suggestions_surface_provider_failure() {
        let service = OrderService::new(
            Arc::new(InMemoryOrderRepository::new()),
            Arc::new(FailingSuggestionProvider),
        );
        let err = service
            .ai_suggestions(&SuggestionRequest {
                summary: "something for hay fever".to_string(),
                delivery_address: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::SuggestionUnavailable(_)));
    }
}

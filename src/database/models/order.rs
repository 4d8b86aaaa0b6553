use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Processing,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(OrderStatus::Pending),
            "processing" => Some(OrderStatus::Processing),
            "completed" => Some(OrderStatus::Completed),
            "cancelled" => Some(OrderStatus::Cancelled),
            _ => None,
        }
    }
}

impl TryFrom<String> for OrderStatus {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        OrderStatus::parse(&value).ok_or_else(|| format!("unknown order status: {}", value))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeliveryPreference {
    #[serde(rename = "IN_STORE")]
    InStore,
    #[serde(rename = "DELIVERY")]
    Delivery,
    #[serde(rename = "CURBSIDE")]
    Curbside,
}

impl DeliveryPreference {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryPreference::InStore => "IN_STORE",
            DeliveryPreference::Delivery => "DELIVERY",
            DeliveryPreference::Curbside => "CURBSIDE",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "IN_STORE" => Some(DeliveryPreference::InStore),
            "DELIVERY" => Some(DeliveryPreference::Delivery),
            "CURBSIDE" => Some(DeliveryPreference::Curbside),
            _ => None,
        }
    }
}

impl TryFrom<String> for DeliveryPreference {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        DeliveryPreference::parse(&value)
            .ok_or_else(|| format!("unknown delivery preference: {}", value))
    }
}

/// One candidate line item, either AI-suggested or user-selected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestedItem {
    pub name: String,
    pub quantity: i32,
    pub price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    pub summary: String,
    #[sqlx(try_from = "String")]
    pub delivery_preference: DeliveryPreference,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    /// Serialized JSON list of [`SuggestedItem`]s. `None` means the order
    /// carries no suggestions; an empty list is never stored.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_items: Option<String>,
    #[sqlx(try_from = "String")]
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing, default)]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Order {
    pub fn suggested_items(&self) -> Result<Vec<SuggestedItem>, serde_json::Error> {
        match self.suggested_items.as_deref() {
            None | Some("") => Ok(Vec::new()),
            Some(raw) => serde_json::from_str(raw),
        }
    }

    /// Wholesale replacement: the stored list is overwritten, and an empty
    /// list normalizes to no suggestions at all.
    pub fn set_suggested_items(&mut self, items: &[SuggestedItem]) -> Result<(), serde_json::Error> {
        if items.is_empty() {
            self.suggested_items = None;
            return Ok(());
        }
        self.suggested_items = Some(serde_json::to_string(items)?);
        Ok(())
    }
}

//! Order event types and definitions
//!
//! This module defines the structure of the events that flow
//! through the signal system once an order workflow has finished.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Order event type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderEventType {
    Created,
    Failed,
}

/// Final outcome of one order workflow run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderEvent {
    pub event_type: OrderEventType,
    /// Generated order id, only present for created orders
    pub order_id: Option<Uuid>,
    pub customer_id: Uuid,
    pub total_cents: i64,
    pub item_count: usize,
    /// Error kind label for failed runs
    pub error_kind: Option<String>,
    /// Secondary diagnostic when the rollback itself failed
    pub rollback_error: Option<String>,
    /// Event timestamp (UTC)
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl OrderEvent {
    pub fn created(order_id: Uuid, customer_id: Uuid, total_cents: i64, item_count: usize) -> Self {
        Self {
            event_type: OrderEventType::Created,
            order_id: Some(order_id),
            customer_id,
            total_cents,
            item_count,
            error_kind: None,
            rollback_error: None,
            timestamp: chrono::Utc::now(),
        }
    }

    pub fn failed(customer_id: Uuid, item_count: usize, error_kind: impl Into<String>) -> Self {
        Self {
            event_type: OrderEventType::Failed,
            order_id: None,
            customer_id,
            total_cents: 0,
            item_count,
            error_kind: Some(error_kind.into()),
            rollback_error: None,
            timestamp: chrono::Utc::now(),
        }
    }

    pub fn with_rollback_error(mut self, rollback_error: impl Into<String>) -> Self {
        self.rollback_error = Some(rollback_error.into());
        self
    }

    pub fn is_success(&self) -> bool {
        self.event_type == OrderEventType::Created
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_event_carries_kind_and_rollback_diagnostic() {
        let customer_id = Uuid::new_v4();
        let event = OrderEvent::failed(customer_id, 2, "insufficient_stock")
            .with_rollback_error("connection reset");

        assert!(!event.is_success());
        assert_eq!(event.order_id, None);
        assert_eq!(event.error_kind.as_deref(), Some("insufficient_stock"));
        assert_eq!(event.rollback_error.as_deref(), Some("connection reset"));
    }

    #[test]
    fn test_event_serializes_with_type_tag() {
        let event = OrderEvent::created(Uuid::new_v4(), Uuid::new_v4(), 100_000, 1);
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["event_type"], "Created");
        assert_eq!(json["total_cents"], 100_000);
        assert!(json["error_kind"].is_null());
    }
}

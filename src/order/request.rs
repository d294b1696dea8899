use super::error::OrderError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One requested line: a product and how many units of it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub product_id: Uuid,
    pub quantity: i32,
}

impl OrderLine {
    pub fn new(product_id: Uuid, quantity: i32) -> Self {
        Self {
            product_id,
            quantity,
        }
    }
}

/// Input of the order creation workflow
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateOrderRequest {
    pub customer_id: Uuid,
    pub items: Vec<OrderLine>,
}

impl CreateOrderRequest {
    pub fn new(customer_id: Uuid, items: Vec<OrderLine>) -> Self {
        Self { customer_id, items }
    }

    /// Reject shapes the workflow never accepts, before any transaction is opened
    pub fn validate(&self) -> Result<(), OrderError> {
        if self.items.is_empty() {
            return Err(OrderError::InvalidRequest(
                "an order needs at least one item".to_string(),
            ));
        }
        if let Some((index, line)) = self
            .items
            .iter()
            .enumerate()
            .find(|(_, line)| line.quantity <= 0)
        {
            return Err(OrderError::InvalidRequest(format!(
                "item {} (product {}) has non-positive quantity {}",
                index, line.product_id, line.quantity
            )));
        }
        Ok(())
    }

    pub fn total_units(&self) -> i64 {
        self.items.iter().map(|line| i64::from(line.quantity)).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_items_rejected() {
        let request = CreateOrderRequest::new(Uuid::new_v4(), vec![]);
        assert!(matches!(request.validate(), Err(OrderError::InvalidRequest(_))));
    }

    #[test]
    fn test_non_positive_quantity_rejected() {
        let request = CreateOrderRequest::new(
            Uuid::new_v4(),
            vec![
                OrderLine::new(Uuid::new_v4(), 1),
                OrderLine::new(Uuid::new_v4(), 0),
            ],
        );
        let err = request.validate().unwrap_err();
        assert!(err.to_string().contains("item 1"));
    }

    #[test]
    fn test_deserialize_request() {
        let customer_id = Uuid::new_v4();
        let product_id = Uuid::new_v4();
        let json = format!(
            r#"{{"customer_id":"{customer_id}","items":[{{"product_id":"{product_id}","quantity":2}}]}}"#
        );
        let request: CreateOrderRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(request.items, vec![OrderLine::new(product_id, 2)]);
        assert_eq!(request.total_units(), 2);
        assert!(request.validate().is_ok());
    }
}

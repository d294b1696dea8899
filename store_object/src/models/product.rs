use crate::errors::StoreError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Catalog item with finite stock
///
/// `stock` is never negative once persisted: stores reject such writes before
/// they reach the database and the schema carries a matching CHECK constraint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub price_cents: i64,
    pub stock: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Copy of this product with a new stock level
    pub fn with_stock(&self, stock: i32) -> Result<Self, StoreError> {
        if stock < 0 {
            return Err(StoreError::validation(format!(
                "stock for product {} cannot become negative ({})",
                self.id, stock
            )));
        }
        Ok(Self {
            stock,
            ..self.clone()
        })
    }

    pub fn validate(&self) -> Result<(), StoreError> {
        validate_product_values(self.price_cents, self.stock)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price_cents: i64,
    pub stock: i32,
}

impl NewProduct {
    pub fn new(name: impl Into<String>, price_cents: i64, stock: i32) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            price_cents,
            stock,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn validate(&self) -> Result<(), StoreError> {
        validate_product_values(self.price_cents, self.stock)
    }
}

fn validate_product_values(price_cents: i64, stock: i32) -> Result<(), StoreError> {
    if price_cents < 0 {
        return Err(StoreError::validation(format!(
            "price_cents cannot be negative ({})",
            price_cents
        )));
    }
    if stock < 0 {
        return Err(StoreError::validation(format!(
            "stock cannot be negative ({})",
            stock
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(stock: i32) -> Product {
        let now = Utc::now();
        Product {
            id: Uuid::new_v4(),
            name: "Oak chair".to_string(),
            description: String::new(),
            price_cents: 15_000,
            stock,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_with_stock_rejects_negative() {
        let p = product(1);
        assert!(matches!(p.with_stock(-1), Err(StoreError::Validation(_))));
        assert_eq!(p.with_stock(0).unwrap().stock, 0);
    }

    #[test]
    fn test_new_product_validation() {
        assert!(NewProduct::new("Lamp", 0, 0).validate().is_ok());
        assert!(NewProduct::new("Lamp", -1, 3).validate().is_err());
        assert!(NewProduct::new("Lamp", 100, -3).validate().is_err());
    }
}

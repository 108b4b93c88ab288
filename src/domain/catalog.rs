//! Catalog product model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const STATUS_ACTIVE: &str = "active";
pub const STATUS_ARCHIVED: &str = "archived";

/// A catalog product. Prices are whole rupees; `category` is a plain slug
/// ("goggles", "watches", ...) matched verbatim by search and coupons.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub price: i64,
    pub original_price: Option<i64>,
    pub category: String,
    pub brand: Option<String>,
    pub images: Vec<String>,
    pub colors: Vec<String>,
    pub featured: bool,
    pub in_stock: bool,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn primary_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }

    /// Strike-through savings shown on product cards, when the listed price
    /// undercuts the original one.
    pub fn savings(&self) -> Option<i64> {
        self.original_price.map(|o| o - self.price).filter(|s| *s > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(price: i64, original: Option<i64>) -> Product {
        Product {
            id: Uuid::new_v4(),
            name: "Aviator Pro Goggles".into(),
            description: String::new(),
            price,
            original_price: original,
            category: "goggles".into(),
            brand: None,
            images: vec!["a.jpg".into(), "b.jpg".into()],
            colors: vec![],
            featured: false,
            in_stock: true,
            status: STATUS_ACTIVE.into(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn savings_only_when_discounted() {
        assert_eq!(product(2999, Some(3999)).savings(), Some(1000));
        assert_eq!(product(2999, Some(2999)).savings(), None);
        assert_eq!(product(2999, None).savings(), None);
    }

    #[test]
    fn first_image_is_primary() {
        assert_eq!(product(100, None).primary_image(), Some("a.jpg"));
    }
}

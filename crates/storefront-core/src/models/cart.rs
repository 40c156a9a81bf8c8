use serde::{Deserialize, Serialize};

use super::Product;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    pub id: i64,
    #[serde(default)]
    pub items: Vec<CartItem>,
    #[serde(default, with = "super::amount")]
    pub total: f64,
    #[serde(default)]
    pub item_count: u32,
}

impl Cart {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn item(&self, item_id: i64) -> Option<&CartItem> {
        self.items.iter().find(|i| i.id == item_id)
    }

    /// Quantity already in the cart for a product
    pub fn quantity_of(&self, product_id: i64) -> u32 {
        self.items
            .iter()
            .filter(|i| i.product_id == product_id)
            .map(|i| i.quantity)
            .sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: i64,
    pub product_id: i64,
    #[serde(default)]
    pub product: Option<Product>,
    pub quantity: u32,
    #[serde(default, with = "super::amount")]
    pub price: f64,
    #[serde(default, with = "super::amount")]
    pub subtotal: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cart() {
        let json = r#"{"id": 1, "total": "250.00", "item_count": 3, "items": [
            {"id": 11, "product_id": 7, "quantity": 2, "price": 100, "subtotal": 200},
            {"id": 12, "product_id": 8, "quantity": 1, "price": "50.00", "subtotal": "50.00"}
        ]}"#;
        let cart: Cart = serde_json::from_str(json).expect("Failed to parse cart test JSON");
        assert_eq!(cart.total, 250.0);
        assert_eq!(cart.quantity_of(7), 2);
        assert_eq!(cart.quantity_of(99), 0);
        assert_eq!(cart.item(12).map(|i| i.subtotal), Some(50.0));
        assert!(!cart.is_empty());
    }
}

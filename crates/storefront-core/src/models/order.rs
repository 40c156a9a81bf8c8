use std::fmt;

use serde::{Deserialize, Serialize};

use super::Product;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Pending,
        OrderStatus::Processing,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// Parse a status name (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        let lower = s.trim().to_lowercase();
        Self::ALL.into_iter().find(|status| status.as_str() == lower)
    }

    /// Delivered and cancelled orders cannot change status any more
    pub fn is_final(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub order_number: String,
    pub status: OrderStatus,
    #[serde(default, with = "super::amount")]
    pub total: f64,
    #[serde(default)]
    pub items: Vec<OrderItem>,
    #[serde(default)]
    pub shipping_address: Option<String>,
    #[serde(default)]
    pub payment_method: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
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

/// Optional details sent with checkout; the server fills in defaults.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CheckoutDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipping_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsOverview {
    #[serde(default, with = "super::amount")]
    pub total_revenue: f64,
    #[serde(default)]
    pub total_orders: u64,
    #[serde(default)]
    pub total_products: u64,
    #[serde(default)]
    pub total_customers: u64,
    #[serde(default)]
    pub recent_orders: Vec<Order>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_status_parse() {
        assert_eq!(OrderStatus::parse("Shipped"), Some(OrderStatus::Shipped));
        assert_eq!(OrderStatus::parse(" pending "), Some(OrderStatus::Pending));
        assert_eq!(OrderStatus::parse("lost"), None);
    }

    #[test]
    fn test_order_status_final() {
        assert!(OrderStatus::Delivered.is_final());
        assert!(OrderStatus::Cancelled.is_final());
        assert!(!OrderStatus::Processing.is_final());
    }

    #[test]
    fn test_parse_order() {
        let json = r#"{"id": 3, "order_number": "ORD-0003", "status": "processing", "total": "99.90",
            "items": [{"id": 1, "product_id": 4, "quantity": 1, "price": 99.9, "subtotal": 99.9}],
            "payment_method": "cod"}"#;
        let order: Order = serde_json::from_str(json).expect("Failed to parse order test JSON");
        assert_eq!(order.status, OrderStatus::Processing);
        assert_eq!(order.total, 99.9);
        assert_eq!(order.items.len(), 1);
        assert_eq!(order.status.to_string(), "processing");
    }
}

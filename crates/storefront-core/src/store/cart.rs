use tracing::{debug, warn};

use crate::api::{ApiClient, ApiError};
use crate::models::Cart;

use super::failure_message;

/// The customer's cart as last returned by the server.
///
/// Every mutation endpoint answers with the whole cart, which replaces the
/// local copy; nothing is patched client-side.
#[derive(Debug, Clone, Default)]
pub struct CartState {
    pub cart: Option<Cart>,
    pub is_loading: bool,
    pub error: Option<String>,
}

impl CartState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn item_count(&self) -> u32 {
        self.cart.as_ref().map(|c| c.item_count).unwrap_or(0)
    }

    async fn apply<F>(&mut self, fallback: &str, call: F) -> Result<(), ApiError>
    where
        F: std::future::Future<Output = Result<Cart, ApiError>>,
    {
        self.is_loading = true;
        self.error = None;
        let result = call.await;
        self.is_loading = false;

        match result {
            Ok(cart) => {
                debug!(items = cart.items.len(), "Cart updated");
                self.cart = Some(cart);
                Ok(())
            }
            Err(e) => {
                self.error = Some(failure_message(&e, fallback));
                Err(e)
            }
        }
    }

    pub async fn fetch(&mut self, api: &ApiClient) -> Result<(), ApiError> {
        self.apply("Failed to load cart", api.cart()).await
    }

    pub async fn add_item(&mut self, api: &ApiClient, product_id: i64, quantity: u32) -> Result<(), ApiError> {
        self.apply("Failed to add item", api.add_cart_item(product_id, quantity)).await
    }

    pub async fn update_item(&mut self, api: &ApiClient, item_id: i64, quantity: u32) -> Result<(), ApiError> {
        self.apply("Failed to update item", api.update_cart_item(item_id, quantity)).await
    }

    pub async fn remove_item(&mut self, api: &ApiClient, item_id: i64) -> Result<(), ApiError> {
        self.apply("Failed to remove item", api.remove_cart_item(item_id)).await
    }

    /// Fold a guest cart into the account after login. Failures are logged only.
    pub async fn merge(&mut self, api: &ApiClient, guest_cart_id: Option<&str>) {
        match api.merge_cart(guest_cart_id).await {
            Ok(cart) => self.cart = Some(cart),
            Err(e) => warn!(error = %e, "Cart merge failed"),
        }
    }

    pub fn clear(&mut self) {
        self.cart = None;
        self.error = None;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::auth::{MemoryStore, SessionManager};
    use crate::testing::{json_response, MockBackend};

    fn client(backend: &Arc<MockBackend>) -> ApiClient {
        ApiClient::new(Arc::new(SessionManager::new(backend.clone(), Arc::new(MemoryStore::new()))))
    }

    fn cart_body(item_count: u32) -> serde_json::Value {
        json!({"data": {"id": 1, "items": [{"id": 11, "product_id": 7, "quantity": item_count, "price": 5, "subtotal": 5}],
            "total": "5.00", "item_count": item_count}})
    }

    #[tokio::test]
    async fn test_mutation_replaces_cart() {
        let backend = MockBackend::new(|req| match req.path.as_str() {
            "/cart" => json_response(200, cart_body(1)),
            _ => json_response(200, cart_body(3)),
        });
        let api = client(&backend);
        let mut state = CartState::new();

        state.fetch(&api).await.unwrap();
        assert_eq!(state.item_count(), 1);

        state.update_item(&api, 11, 3).await.unwrap();
        assert_eq!(state.item_count(), 3);
        assert!(state.error.is_none());
    }

    #[tokio::test]
    async fn test_failed_add_keeps_cart() {
        let backend = MockBackend::new(|req| match req.path.as_str() {
            "/cart" => json_response(200, cart_body(1)),
            _ => json_response(422, json!({"message": "Insufficient stock"})),
        });
        let api = client(&backend);
        let mut state = CartState::new();
        state.fetch(&api).await.unwrap();

        assert!(state.add_item(&api, 7, 50).await.is_err());
        assert_eq!(state.item_count(), 1);
        assert_eq!(state.error.as_deref(), Some("Insufficient stock"));
    }

    #[tokio::test]
    async fn test_merge_failure_is_silent() {
        let backend = MockBackend::new(|_| json_response(500, json!({"message": "boom"})));
        let mut state = CartState::new();

        state.merge(&client(&backend), Some("guest-1")).await;
        assert!(state.cart.is_none());
        assert!(state.error.is_none());
    }

    #[tokio::test]
    async fn test_clear() {
        let backend = MockBackend::new(|_| json_response(200, cart_body(2)));
        let mut state = CartState::new();
        state.fetch(&client(&backend)).await.unwrap();

        state.clear();
        assert!(state.cart.is_none());
        assert_eq!(state.item_count(), 0);
    }
}

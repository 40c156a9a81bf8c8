//! API client for the storefront backend.
//!
//! `ApiClient` exposes typed endpoints; every call is executed through the
//! shared `SessionManager`, so credentials and token refresh are handled in
//! one place.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::debug;

use crate::auth::{KeyringStore, SessionManager};
use crate::config::Config;
use crate::models::{
    decode_data, decode_message, decode_page, Cart, Category, CheckoutDetails, Order, Page, Product,
};

use super::transport::path_segment;
use super::{ApiError, ApiRequest, HttpTransport};

/// Filters for the product listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductQuery {
    pub search: Option<String>,
    pub category_id: Option<i64>,
}

impl ProductQuery {
    pub fn search(term: impl Into<String>) -> Self {
        Self {
            search: Some(term.into()),
            category_id: None,
        }
    }

    pub fn category(category_id: i64) -> Self {
        Self {
            search: None,
            category_id: Some(category_id),
        }
    }

    fn apply(&self, mut request: ApiRequest) -> ApiRequest {
        if let Some(ref term) = self.search {
            if !term.trim().is_empty() {
                request = request.query("search", term.trim());
            }
        }
        if let Some(category_id) = self.category_id {
            request = request.query("category_id", category_id);
        }
        request
    }
}

/// API client for the storefront backend.
/// Clone is cheap - the session manager is shared.
#[derive(Clone, Debug)]
pub struct ApiClient {
    session: Arc<SessionManager>,
}

impl ApiClient {
    pub fn new(session: Arc<SessionManager>) -> Self {
        Self { session }
    }

    /// Build a client over HTTP with tokens in the OS keychain.
    pub fn from_config(config: &Config) -> Result<Self, ApiError> {
        let transport = HttpTransport::new(&config.api_url(), config.timeout())?;
        let store = KeyringStore::new(config.keyring_service());
        debug!(base_url = %transport.base_url(), "API client configured");
        Ok(Self::new(Arc::new(SessionManager::new(
            Arc::new(transport),
            Arc::new(store),
        ))))
    }

    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    pub(crate) async fn fetch<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, ApiError> {
        let response = self.session.execute(request).await?;
        decode_data(&response.body)
    }

    pub(crate) async fn fetch_page<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<Page<T>, ApiError> {
        let response = self.session.execute(request).await?;
        decode_page(&response.body)
    }

    /// For endpoints that only acknowledge; returns the server's message.
    pub(crate) async fn acknowledge(&self, request: ApiRequest) -> Result<Option<String>, ApiError> {
        let response = self.session.execute(request).await?;
        Ok(decode_message(&response.body))
    }

    // ===== Catalog =====

    /// Fetch one page of the product listing
    pub async fn products(&self, page: u32, query: &ProductQuery) -> Result<Page<Product>, ApiError> {
        let request = query.apply(ApiRequest::get("/products").query("page", page.max(1)));
        self.fetch_page(request).await
    }

    /// Fetch a single product by slug
    pub async fn product(&self, slug: &str) -> Result<Product, ApiError> {
        self.fetch(ApiRequest::get(format!("/products/{}", path_segment(slug)?))).await
    }

    pub async fn categories(&self) -> Result<Vec<Category>, ApiError> {
        self.fetch(ApiRequest::get("/categories")).await
    }

    // ===== Cart =====

    pub async fn cart(&self) -> Result<Cart, ApiError> {
        self.fetch(ApiRequest::get("/cart")).await
    }

    pub async fn add_cart_item(&self, product_id: i64, quantity: u32) -> Result<Cart, ApiError> {
        let request = ApiRequest::post("/cart/items")
            .json_value(json!({ "product_id": product_id, "quantity": quantity.max(1) }));
        self.fetch(request).await
    }

    pub async fn update_cart_item(&self, item_id: i64, quantity: u32) -> Result<Cart, ApiError> {
        let request = ApiRequest::patch(format!("/cart/items/{}", item_id))
            .json_value(json!({ "quantity": quantity }));
        self.fetch(request).await
    }

    pub async fn remove_cart_item(&self, item_id: i64) -> Result<Cart, ApiError> {
        self.fetch(ApiRequest::delete(format!("/cart/items/{}", item_id))).await
    }

    /// Merge a guest cart into the signed-in user's cart
    pub async fn merge_cart(&self, guest_cart_id: Option<&str>) -> Result<Cart, ApiError> {
        let request = ApiRequest::post("/cart/merge").json_value(json!({ "guest_cart_id": guest_cart_id }));
        self.fetch(request).await
    }

    // ===== Orders =====

    pub async fn orders(&self, page: u32) -> Result<Page<Order>, ApiError> {
        self.fetch_page(ApiRequest::get("/orders").query("page", page.max(1))).await
    }

    pub async fn order(&self, order_id: &str) -> Result<Order, ApiError> {
        self.fetch(ApiRequest::get(format!("/orders/{}", path_segment(order_id)?))).await
    }

    /// Place an order from the current cart
    pub async fn checkout(&self, details: Option<&CheckoutDetails>) -> Result<Order, ApiError> {
        let mut request = ApiRequest::post("/checkout");
        if let Some(details) = details {
            request = request.json(details)?;
        }
        self.fetch(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Method;
    use crate::auth::session::PROFILE_PATH;
    use crate::auth::MemoryStore;
    use crate::testing::{json_response, MockBackend};

    fn client(backend: &Arc<MockBackend>) -> ApiClient {
        let store = Arc::new(MemoryStore::with_tokens("abc", Some("xyz")));
        let session = SessionManager::new(backend.clone(), store);
        ApiClient::new(Arc::new(session))
    }

    fn product_json(id: i64) -> serde_json::Value {
        json!({"id": id, "name": format!("Product {}", id), "slug": format!("product-{}", id), "price": "10.00"})
    }

    #[tokio::test]
    async fn test_products_query_parameters() {
        let backend = MockBackend::new(|_| {
            json_response(200, json!({"data": [product_json(1)], "meta": {"pagination": {"current_page": 1, "last_page": 2}}}))
        });
        let api = client(&backend);

        let page = api.products(1, &ProductQuery::search("shoe")).await.unwrap();
        assert_eq!(page.items.len(), 1);
        assert!(page.has_more());

        api.products(0, &ProductQuery::category(4)).await.unwrap();

        let requests = backend.requests_to("/products");
        assert_eq!(
            requests[0].query,
            vec![("page".to_string(), "1".to_string()), ("search".to_string(), "shoe".to_string())]
        );
        // Page numbers start at 1
        assert_eq!(
            requests[1].query,
            vec![("page".to_string(), "1".to_string()), ("category_id".to_string(), "4".to_string())]
        );
    }

    #[tokio::test]
    async fn test_blank_search_is_not_sent() {
        let backend = MockBackend::new(|_| json_response(200, json!({"data": []})));
        let api = client(&backend);

        api.products(2, &ProductQuery::search("   ")).await.unwrap();
        assert_eq!(backend.requests()[0].query, vec![("page".to_string(), "2".to_string())]);
    }

    #[tokio::test]
    async fn test_product_by_slug() {
        let backend = MockBackend::new(|req| {
            assert_eq!(req.path, "/products/product-7");
            json_response(200, json!({"message": "ok", "data": product_json(7)}))
        });
        let product = client(&backend).product("product-7").await.unwrap();
        assert_eq!(product.id, 7);
    }

    #[tokio::test]
    async fn test_path_ids_are_escaped() {
        let backend = MockBackend::new(|req| {
            if req.path.starts_with("/orders/") {
                json_response(200, json!({"data": {"id": 1, "order_number": "ORD-1", "status": "pending", "total": "5.00"}}))
            } else {
                json_response(200, json!({"data": product_json(7)}))
            }
        });
        let api = client(&backend);

        api.product("shoe/../admin?x=1").await.unwrap();
        api.order("ORD 1#x").await.unwrap();

        let requests = backend.requests();
        assert_eq!(requests[0].path, "/products/shoe%2F..%2Fadmin%3Fx=1");
        assert!(requests[0].query.is_empty());
        assert_eq!(requests[1].path, "/orders/ORD%201%23x");
    }

    #[tokio::test]
    async fn test_requests_carry_bearer_token() {
        let backend = MockBackend::new(|req| {
            if req.path == PROFILE_PATH {
                json_response(200, json!({"data": {"id": 1, "name": "Ana", "email": "ana@example.com"}}))
            } else {
                json_response(200, json!({"data": {"id": 1, "items": [], "total": 0, "item_count": 0}}))
            }
        });
        let api = client(&backend);
        api.session().restore_session().await.unwrap();

        api.cart().await.unwrap();
        assert!(backend.requests_to("/cart").iter().all(|r| r.bearer() == Some("abc")));
    }

    #[tokio::test]
    async fn test_cart_mutations() {
        let backend = MockBackend::new(|_| {
            json_response(200, json!({"data": {"id": 1, "items": [], "total": "0.00", "item_count": 0}}))
        });
        let api = client(&backend);

        api.add_cart_item(5, 0).await.unwrap();
        api.update_cart_item(11, 3).await.unwrap();
        api.remove_cart_item(11).await.unwrap();
        api.merge_cart(None).await.unwrap();

        let requests = backend.requests();
        assert_eq!(requests[0].method, Method::Post);
        assert_eq!(requests[0].body, Some(json!({"product_id": 5, "quantity": 1})));
        assert_eq!(requests[1].method, Method::Patch);
        assert_eq!(requests[1].path, "/cart/items/11");
        assert_eq!(requests[1].body, Some(json!({"quantity": 3})));
        assert_eq!(requests[2].method, Method::Delete);
        assert_eq!(requests[3].body, Some(json!({"guest_cart_id": null})));
    }

    #[tokio::test]
    async fn test_checkout_with_and_without_details() {
        let backend = MockBackend::new(|_| {
            json_response(201, json!({"data": {"id": 1, "order_number": "ORD-1", "status": "pending", "total": 10}}))
        });
        let api = client(&backend);

        let order = api.checkout(None).await.unwrap();
        assert_eq!(order.order_number, "ORD-1");

        let details = CheckoutDetails {
            payment_method: Some("cod".to_string()),
            ..Default::default()
        };
        api.checkout(Some(&details)).await.unwrap();

        let requests = backend.requests_to("/checkout");
        assert_eq!(requests[0].body, None);
        assert_eq!(requests[1].body, Some(json!({"payment_method": "cod"})));
    }

    #[tokio::test]
    async fn test_undecodable_body_is_invalid_response() {
        let backend = MockBackend::new(|_| json_response(200, json!({"data": {"unexpected": true}})));
        let result = client(&backend).order("ORD-1").await;
        assert!(matches!(result, Err(ApiError::InvalidResponse(_))));
    }
}

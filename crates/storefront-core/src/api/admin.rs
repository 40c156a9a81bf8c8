//! Admin endpoints: analytics, product and order management, users and roles.
//!
//! These require an admin session; the backend answers 403 otherwise, which
//! surfaces as `ApiError::RequestFailed`.

use serde_json::json;

use crate::models::{
    AnalyticsOverview, Order, OrderStatus, Page, Product, ProductUpdate, RoleInfo, RoleInput, User, UserInput,
};

use super::transport::path_segment;
use super::{ApiClient, ApiError, ApiRequest};

impl ApiClient {
    pub async fn admin_overview(&self) -> Result<AnalyticsOverview, ApiError> {
        self.fetch(ApiRequest::get("/admin/analytics/overview")).await
    }

    // ===== Products =====

    pub async fn admin_products(&self, page: u32) -> Result<Page<Product>, ApiError> {
        self.fetch_page(ApiRequest::get("/admin/products").query("page", page.max(1))).await
    }

    pub async fn admin_update_product(&self, product_id: i64, update: &ProductUpdate) -> Result<Product, ApiError> {
        let request = ApiRequest::put(format!("/admin/products/{}", product_id)).json(update)?;
        self.fetch(request).await
    }

    pub async fn admin_delete_product(&self, product_id: i64) -> Result<Option<String>, ApiError> {
        self.acknowledge(ApiRequest::delete(format!("/admin/products/{}", product_id))).await
    }

    // ===== Orders =====

    pub async fn admin_orders(&self, page: u32) -> Result<Page<Order>, ApiError> {
        self.fetch_page(ApiRequest::get("/admin/orders").query("page", page.max(1))).await
    }

    pub async fn admin_order(&self, order_id: &str) -> Result<Order, ApiError> {
        self.fetch(ApiRequest::get(format!("/admin/orders/{}", path_segment(order_id)?))).await
    }

    /// Move an order to a new status; returns the server's message.
    pub async fn admin_update_order_status(
        &self,
        order_id: &str,
        status: OrderStatus,
    ) -> Result<Option<String>, ApiError> {
        let request = ApiRequest::patch(format!("/admin/orders/{}/status", path_segment(order_id)?))
            .json_value(json!({ "status": status.as_str() }));
        self.acknowledge(request).await
    }

    // ===== Users and roles =====

    pub async fn admin_users(&self, page: u32) -> Result<Page<User>, ApiError> {
        self.fetch_page(ApiRequest::get("/users").query("page", page.max(1))).await
    }

    pub async fn admin_create_user(&self, user: &UserInput) -> Result<User, ApiError> {
        self.fetch(ApiRequest::post("/users").json(user)?).await
    }

    pub async fn admin_update_user(&self, user_id: i64, user: &UserInput) -> Result<User, ApiError> {
        self.fetch(ApiRequest::put(format!("/users/{}", user_id)).json(user)?).await
    }

    pub async fn admin_delete_user(&self, user_id: i64) -> Result<Option<String>, ApiError> {
        self.acknowledge(ApiRequest::delete(format!("/users/{}", user_id))).await
    }

    pub async fn admin_roles(&self) -> Result<Vec<RoleInfo>, ApiError> {
        self.fetch(ApiRequest::get("/roles")).await
    }

    pub async fn admin_create_role(&self, role: &RoleInput) -> Result<RoleInfo, ApiError> {
        self.fetch(ApiRequest::post("/roles").json(role)?).await
    }

    pub async fn admin_update_role(&self, role_id: i64, role: &RoleInput) -> Result<RoleInfo, ApiError> {
        self.fetch(ApiRequest::put(format!("/roles/{}", role_id)).json(role)?).await
    }

    pub async fn admin_delete_role(&self, role_id: i64) -> Result<Option<String>, ApiError> {
        self.acknowledge(ApiRequest::delete(format!("/roles/{}", role_id))).await
    }

    /// Replace the permission set of a role
    pub async fn admin_sync_permissions(&self, role_id: i64, permission_ids: &[i64]) -> Result<Option<String>, ApiError> {
        let request = ApiRequest::put(format!("/roles/{}/permissions", role_id))
            .json_value(json!({ "permissions": permission_ids }));
        self.acknowledge(request).await
    }
}

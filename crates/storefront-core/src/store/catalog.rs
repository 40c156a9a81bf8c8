use tracing::{debug, warn};

use crate::api::{ApiClient, ApiError, ProductQuery};
use crate::models::{Category, Page, Product};

use super::failure_message;

const LOAD_FAILED: &str = "Failed to load products";

/// Paginated product listing.
///
/// Page 1 replaces the list, later pages append. The active query is kept
/// so `load_more` and `refresh` stay within the same search.
#[derive(Debug, Clone)]
pub struct ProductCatalog {
    pub products: Vec<Product>,
    pub categories: Vec<Category>,
    pub current_page: u32,
    pub last_page: u32,
    pub has_more: bool,
    pub is_loading: bool,
    pub error: Option<String>,
    query: ProductQuery,
}

impl Default for ProductCatalog {
    fn default() -> Self {
        Self {
            products: Vec::new(),
            categories: Vec::new(),
            current_page: 1,
            last_page: 1,
            has_more: true,
            is_loading: false,
            error: None,
            query: ProductQuery::default(),
        }
    }
}

impl ProductCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query(&self) -> &ProductQuery {
        &self.query
    }

    /// Switch to a different search; the listing starts over.
    pub fn set_query(&mut self, query: ProductQuery) {
        if query != self.query {
            self.query = query;
            self.reset();
        }
    }

    /// Drop loaded products and pagination, keeping categories.
    pub fn reset(&mut self) {
        self.products.clear();
        self.current_page = 1;
        self.last_page = 1;
        self.has_more = true;
        self.error = None;
    }

    /// Merge a fetched page into the listing.
    pub fn apply_page(&mut self, requested: u32, page: Page<Product>) {
        self.has_more = page.has_more();
        self.current_page = page.pagination.current_page;
        self.last_page = page.pagination.last_page;
        if requested <= 1 {
            self.products = page.items;
        } else {
            self.products.extend(page.items);
        }
    }

    pub async fn fetch_page(&mut self, api: &ApiClient, page: u32) -> Result<(), ApiError> {
        self.is_loading = true;
        self.error = None;

        let result = api.products(page, &self.query).await;
        self.is_loading = false;

        match result {
            Ok(fetched) => {
                debug!(page, count = fetched.items.len(), "Products loaded");
                self.apply_page(page, fetched);
                Ok(())
            }
            Err(e) => {
                self.error = Some(failure_message(&e, LOAD_FAILED));
                Err(e)
            }
        }
    }

    /// Reload from the first page.
    pub async fn refresh(&mut self, api: &ApiClient) -> Result<(), ApiError> {
        self.fetch_page(api, 1).await
    }

    /// Fetch the next page. No-op when there is nothing more or a load is running.
    pub async fn load_more(&mut self, api: &ApiClient) -> Result<(), ApiError> {
        if !self.has_more || self.is_loading {
            return Ok(());
        }
        self.fetch_page(api, self.current_page + 1).await
    }

    /// Load categories; failures leave the current list in place.
    pub async fn fetch_categories(&mut self, api: &ApiClient) {
        match api.categories().await {
            Ok(categories) => self.categories = categories,
            Err(e) => warn!(error = %e, "Failed to load categories"),
        }
    }
}

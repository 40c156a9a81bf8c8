//! Response envelopes used by the backend.
//!
//! Every endpoint wraps its payload as `{"message": ..., "data": ...}`.
//! List endpoints come in two shapes: catalog listings put the pagination
//! under `meta.pagination`, while admin listings nest a paginator object
//! inside `data`.

use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::api::ApiError;

#[derive(Debug, Deserialize)]
struct MessageOnly {
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    #[serde(default = "first_page")]
    pub current_page: u32,
    #[serde(default = "first_page")]
    pub last_page: u32,
    #[serde(default)]
    pub per_page: u32,
    #[serde(default)]
    pub total: u64,
}

fn first_page() -> u32 {
    1
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            current_page: 1,
            last_page: 1,
            per_page: 0,
            total: 0,
        }
    }
}

/// One page of a listing, normalized from either wire shape.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pagination: Pagination,
}

impl<T> Page<T> {
    pub fn has_more(&self) -> bool {
        self.pagination.current_page < self.pagination.last_page
    }
}

#[derive(Debug, Deserialize)]
struct PaginationMeta {
    #[serde(default)]
    pagination: Option<Pagination>,
}

#[derive(Debug, Deserialize)]
struct PaginatorData<T> {
    data: Vec<T>,
    #[serde(flatten)]
    pagination: Pagination,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PageBody<T> {
    Meta {
        data: Vec<T>,
        #[serde(default)]
        meta: Option<PaginationMeta>,
    },
    Nested {
        data: PaginatorData<T>,
    },
}

/// Decode the `data` payload of an envelope, accepting a bare payload too.
pub fn decode_data<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    let value: serde_json::Value = serde_json::from_str(body)
        .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

    if let Some(data) = value.get("data") {
        if let Ok(parsed) = serde_json::from_value::<T>(data.clone()) {
            return Ok(parsed);
        }
    }

    serde_json::from_value(value)
        .map_err(|e| ApiError::InvalidResponse(format!("Unexpected response shape: {}", e)))
}

/// The envelope's `message`, for endpoints whose payload is empty.
pub fn decode_message(body: &str) -> Option<String> {
    serde_json::from_str::<MessageOnly>(body)
        .ok()
        .and_then(|m| m.message)
}

/// Decode a paginated listing into a [`Page`].
pub fn decode_page<T: DeserializeOwned>(body: &str) -> Result<Page<T>, ApiError> {
    let parsed: PageBody<T> = serde_json::from_str(body)
        .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse page: {}", e)))?;

    Ok(match parsed {
        PageBody::Meta { data, meta } => Page {
            items: data,
            pagination: meta.and_then(|m| m.pagination).unwrap_or_default(),
        },
        PageBody::Nested { data } => Page {
            items: data.data,
            pagination: data.pagination,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Item {
        id: u32,
    }

    #[test]
    fn test_decode_data_envelope() {
        let item: Item = decode_data(r#"{"message": "ok", "data": {"id": 7}}"#).expect("decode");
        assert_eq!(item, Item { id: 7 });
    }

    #[test]
    fn test_decode_data_bare() {
        let item: Item = decode_data(r#"{"id": 3}"#).expect("decode");
        assert_eq!(item, Item { id: 3 });
    }

    #[test]
    fn test_decode_data_rejects_garbage() {
        let result: Result<Item, _> = decode_data("<html>");
        assert!(matches!(result, Err(ApiError::InvalidResponse(_))));
    }

    #[test]
    fn test_decode_message() {
        assert_eq!(
            decode_message(r#"{"message": "Product deleted", "data": null}"#).as_deref(),
            Some("Product deleted")
        );
        assert_eq!(decode_message(""), None);
    }

    #[test]
    fn test_decode_page_with_meta() {
        let body = r#"{"message": "ok", "data": [{"id": 1}, {"id": 2}],
            "meta": {"pagination": {"current_page": 2, "last_page": 5, "per_page": 2, "total": 10}}}"#;
        let page: Page<Item> = decode_page(body).expect("decode");
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.pagination.current_page, 2);
        assert_eq!(page.pagination.last_page, 5);
        assert!(page.has_more());
    }

    #[test]
    fn test_decode_page_without_meta_defaults_to_single_page() {
        let page: Page<Item> = decode_page(r#"{"data": [{"id": 1}]}"#).expect("decode");
        assert_eq!(page.pagination, Pagination::default());
        assert!(!page.has_more());
    }

    #[test]
    fn test_decode_page_nested_paginator() {
        let body = r#"{"message": "ok", "data": {"data": [{"id": 4}], "current_page": 3, "last_page": 3, "per_page": 15, "total": 31}}"#;
        let page: Page<Item> = decode_page(body).expect("decode");
        assert_eq!(page.items, vec![Item { id: 4 }]);
        assert_eq!(page.pagination.current_page, 3);
        assert!(!page.has_more());
    }
}

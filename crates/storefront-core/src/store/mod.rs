//! Client-side state containers over the API client.
//!
//! - `ProductCatalog`: paginated product listing with search/category filters
//! - `CartState`: the signed-in customer's cart

pub mod cart;
pub mod catalog;

pub use cart::CartState;
pub use catalog::ProductCatalog;

use crate::api::ApiError;

/// Message shown for a failed load: the server's reason when it gave one.
pub(crate) fn failure_message(err: &ApiError, fallback: &str) -> String {
    match err {
        ApiError::RequestFailed { message, .. } if !message.trim().is_empty() => message.clone(),
        ApiError::InvalidCredentials(reason) => reason.clone(),
        _ => fallback.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_message() {
        let rejected = ApiError::RequestFailed {
            status: 422,
            message: "Out of stock".to_string(),
        };
        assert_eq!(failure_message(&rejected, "Failed to add item"), "Out of stock");
        assert_eq!(
            failure_message(&ApiError::NetworkUnreachable("timeout".into()), "Failed to add item"),
            "Failed to add item"
        );
    }
}

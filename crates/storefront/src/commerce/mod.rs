//! Commerce platform Store API client.
//!
//! The commerce backend is the source of truth for carts, pricing, inventory,
//! and orders. This module is deliberately thin: typed requests in, typed
//! responses out, no local caching of cart state beyond the current render
//! pass (the backend is the single writer per customer).

mod client;
pub mod types;

pub use client::CommerceClient;

use thiserror::Error;

/// Errors that can occur when interacting with the commerce Store API.
#[derive(Debug, Error)]
pub enum CommerceError {
    /// HTTP request failed before a response was received.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body, as returned by the backend.
        message: String,
    },

    /// The referenced cart does not exist (or has expired).
    #[error("Cart not found: {0}")]
    CartNotFound(String),

    /// Failed to parse a response body.
    #[error("Parse error: {0}")]
    Parse(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commerce_error_display() {
        let err = CommerceError::CartNotFound("cart_123".to_owned());
        assert_eq!(err.to_string(), "Cart not found: cart_123");

        let err = CommerceError::Api {
            status: 422,
            message: "shipping option not available".to_owned(),
        };
        assert_eq!(
            err.to_string(),
            "API error: 422 - shipping option not available"
        );

        let err = CommerceError::Parse("missing field `cart`".to_owned());
        assert_eq!(err.to_string(), "Parse error: missing field `cart`");
    }
}

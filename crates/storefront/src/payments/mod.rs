//! Payment processor client.
//!
//! The processor owns the hosted payment element and the payment intent
//! lifecycle; this module only reads intent status server-side so the
//! confirmation page can decide what to render.

pub mod stripe;

pub use stripe::StripeClient;

use thiserror::Error;

/// Errors that can occur when interacting with the payment processor API.
#[derive(Debug, Error)]
pub enum PaymentError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body.
        message: String,
    },

    /// The client secret from the query string is not well formed.
    #[error("Malformed payment intent client secret")]
    InvalidClientSecret,

    /// Failed to parse a response body.
    #[error("Parse error: {0}")]
    Parse(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_error_display() {
        assert_eq!(
            PaymentError::InvalidClientSecret.to_string(),
            "Malformed payment intent client secret"
        );
        let err = PaymentError::Api {
            status: 401,
            message: "invalid api key".to_owned(),
        };
        assert_eq!(err.to_string(), "API error: 401 - invalid api key");
    }
}

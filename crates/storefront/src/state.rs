//! Application state shared across handlers.

use std::sync::Arc;

use crate::commerce::{CommerceClient, CommerceError};
use crate::config::StorefrontConfig;
use crate::payments::{PaymentError, StripeClient};

/// Error constructing application state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("commerce client error: {0}")]
    Commerce(#[from] CommerceError),
    #[error("payment client error: {0}")]
    Payment(#[from] PaymentError),
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like API clients and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    commerce: CommerceClient,
    payments: Option<StripeClient>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// The payment client is only constructed when the processor is
    /// configured; the confirmation flow treats its absence as a blocking
    /// configuration error.
    ///
    /// # Errors
    ///
    /// Returns an error if either API client fails to build.
    pub fn new(config: StorefrontConfig) -> Result<Self, StateError> {
        let commerce = CommerceClient::new(&config.commerce)?;
        let payments = config
            .stripe
            .as_ref()
            .map(StripeClient::new)
            .transpose()?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                commerce,
                payments,
            }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the commerce Store API client.
    #[must_use]
    pub fn commerce(&self) -> &CommerceClient {
        &self.inner.commerce
    }

    /// Get the payment processor client, if configured.
    #[must_use]
    pub fn payments(&self) -> Option<&StripeClient> {
        self.inner.payments.as_ref()
    }
}

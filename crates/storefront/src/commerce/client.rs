//! Commerce Store API client implementation.
//!
//! Plain JSON-over-HTTP with `reqwest`. The publishable API key identifies
//! the sales channel and is sent on every request.

use reqwest::StatusCode;
use reqwest::header::{HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use tidepool_core::CartId;
use tracing::{debug, instrument};

use super::CommerceError;
use super::types::{
    Cart, CartEnvelope, CartUpdate, Order, OrderEnvelope, PaymentSession, PaymentSessionEnvelope,
    ShippingOption, ShippingOptionsEnvelope,
};
use crate::config::CommerceConfig;

/// Header carrying the publishable Store API key.
const PUBLISHABLE_KEY_HEADER: &str = "x-publishable-api-key";

/// Client for the commerce platform's Store API.
#[derive(Clone)]
pub struct CommerceClient {
    client: reqwest::Client,
    base_url: String,
}

impl CommerceClient {
    /// Create a new Store API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the publishable key is not a valid header value or
    /// the HTTP client fails to build.
    pub fn new(config: &CommerceConfig) -> Result<Self, CommerceError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            PUBLISHABLE_KEY_HEADER,
            HeaderValue::from_str(&config.publishable_key)
                .map_err(|e| CommerceError::Parse(format!("Invalid publishable key: {e}")))?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: config.api_url.trim_end_matches('/').to_owned(),
        })
    }

    /// Fetch the cart.
    ///
    /// # Errors
    ///
    /// Returns `CartNotFound` for a 404, or an API/parse error otherwise.
    #[instrument(skip(self), fields(cart_id = %cart_id))]
    pub async fn get_cart(&self, cart_id: &CartId) -> Result<Cart, CommerceError> {
        let url = format!("{}/store/carts/{cart_id}", self.base_url);
        let response = self.client.get(&url).send().await?;
        let envelope: CartEnvelope = self.read_response(response, Some(cart_id)).await?;
        Ok(envelope.cart)
    }

    /// Apply an address/email patch to the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the patch.
    #[instrument(skip(self, update), fields(cart_id = %cart_id))]
    pub async fn update_cart(
        &self,
        cart_id: &CartId,
        update: &CartUpdate,
    ) -> Result<Cart, CommerceError> {
        let url = format!("{}/store/carts/{cart_id}", self.base_url);
        let response = self.client.post(&url).json(update).send().await?;
        let envelope: CartEnvelope = self.read_response(response, Some(cart_id)).await?;
        debug!("cart address updated");
        Ok(envelope.cart)
    }

    /// List the shipping options available for the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(cart_id = %cart_id))]
    pub async fn list_shipping_options(
        &self,
        cart_id: &CartId,
    ) -> Result<Vec<ShippingOption>, CommerceError> {
        let url = format!(
            "{}/store/shipping-options?cart_id={cart_id}",
            self.base_url
        );
        let response = self.client.get(&url).send().await?;
        let envelope: ShippingOptionsEnvelope = self.read_response(response, Some(cart_id)).await?;
        Ok(envelope.shipping_options)
    }

    /// Attach a shipping option to the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the option is not available for the cart.
    #[instrument(skip(self), fields(cart_id = %cart_id, option_id))]
    pub async fn add_shipping_method(
        &self,
        cart_id: &CartId,
        option_id: &str,
    ) -> Result<Cart, CommerceError> {
        let url = format!("{}/store/carts/{cart_id}/shipping-methods", self.base_url);
        let body = serde_json::json!({ "option_id": option_id });
        let response = self.client.post(&url).json(&body).send().await?;
        let envelope: CartEnvelope = self.read_response(response, Some(cart_id)).await?;
        Ok(envelope.cart)
    }

    /// Initiate a payment session with a provider for the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider rejects the session.
    #[instrument(skip(self), fields(cart_id = %cart_id, provider_id))]
    pub async fn initiate_payment_session(
        &self,
        cart_id: &CartId,
        provider_id: &str,
    ) -> Result<PaymentSession, CommerceError> {
        let url = format!("{}/store/carts/{cart_id}/payment-sessions", self.base_url);
        let body = serde_json::json!({ "provider_id": provider_id });
        let response = self.client.post(&url).json(&body).send().await?;
        let envelope: PaymentSessionEnvelope = self.read_response(response, Some(cart_id)).await?;
        Ok(envelope.payment_session)
    }

    /// Complete the cart into an order. Called exactly once per confirmed
    /// payment by the confirmation flow.
    ///
    /// # Errors
    ///
    /// Returns an error if completion fails; the caller is responsible for
    /// the payment-already-captured messaging.
    #[instrument(skip(self), fields(cart_id = %cart_id))]
    pub async fn place_order(&self, cart_id: &CartId) -> Result<Order, CommerceError> {
        let url = format!("{}/store/carts/{cart_id}/complete", self.base_url);
        let response = self.client.post(&url).send().await?;
        let envelope: OrderEnvelope = self.read_response(response, Some(cart_id)).await?;
        Ok(envelope.order)
    }

    /// Check the status and decode the JSON body of a Store API response.
    async fn read_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
        cart_id: Option<&CartId>,
    ) -> Result<T, CommerceError> {
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            let id = cart_id.map(ToString::to_string).unwrap_or_default();
            return Err(CommerceError::CartNotFound(id));
        }

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(CommerceError::Api {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json()
            .await
            .map_err(|e| CommerceError::Parse(e.to_string()))
    }
}

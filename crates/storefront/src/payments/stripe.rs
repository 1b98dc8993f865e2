//! Stripe payment intent client.
//!
//! The hosted payment element redirects back to the confirmation page with a
//! `payment_intent_client_secret` query parameter. The intent ID is the
//! prefix of that secret, so the server can look the intent up with its
//! secret key and read the authoritative status.

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::Deserialize;
use tracing::instrument;

use super::PaymentError;
use crate::checkout::payment::{IntentStatusSource, PaymentSessionState};
use crate::config::StripeConfig;

/// Stripe API base URL.
const API_BASE: &str = "https://api.stripe.com/v1";

/// Separator between the intent ID and the secret suffix in a client secret
/// (`pi_123_secret_456`).
const CLIENT_SECRET_SEPARATOR: &str = "_secret_";

/// A payment intent as returned by the processor.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    pub status: String,
}

impl PaymentIntent {
    /// The intent's lifecycle state as tracked by the checkout flow.
    #[must_use]
    pub fn state(&self) -> PaymentSessionState {
        PaymentSessionState::from_status(&self.status)
    }
}

/// Server-side client for the Stripe payment intents API.
#[derive(Clone)]
pub struct StripeClient {
    client: reqwest::Client,
    /// Publishable key, exposed to the browser for the payment element.
    publishable_key: String,
}

impl StripeClient {
    /// Create a new payment intents client.
    ///
    /// # Errors
    ///
    /// Returns an error if the secret key is not a valid header value or the
    /// HTTP client fails to build.
    pub fn new(config: &StripeConfig) -> Result<Self, PaymentError> {
        let mut headers = HeaderMap::new();
        let auth = format!("Bearer {}", config.secret_key.expose_secret());
        let mut auth_value = HeaderValue::from_str(&auth)
            .map_err(|e| PaymentError::Parse(format!("Invalid secret key format: {e}")))?;
        auth_value.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth_value);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            publishable_key: config.publishable_key.clone(),
        })
    }

    /// The publishable key for mounting the payment element in the browser.
    #[must_use]
    pub fn publishable_key(&self) -> &str {
        &self.publishable_key
    }

    /// Extract the intent ID from a client secret.
    #[must_use]
    pub fn intent_id_from_client_secret(client_secret: &str) -> Option<&str> {
        let (id, _) = client_secret.split_once(CLIENT_SECRET_SEPARATOR)?;
        if id.is_empty() { None } else { Some(id) }
    }

    /// Retrieve the payment intent referenced by a client secret.
    ///
    /// # Errors
    ///
    /// Returns `InvalidClientSecret` for a malformed secret, or an API/parse
    /// error from the processor.
    #[instrument(skip(self, client_secret))]
    pub async fn retrieve_payment_intent(
        &self,
        client_secret: &str,
    ) -> Result<PaymentIntent, PaymentError> {
        let intent_id = Self::intent_id_from_client_secret(client_secret)
            .ok_or(PaymentError::InvalidClientSecret)?;

        let url = format!("{API_BASE}/payment_intents/{intent_id}");
        let response = self.client.get(&url).send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(PaymentError::Api {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json()
            .await
            .map_err(|e| PaymentError::Parse(e.to_string()))
    }
}

impl IntentStatusSource for StripeClient {
    async fn intent_status(&self, client_secret: &str) -> Result<PaymentSessionState, PaymentError> {
        let intent = self.retrieve_payment_intent(client_secret).await?;
        Ok(intent.state())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::SecretString;

    #[test]
    fn test_intent_id_from_client_secret() {
        assert_eq!(
            StripeClient::intent_id_from_client_secret("pi_3ABC_secret_XYZ"),
            Some("pi_3ABC")
        );
        assert_eq!(StripeClient::intent_id_from_client_secret("pi_3ABC"), None);
        assert_eq!(
            StripeClient::intent_id_from_client_secret("_secret_XYZ"),
            None
        );
        assert_eq!(StripeClient::intent_id_from_client_secret(""), None);
    }

    #[test]
    fn test_intent_state_mapping() {
        let intent = PaymentIntent {
            id: "pi_1".to_owned(),
            status: "succeeded".to_owned(),
        };
        assert_eq!(intent.state(), PaymentSessionState::Succeeded);
    }

    #[test]
    fn test_client_construction() {
        let config = StripeConfig {
            secret_key: SecretString::from("sk_test_4eC39HqLyjWDarjtT1zdp7dc"),
            publishable_key: "pk_test_TYooMQauvdEDq54NiTphI7jx".to_owned(),
        };
        let client = StripeClient::new(&config).expect("client");
        assert_eq!(client.publishable_key(), "pk_test_TYooMQauvdEDq54NiTphI7jx");
    }
}

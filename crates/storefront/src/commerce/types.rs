//! Domain types for the commerce Store API.
//!
//! These mirror the backend's JSON shapes. Monetary amounts arrive in minor
//! units (cents); views convert them through [`tidepool_core::Money`] for
//! display.

use serde::{Deserialize, Serialize};
use tidepool_core::{CartId, CurrencyCode, Money, OrderId};

// =============================================================================
// Addresses
// =============================================================================

/// Address payload submitted to the cart.
///
/// Also used verbatim for the billing address: this storefront always treats
/// billing as equal to shipping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressInput {
    pub first_name: String,
    pub last_name: String,
    pub address_1: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_2: Option<String>,
    pub city: String,
    pub postal_code: String,
    /// Lowercase ISO 3166-1 alpha-2 code.
    pub country_code: String,
    /// E.164-normalized phone number, when one was provided.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// Address as persisted on the cart. The backend may return partial records,
/// so every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CartAddress {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub address_1: Option<String>,
    pub address_2: Option<String>,
    pub city: Option<String>,
    pub postal_code: Option<String>,
    pub country_code: Option<String>,
    pub phone: Option<String>,
}

/// Patch applied to the cart when the address step is submitted.
#[derive(Debug, Clone, Serialize)]
pub struct CartUpdate {
    pub email: String,
    pub shipping_address: AddressInput,
    pub billing_address: AddressInput,
}

// =============================================================================
// Cart
// =============================================================================

/// A line item on the cart.
#[derive(Debug, Clone, Deserialize)]
pub struct LineItem {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub thumbnail: Option<String>,
    pub quantity: u32,
    /// Per-unit price in minor units.
    pub unit_price: i64,
    /// Line total in minor units.
    pub total: Option<i64>,
}

/// A shipping method attached to the cart.
#[derive(Debug, Clone, Deserialize)]
pub struct CartShippingMethod {
    pub id: String,
    pub shipping_option_id: Option<String>,
    /// Price in minor units.
    pub price: Option<i64>,
}

/// The customer's in-progress order, owned by the commerce backend.
#[derive(Debug, Clone, Deserialize)]
pub struct Cart {
    pub id: CartId,
    pub email: Option<String>,
    #[serde(default)]
    pub currency_code: Option<String>,
    #[serde(default)]
    pub items: Vec<LineItem>,
    pub shipping_address: Option<CartAddress>,
    pub billing_address: Option<CartAddress>,
    #[serde(default)]
    pub shipping_methods: Vec<CartShippingMethod>,
    /// Item subtotal in minor units.
    pub subtotal: Option<i64>,
    /// Shipping total in minor units.
    pub shipping_total: Option<i64>,
    /// Grand total in minor units.
    pub total: Option<i64>,
}

impl Cart {
    /// Whether a usable shipping address is on the cart. The address step is
    /// complete only when the first address line is non-empty.
    #[must_use]
    pub fn has_address(&self) -> bool {
        self.shipping_address
            .as_ref()
            .and_then(|address| address.address_1.as_deref())
            .is_some_and(|line| !line.trim().is_empty())
    }

    /// Whether at least one shipping method is attached.
    #[must_use]
    pub fn has_shipping_method(&self) -> bool {
        !self.shipping_methods.is_empty()
    }

    /// The cart's currency, defaulting to the store currency.
    #[must_use]
    pub fn currency(&self) -> CurrencyCode {
        self.currency_code
            .as_deref()
            .map_or_else(CurrencyCode::default, CurrencyCode::from_code_or_default)
    }

    /// Total number of units across all line items.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }

    /// Item subtotal as display money.
    #[must_use]
    pub fn subtotal_money(&self) -> Money {
        Money::from_minor_units(self.subtotal.unwrap_or(0), self.currency())
    }

    /// Grand total as display money.
    #[must_use]
    pub fn total_money(&self) -> Money {
        Money::from_minor_units(self.total.unwrap_or(0), self.currency())
    }
}

// =============================================================================
// Shipping options
// =============================================================================

/// A shipping option the customer can pick on the delivery step.
#[derive(Debug, Clone, Deserialize)]
pub struct ShippingOption {
    pub id: String,
    pub name: String,
    /// Price in minor units.
    pub amount: Option<i64>,
}

impl ShippingOption {
    /// Option price as display money.
    #[must_use]
    pub fn price_money(&self, currency: CurrencyCode) -> Money {
        Money::from_minor_units(self.amount.unwrap_or(0), currency)
    }
}

// =============================================================================
// Payment sessions and orders
// =============================================================================

/// A payment session initiated with a provider for the cart.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentSession {
    pub provider_id: String,
    /// Provider-specific session data.
    #[serde(default)]
    pub data: serde_json::Value,
}

impl PaymentSession {
    /// The hosted payment element's client secret, when the provider
    /// supplied one.
    #[must_use]
    pub fn client_secret(&self) -> Option<&str> {
        self.data
            .get("client_secret")
            .and_then(serde_json::Value::as_str)
    }
}

/// A placed order.
#[derive(Debug, Clone, Deserialize)]
pub struct Order {
    pub id: OrderId,
    /// Short human-facing order number.
    pub display_id: Option<i64>,
}

// =============================================================================
// Response envelopes
// =============================================================================

#[derive(Debug, Deserialize)]
pub(crate) struct CartEnvelope {
    pub cart: Cart,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ShippingOptionsEnvelope {
    pub shipping_options: Vec<ShippingOption>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PaymentSessionEnvelope {
    pub payment_session: PaymentSession,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OrderEnvelope {
    pub order: Order,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn cart_json(address_line: Option<&str>, methods: usize) -> String {
        let address = address_line.map_or("null".to_owned(), |line| {
            format!("{{\"address_1\": \"{line}\", \"country_code\": \"us\"}}")
        });
        let methods: Vec<String> = (0..methods)
            .map(|i| format!("{{\"id\": \"sm_{i}\", \"shipping_option_id\": \"so_{i}\"}}"))
            .collect();
        format!(
            "{{\"id\": \"cart_01\", \"email\": null, \"currency_code\": \"usd\", \
             \"shipping_address\": {address}, \"billing_address\": null, \
             \"shipping_methods\": [{}], \"subtotal\": 2500, \"total\": 3000}}",
            methods.join(",")
        )
    }

    #[test]
    fn test_has_address() {
        let cart: Cart = serde_json::from_str(&cart_json(Some("1 Main St"), 0)).unwrap();
        assert!(cart.has_address());

        let cart: Cart = serde_json::from_str(&cart_json(None, 0)).unwrap();
        assert!(!cart.has_address());

        // A present but empty first line does not complete the address step
        let cart: Cart = serde_json::from_str(&cart_json(Some(""), 0)).unwrap();
        assert!(!cart.has_address());
    }

    #[test]
    fn test_has_shipping_method() {
        let cart: Cart = serde_json::from_str(&cart_json(Some("1 Main St"), 1)).unwrap();
        assert!(cart.has_shipping_method());

        let cart: Cart = serde_json::from_str(&cart_json(Some("1 Main St"), 0)).unwrap();
        assert!(!cart.has_shipping_method());
    }

    #[test]
    fn test_money_accessors() {
        let cart: Cart = serde_json::from_str(&cart_json(None, 0)).unwrap();
        assert_eq!(cart.subtotal_money().display(), "$25.00");
        assert_eq!(cart.total_money().display(), "$30.00");
    }

    #[test]
    fn test_payment_session_client_secret() {
        let session: PaymentSession = serde_json::from_str(
            "{\"provider_id\": \"stripe\", \"data\": {\"client_secret\": \"pi_1_secret_2\"}}",
        )
        .unwrap();
        assert_eq!(session.client_secret(), Some("pi_1_secret_2"));

        let session: PaymentSession =
            serde_json::from_str("{\"provider_id\": \"manual\", \"data\": {}}").unwrap();
        assert_eq!(session.client_secret(), None);
    }

    #[test]
    fn test_address_input_skips_absent_optionals() {
        let input = AddressInput {
            first_name: "Ada".to_owned(),
            last_name: "Lovelace".to_owned(),
            address_1: "1 Main St".to_owned(),
            address_2: None,
            city: "Brooklyn".to_owned(),
            postal_code: "11201".to_owned(),
            country_code: "us".to_owned(),
            phone: None,
        };
        let json = serde_json::to_string(&input).unwrap();
        assert!(!json.contains("address_2"));
        assert!(!json.contains("phone"));
    }
}

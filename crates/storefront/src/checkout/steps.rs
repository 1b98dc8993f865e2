//! Checkout step resolution.
//!
//! The checkout flow has three sequential steps: address, delivery, payment.
//! Which step a visitor actually sees is derived from the persisted cart
//! state, never from the URL alone - a `?step=payment` request on a cart with
//! no address falls back to the address step.

use serde::{Deserialize, Serialize};

/// One of the three sequential checkout stages.
///
/// Ordered: `Address < Delivery < Payment`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckoutStep {
    /// Collect email and shipping address.
    Address,
    /// Select a shipping method.
    Delivery,
    /// Enter payment details.
    Payment,
}

impl CheckoutStep {
    /// Value used in the `step` query parameter.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Address => "address",
            Self::Delivery => "delivery",
            Self::Payment => "payment",
        }
    }

    /// Parse a `step` query parameter. Unknown values are treated as no
    /// explicit request.
    #[must_use]
    pub fn from_query(value: &str) -> Option<Self> {
        match value {
            "address" => Some(Self::Address),
            "delivery" => Some(Self::Delivery),
            "payment" => Some(Self::Payment),
            _ => None,
        }
    }
}

impl core::fmt::Display for CheckoutStep {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolve the authoritative checkout step.
///
/// `requested` is the explicit `step` query parameter, if any. `has_address`
/// means the cart has a shipping address with a non-empty first line;
/// `has_shipping_method` means at least one shipping method is attached.
///
/// Priority order, first match wins:
/// 1. Requested delivery and an address exists -> delivery
/// 2. Requested payment and both prerequisites exist -> payment
/// 3. No address -> address
/// 4. No shipping method -> delivery
/// 5. Otherwise -> payment
///
/// The resolver never reports a step whose prerequisites are unmet, and with
/// no explicit request it advances to the furthest legitimately-reachable
/// step.
#[must_use]
pub const fn resolve(
    requested: Option<CheckoutStep>,
    has_address: bool,
    has_shipping_method: bool,
) -> CheckoutStep {
    match requested {
        Some(CheckoutStep::Delivery) if has_address => CheckoutStep::Delivery,
        Some(CheckoutStep::Payment) if has_address && has_shipping_method => CheckoutStep::Payment,
        _ => {
            if !has_address {
                CheckoutStep::Address
            } else if !has_shipping_method {
                CheckoutStep::Delivery
            } else {
                CheckoutStep::Payment
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_ordering() {
        assert!(CheckoutStep::Address < CheckoutStep::Delivery);
        assert!(CheckoutStep::Delivery < CheckoutStep::Payment);
    }

    #[test]
    fn test_query_round_trip() {
        for step in [
            CheckoutStep::Address,
            CheckoutStep::Delivery,
            CheckoutStep::Payment,
        ] {
            assert_eq!(CheckoutStep::from_query(step.as_str()), Some(step));
        }
        assert_eq!(CheckoutStep::from_query("review"), None);
        assert_eq!(CheckoutStep::from_query(""), None);
    }

    /// Exhaustive table: 4 requested values x 2 x 2 cart states.
    #[test]
    fn test_resolve_exhaustive() {
        use CheckoutStep::{Address, Delivery, Payment};

        let cases = [
            // (requested, has_address, has_shipping_method, expected)
            (None, false, false, Address),
            (None, false, true, Address),
            (None, true, false, Delivery),
            (None, true, true, Payment),
            (Some(Address), false, false, Address),
            (Some(Address), false, true, Address),
            (Some(Address), true, false, Delivery),
            (Some(Address), true, true, Payment),
            (Some(Delivery), false, false, Address),
            (Some(Delivery), false, true, Address),
            (Some(Delivery), true, false, Delivery),
            (Some(Delivery), true, true, Delivery),
            (Some(Payment), false, false, Address),
            (Some(Payment), false, true, Address),
            (Some(Payment), true, false, Delivery),
            (Some(Payment), true, true, Payment),
        ];

        for (requested, has_address, has_shipping, expected) in cases {
            assert_eq!(
                resolve(requested, has_address, has_shipping),
                expected,
                "requested={requested:?} has_address={has_address} has_shipping={has_shipping}"
            );
        }
    }

    /// The resolver never advances past an unmet prerequisite.
    #[test]
    fn test_resolve_never_skips_prerequisites() {
        let requests = [
            None,
            Some(CheckoutStep::Address),
            Some(CheckoutStep::Delivery),
            Some(CheckoutStep::Payment),
        ];

        for requested in requests {
            for has_shipping in [false, true] {
                // Without an address, only the address step is reachable.
                assert_eq!(
                    resolve(requested, false, has_shipping),
                    CheckoutStep::Address
                );
            }
            // Without a shipping method, payment is never reachable.
            assert_ne!(resolve(requested, true, false), CheckoutStep::Payment);
        }
    }

    #[test]
    fn test_premature_payment_request_falls_back() {
        assert_eq!(
            resolve(Some(CheckoutStep::Payment), false, false),
            CheckoutStep::Address
        );
        assert_eq!(
            resolve(Some(CheckoutStep::Payment), true, false),
            CheckoutStep::Delivery
        );
    }

    #[test]
    fn test_resolve_is_referentially_pure() {
        let first = resolve(Some(CheckoutStep::Delivery), true, true);
        let second = resolve(Some(CheckoutStep::Delivery), true, true);
        assert_eq!(first, second);
    }
}

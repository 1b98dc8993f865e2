//! Payment confirmation state machine.
//!
//! After the hosted payment element redirects back, the intent may still be
//! settling. The confirmation flow polls the processor with a bounded
//! exponential backoff (not an unbounded reload loop) and converts the final
//! intent state into exactly one page outcome.
//!
//! The one hard invariant: `place_order` is invoked at most once per
//! confirmation, and only after the processor reports `Succeeded`. An order
//! that fails *after* payment capture is a fatal, support-contact outcome -
//! automatic retry risks ambiguity about charge/order correlation.

use std::future::Future;
use std::time::Duration;

use tidepool_core::CartId;
use tracing::{error, warn};

use crate::commerce::CommerceError;
use crate::commerce::types::Order;
use crate::payments::PaymentError;

/// Payment intent lifecycle state, mirrored from the processor.
///
/// Transient: tracked only for the duration of one confirmation page visit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentSessionState {
    /// The processor is still settling the payment.
    Processing,
    /// Payment captured; the order may be placed.
    Succeeded,
    /// The attempt failed; the customer must retry with another method.
    RequiresPaymentMethod,
    /// Any status this flow does not handle (carries the raw value).
    Unexpected(String),
}

impl PaymentSessionState {
    /// Map a processor status string onto the states this flow handles.
    #[must_use]
    pub fn from_status(status: &str) -> Self {
        match status {
            "processing" => Self::Processing,
            "succeeded" => Self::Succeeded,
            "requires_payment_method" => Self::RequiresPaymentMethod,
            other => Self::Unexpected(other.to_owned()),
        }
    }
}

/// Reads the authoritative intent state from the payment processor.
pub trait IntentStatusSource {
    /// Current state of the intent referenced by `client_secret`.
    fn intent_status(
        &self,
        client_secret: &str,
    ) -> impl Future<Output = Result<PaymentSessionState, PaymentError>> + Send;
}

/// Places the order for a cart whose payment has been captured.
pub trait OrderPlacer {
    /// Complete the cart into an order.
    fn place_order(
        &self,
        cart_id: &CartId,
    ) -> impl Future<Output = Result<Order, CommerceError>> + Send;
}

impl OrderPlacer for crate::commerce::CommerceClient {
    async fn place_order(&self, cart_id: &CartId) -> Result<Order, CommerceError> {
        Self::place_order(self, cart_id).await
    }
}

/// Polling schedule for a still-processing intent.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total status checks before giving up.
    pub max_attempts: u32,
    /// Delay before the second check; doubles on each further check.
    pub initial_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_delay: Duration::from_secs(2),
        }
    }
}

/// Terminal result of one confirmation page visit.
#[derive(Debug)]
pub enum ConfirmationOutcome {
    /// Payment captured and order placed.
    OrderPlaced(Order),
    /// Payment captured but order placement failed. Fatal: the customer must
    /// contact support; never auto-retried.
    OrderFailed(CommerceError),
    /// The attempt failed; send the customer back to the payment step.
    RetryPayment,
    /// The processor reported a status this flow does not handle.
    UnexpectedStatus(String),
    /// Still processing after the retry budget was exhausted.
    StillProcessing {
        /// How many status checks were made.
        attempts: u32,
    },
    /// The intent status could not be read at all.
    Unavailable(PaymentError),
}

/// Drive a payment confirmation to its terminal outcome.
///
/// Polls `intents` while the processor reports `Processing`, sleeping
/// `policy.initial_delay` (doubling each round) between checks, up to
/// `policy.max_attempts` checks. Every other state resolves immediately.
pub async fn run_confirmation<I, O>(
    intents: &I,
    orders: &O,
    cart_id: &CartId,
    client_secret: &str,
    policy: RetryPolicy,
) -> ConfirmationOutcome
where
    I: IntentStatusSource,
    O: OrderPlacer,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut delay = policy.initial_delay;

    for attempt in 1..=max_attempts {
        let state = match intents.intent_status(client_secret).await {
            Ok(state) => state,
            Err(e) => {
                warn!(error = %e, "failed to read payment intent status");
                return ConfirmationOutcome::Unavailable(e);
            }
        };

        match state {
            PaymentSessionState::Succeeded => {
                // Single transition out of Succeeded: place_order runs once.
                return match orders.place_order(cart_id).await {
                    Ok(order) => ConfirmationOutcome::OrderPlaced(order),
                    Err(e) => {
                        error!(
                            cart_id = %cart_id,
                            error = %e,
                            "order placement failed after payment capture"
                        );
                        ConfirmationOutcome::OrderFailed(e)
                    }
                };
            }
            PaymentSessionState::RequiresPaymentMethod => {
                return ConfirmationOutcome::RetryPayment;
            }
            PaymentSessionState::Unexpected(raw) => {
                warn!(status = %raw, "unexpected payment intent status");
                return ConfirmationOutcome::UnexpectedStatus(raw);
            }
            PaymentSessionState::Processing => {
                if attempt < max_attempts {
                    tokio::time::sleep(delay).await;
                    delay = delay.saturating_mul(2);
                }
            }
        }
    }

    ConfirmationOutcome::StillProcessing {
        attempts: max_attempts,
    }
}

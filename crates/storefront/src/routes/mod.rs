//! HTTP route handlers.
//!
//! Route table:
//!
//! | Method | Path                        | Handler                            |
//! |--------|-----------------------------|------------------------------------|
//! | GET    | `/health`                   | [`health`]                         |
//! | GET    | `/cart`                     | [`cart::show`]                     |
//! | GET    | `/checkout`                 | [`checkout::show`]                 |
//! | POST   | `/checkout/address`         | [`checkout::submit_address`]       |
//! | POST   | `/checkout/shipping-method` | [`checkout::submit_shipping_method`] |
//! | GET    | `/checkout/confirmation`    | [`checkout::confirmation`]         |
//!
//! Checkout mutations sit behind the per-IP rate limiter; reads do not.

use axum::{
    Router,
    routing::{get, post},
};

use crate::middleware::checkout_rate_limiter;
use crate::state::AppState;

pub mod cart;
pub mod checkout;

/// Liveness probe.
pub async fn health() -> &'static str {
    "OK"
}

/// Assemble the application router.
pub fn router() -> Router<AppState> {
    let checkout_mutations = Router::new()
        .route("/checkout/address", post(checkout::submit_address))
        .route(
            "/checkout/shipping-method",
            post(checkout::submit_shipping_method),
        )
        .layer(checkout_rate_limiter());

    Router::new()
        .route("/health", get(health))
        .route("/cart", get(cart::show))
        .route("/checkout", get(checkout::show))
        .route("/checkout/confirmation", get(checkout::confirmation))
        .merge(checkout_mutations)
}

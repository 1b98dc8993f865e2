//! Cart route handlers.
//!
//! The cart itself is owned by the commerce backend; the session holds only
//! the opaque cart ID. The cart page is the entry point into checkout.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tidepool_core::CartId;
use tower_sessions::Session;
use tracing::instrument;

use crate::commerce::types::{Cart, LineItem};
use crate::models::session_keys;
use crate::state::AppState;

/// Cart item display data for templates.
#[derive(Clone)]
pub struct CartItemView {
    pub title: String,
    pub description: Option<String>,
    pub thumbnail: Option<String>,
    pub quantity: u32,
    pub price: String,
    pub line_price: String,
}

/// Cart display data for templates.
#[derive(Clone)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub subtotal: String,
    pub item_count: u32,
}

impl CartView {
    /// Create an empty cart.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            subtotal: "$0.00".to_string(),
            item_count: 0,
        }
    }
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        let currency = cart.currency();
        Self {
            items: cart
                .items
                .iter()
                .map(|line| CartItemView::from_line(line, currency))
                .collect(),
            subtotal: cart.subtotal_money().display(),
            item_count: cart.item_count(),
        }
    }
}

impl CartItemView {
    fn from_line(line: &LineItem, currency: tidepool_core::CurrencyCode) -> Self {
        let unit = tidepool_core::Money::from_minor_units(line.unit_price, currency);
        let total = tidepool_core::Money::from_minor_units(
            line.total
                .unwrap_or_else(|| line.unit_price * i64::from(line.quantity)),
            currency,
        );
        Self {
            title: line.title.clone(),
            description: line.description.clone(),
            thumbnail: line.thumbnail.clone(),
            quantity: line.quantity,
            price: unit.display(),
            line_price: total.display(),
        }
    }
}

// =============================================================================
// Session Helpers
// =============================================================================

/// Get the cart ID from the session.
pub(crate) async fn get_cart_id(session: &Session) -> Option<CartId> {
    session
        .get::<String>(session_keys::CART_ID)
        .await
        .ok()
        .flatten()
        .map(CartId::new)
}

/// Set the cart ID in the session.
pub(crate) async fn set_cart_id(
    session: &Session,
    cart_id: &str,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::CART_ID, cart_id).await
}

/// Clear the cart ID from the session (after order placement or expiry).
pub(crate) async fn clear_cart_id(session: &Session) {
    if let Err(e) = session.remove::<String>(session_keys::CART_ID).await {
        tracing::warn!("Failed to clear cart ID from session: {e}");
    }
}

/// Cart page query parameters.
#[derive(Debug, Deserialize)]
pub struct CartQuery {
    /// Cart recovery link parameter (e.g., from an abandoned-cart email).
    pub cart_id: Option<String>,
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub cart: CartView,
}

/// Display cart page.
///
/// A `cart_id` query parameter (recovery link) replaces the session's cart
/// reference and redirects to the clean URL.
#[instrument(skip(state, session))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<CartQuery>,
) -> Response {
    if let Some(recovered) = query.cart_id.as_deref() {
        if let Err(e) = set_cart_id(&session, recovered).await {
            tracing::error!("Failed to save cart ID to session: {e}");
        }
        return Redirect::to("/cart").into_response();
    }

    let cart = match get_cart_id(&session).await {
        Some(cart_id) => match state.commerce().get_cart(&cart_id).await {
            Ok(cart) => CartView::from(&cart),
            Err(e) => {
                tracing::warn!("Failed to fetch cart {cart_id}: {e}");
                CartView::empty()
            }
        },
        None => CartView::empty(),
    };

    CartShowTemplate { cart }.into_response()
}

//! Checkout route handlers.
//!
//! Checkout is a three-step flow (address, delivery, payment) over a single
//! URL: `GET /checkout?step=...`. The server resolves the effective step from
//! the cart's state on every request, so a bookmarked or stale URL can never
//! skip a prerequisite. Mutations POST to their own paths and redirect back
//! into the resolved flow.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tidepool_core::CartId;
use tower_sessions::Session;
use tracing::instrument;

use super::cart::{clear_cart_id, get_cart_id};
use crate::checkout::address::{self, AddressForm, FieldErrors, SubmitOutcome};
use crate::checkout::payment::{ConfirmationOutcome, RetryPolicy, run_confirmation};
use crate::checkout::{CheckoutStep, countries, phone, resolve};
use crate::commerce::CommerceError;
use crate::commerce::types::Cart;
use crate::error::AppError;
use crate::state::AppState;

/// Provider ID the commerce backend uses for its Stripe plugin.
const STRIPE_PROVIDER_ID: &str = "stripe";

// =============================================================================
// Templates
// =============================================================================

/// Address step page.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/address.html")]
pub struct AddressPageTemplate {
    pub form: AddressForm,
    pub errors: FieldErrors,
    pub form_error: Option<String>,
    pub countries: &'static [countries::CountryEntry],
    pub phone_placeholder: String,
    pub phone_required: bool,
}

/// A shipping option row on the delivery step.
pub struct ShippingOptionView {
    pub id: String,
    pub name: String,
    pub price: String,
    pub selected: bool,
}

/// Delivery step page.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/delivery.html")]
pub struct DeliveryPageTemplate {
    pub options: Vec<ShippingOptionView>,
    pub total: String,
    pub form_error: Option<String>,
}

/// Payment step page. Mounts the hosted payment element in the browser.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/payment.html")]
pub struct PaymentPageTemplate {
    pub client_secret: String,
    pub publishable_key: String,
    pub total: String,
    pub return_url: String,
}

/// Order confirmation page.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/confirmed.html")]
pub struct ConfirmedTemplate {
    pub order_number: String,
}

/// Payment captured but order placement failed. Support contact required.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/order_failed.html")]
pub struct OrderFailedTemplate {
    pub support_email: String,
}

/// Payment attempt failed; sends the customer back to the payment step.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/retry_payment.html")]
pub struct RetryPaymentTemplate;

/// Payment still settling after the polling budget ran out.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/processing.html")]
pub struct ProcessingTemplate {
    pub support_email: String,
}

/// Generic checkout dead-end page.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/error.html")]
pub struct CheckoutErrorTemplate {
    pub message: String,
    pub support_email: String,
}

// =============================================================================
// Step resolution and display
// =============================================================================

/// Checkout page query parameters.
#[derive(Debug, Deserialize)]
pub struct StepQuery {
    pub step: Option<String>,
}

/// Display the checkout page at the step the cart has actually earned.
#[instrument(skip(state, session))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<StepQuery>,
) -> Result<Response, AppError> {
    let Some(cart_id) = get_cart_id(&session).await else {
        return Ok(Redirect::to("/cart").into_response());
    };

    let cart = match fetch_cart(&state, &session, &cart_id).await? {
        Some(cart) => cart,
        None => return Ok(Redirect::to("/cart").into_response()),
    };

    if cart.items.is_empty() {
        // Nothing to check out
        return Ok(Redirect::to("/cart").into_response());
    }

    let requested = query.step.as_deref().and_then(CheckoutStep::from_query);
    let step = resolve(requested, cart.has_address(), cart.has_shipping_method());

    match step {
        CheckoutStep::Address => {
            Ok(address_page(prefill_form(&cart), FieldErrors::new(), None))
        }
        CheckoutStep::Delivery => delivery_page(&state, &cart, None).await,
        CheckoutStep::Payment => payment_page(&state, &cart).await,
    }
}

/// Fetch the cart, treating an expired cart as "start over" rather than an
/// error page.
async fn fetch_cart(
    state: &AppState,
    session: &Session,
    cart_id: &CartId,
) -> Result<Option<Cart>, AppError> {
    match state.commerce().get_cart(cart_id).await {
        Ok(cart) => Ok(Some(cart)),
        Err(CommerceError::CartNotFound(_)) => {
            clear_cart_id(session).await;
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

/// Prefill the address form from what the cart already carries.
fn prefill_form(cart: &Cart) -> AddressForm {
    let address = cart.shipping_address.clone().unwrap_or_default();
    let country_code = address
        .country_code
        .unwrap_or_else(|| countries::HOME_COUNTRY.to_owned());
    let phone = address
        .phone
        .map(|p| phone::to_national_display(&p, &country_code))
        .unwrap_or_default();

    AddressForm {
        email: cart.email.clone().unwrap_or_default(),
        first_name: address.first_name.unwrap_or_default(),
        last_name: address.last_name.unwrap_or_default(),
        address_1: address.address_1.unwrap_or_default(),
        address_2: address.address_2.unwrap_or_default(),
        city: address.city.unwrap_or_default(),
        postal_code: address.postal_code.unwrap_or_default(),
        country_code,
        phone,
    }
}

fn address_page(form: AddressForm, errors: FieldErrors, form_error: Option<String>) -> Response {
    let phone_placeholder = phone::example_placeholder(&form.country_code);
    let phone_required = matches!(
        phone::PhoneRequirement::for_country(&form.country_code),
        phone::PhoneRequirement::Required
    );

    AddressPageTemplate {
        form,
        errors,
        form_error,
        countries: countries::list(),
        phone_placeholder,
        phone_required,
    }
    .into_response()
}

async fn delivery_page(
    state: &AppState,
    cart: &Cart,
    form_error: Option<String>,
) -> Result<Response, AppError> {
    let options = state.commerce().list_shipping_options(&cart.id).await?;
    let currency = cart.currency();

    let options = options
        .into_iter()
        .map(|option| {
            let selected = cart
                .shipping_methods
                .iter()
                .any(|method| method.shipping_option_id.as_deref() == Some(option.id.as_str()));
            ShippingOptionView {
                price: option.price_money(currency).display(),
                id: option.id,
                name: option.name,
                selected,
            }
        })
        .collect();

    Ok(DeliveryPageTemplate {
        options,
        total: cart.total_money().display(),
        form_error,
    }
    .into_response())
}

async fn payment_page(state: &AppState, cart: &Cart) -> Result<Response, AppError> {
    let Some(stripe) = state.payments() else {
        return Err(AppError::Internal(
            "payment processor is not configured".to_owned(),
        ));
    };

    let payment_session = state
        .commerce()
        .initiate_payment_session(&cart.id, STRIPE_PROVIDER_ID)
        .await?;
    let Some(client_secret) = payment_session.client_secret() else {
        return Err(AppError::Internal(
            "payment session did not include a client secret".to_owned(),
        ));
    };

    Ok(PaymentPageTemplate {
        client_secret: client_secret.to_owned(),
        publishable_key: stripe.publishable_key().to_owned(),
        total: cart.total_money().display(),
        return_url: format!("{}/checkout/confirmation", state.config().base_url),
    }
    .into_response())
}

// =============================================================================
// Address submission
// =============================================================================

/// Handle the address form POST.
///
/// Validation failures re-render the form with every field error at once; the
/// cart is only patched by a fully valid submission.
#[instrument(skip(state, session, form))]
pub async fn submit_address(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<AddressForm>,
) -> Result<Response, AppError> {
    let Some(cart_id) = get_cart_id(&session).await else {
        return Ok(Redirect::to("/cart").into_response());
    };

    match address::submit(state.commerce(), &cart_id, &form).await {
        SubmitOutcome::Saved => Ok(Redirect::to("/checkout?step=delivery").into_response()),
        SubmitOutcome::Invalid(errors) => Ok(address_page(form, errors, None)),
        SubmitOutcome::CartExpired => {
            clear_cart_id(&session).await;
            Ok(Redirect::to("/cart").into_response())
        }
        SubmitOutcome::Failed(e) => {
            tracing::warn!(cart_id = %cart_id, error = %e, "cart address update failed");
            Ok(address_page(
                form,
                FieldErrors::new(),
                Some("We couldn't save your address. Please try again.".to_owned()),
            ))
        }
    }
}

// =============================================================================
// Shipping method submission
// =============================================================================

/// Shipping method form body.
#[derive(Debug, Deserialize)]
pub struct ShippingMethodForm {
    #[serde(default)]
    pub option_id: String,
}

/// Handle the shipping method POST.
#[instrument(skip(state, session))]
pub async fn submit_shipping_method(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<ShippingMethodForm>,
) -> Result<Response, AppError> {
    let Some(cart_id) = get_cart_id(&session).await else {
        return Ok(Redirect::to("/cart").into_response());
    };

    let cart = match fetch_cart(&state, &session, &cart_id).await? {
        Some(cart) => cart,
        None => return Ok(Redirect::to("/cart").into_response()),
    };

    if !cart.has_address() {
        // Prerequisite not met; fall back into the resolved flow
        return Ok(Redirect::to("/checkout").into_response());
    }

    let option_id = form.option_id.trim();
    if option_id.is_empty() {
        return delivery_page(
            &state,
            &cart,
            Some("Please choose a shipping method".to_owned()),
        )
        .await;
    }

    match state
        .commerce()
        .add_shipping_method(&cart_id, option_id)
        .await
    {
        Ok(_) => Ok(Redirect::to("/checkout?step=payment").into_response()),
        Err(CommerceError::CartNotFound(_)) => {
            clear_cart_id(&session).await;
            Ok(Redirect::to("/cart").into_response())
        }
        Err(e) => {
            tracing::warn!(cart_id = %cart_id, error = %e, "adding shipping method failed");
            delivery_page(
                &state,
                &cart,
                Some("That shipping method is unavailable. Please choose another.".to_owned()),
            )
            .await
        }
    }
}

// =============================================================================
// Confirmation
// =============================================================================

/// Confirmation page query parameters, as appended by the payment element's
/// redirect.
#[derive(Debug, Deserialize)]
pub struct ConfirmQuery {
    pub payment_intent_client_secret: Option<String>,
}

/// Handle the return from the hosted payment element.
///
/// Polls the processor until the intent settles, places the order on success,
/// and renders exactly one terminal page per visit.
#[instrument(skip(state, session, query))]
pub async fn confirmation(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<ConfirmQuery>,
) -> Result<Response, AppError> {
    let Some(cart_id) = get_cart_id(&session).await else {
        return Ok(Redirect::to("/cart").into_response());
    };

    let Some(stripe) = state.payments() else {
        return Err(AppError::Internal(
            "payment processor is not configured".to_owned(),
        ));
    };

    let client_secret = query
        .payment_intent_client_secret
        .as_deref()
        .map(str::trim)
        .filter(|secret| !secret.is_empty());
    let Some(client_secret) = client_secret else {
        return Err(AppError::BadRequest(
            "Missing payment_intent_client_secret".to_owned(),
        ));
    };

    let support_email = state.config().support_email.clone();
    let outcome = run_confirmation(
        stripe,
        state.commerce(),
        &cart_id,
        client_secret,
        RetryPolicy::default(),
    )
    .await;

    let page = match outcome {
        ConfirmationOutcome::OrderPlaced(order) => {
            clear_cart_id(&session).await;
            let order_number = order
                .display_id
                .map_or_else(|| order.id.to_string(), |display| format!("#{display}"));
            ConfirmedTemplate { order_number }.into_response()
        }
        ConfirmationOutcome::OrderFailed(_) => OrderFailedTemplate { support_email }.into_response(),
        ConfirmationOutcome::RetryPayment => RetryPaymentTemplate.into_response(),
        ConfirmationOutcome::StillProcessing { attempts } => {
            tracing::warn!(cart_id = %cart_id, attempts, "payment still processing at timeout");
            ProcessingTemplate { support_email }.into_response()
        }
        ConfirmationOutcome::UnexpectedStatus(_) => CheckoutErrorTemplate {
            message: "We couldn't confirm your payment. If you were charged, your order \
                      will appear shortly."
                .to_owned(),
            support_email,
        }
        .into_response(),
        ConfirmationOutcome::Unavailable(e) => return Err(e.into()),
    };

    Ok(page)
}

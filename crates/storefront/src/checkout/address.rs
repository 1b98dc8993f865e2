//! Shipping address form validation.
//!
//! Validation is atomic: every field is checked before any error is surfaced,
//! so the customer sees all problems at once instead of fixing them one
//! resubmit at a time. Only a fully valid form produces a cart patch, and the
//! patch always sets billing equal to shipping.

use std::collections::BTreeMap;
use std::future::Future;

use serde::Deserialize;
use tidepool_core::{CartId, Email};

use super::countries;
use super::phone::{self, PhoneRequirement};
use crate::commerce::CommerceError;
use crate::commerce::types::{AddressInput, Cart, CartUpdate};

/// Raw shipping address form as POSTed by the checkout page.
#[derive(Debug, Clone, Deserialize)]
pub struct AddressForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub address_1: String,
    #[serde(default)]
    pub address_2: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub postal_code: String,
    #[serde(default = "default_country")]
    pub country_code: String,
    #[serde(default)]
    pub phone: String,
}

fn default_country() -> String {
    countries::HOME_COUNTRY.to_owned()
}

impl Default for AddressForm {
    fn default() -> Self {
        Self {
            email: String::new(),
            first_name: String::new(),
            last_name: String::new(),
            address_1: String::new(),
            address_2: String::new(),
            city: String::new(),
            postal_code: String::new(),
            country_code: default_country(),
            phone: String::new(),
        }
    }
}

/// Field-keyed validation errors, ordered by field name for stable rendering.
pub type FieldErrors = BTreeMap<&'static str, String>;

/// A fully validated address submission.
#[derive(Debug, Clone)]
pub struct ValidatedAddress {
    /// Customer email for the cart.
    pub email: Email,
    /// Shipping address with the phone normalized to E.164.
    pub shipping_address: AddressInput,
}

impl ValidatedAddress {
    /// Build the cart patch. Billing is always set equal to shipping.
    #[must_use]
    pub fn into_cart_update(self) -> CartUpdate {
        CartUpdate {
            email: self.email.into_inner(),
            billing_address: self.shipping_address.clone(),
            shipping_address: self.shipping_address,
        }
    }
}

impl AddressForm {
    /// Validate every field and, on success, produce the normalized address.
    ///
    /// # Errors
    ///
    /// Returns the full map of per-field messages when any field fails. No
    /// field check short-circuits another.
    pub fn validate(&self) -> Result<ValidatedAddress, FieldErrors> {
        let mut errors = FieldErrors::new();

        let first_name = self.first_name.trim();
        if first_name.is_empty() {
            errors.insert("first_name", "First name is required".to_owned());
        }

        let last_name = self.last_name.trim();
        if last_name.is_empty() {
            errors.insert("last_name", "Last name is required".to_owned());
        }

        let address_1 = self.address_1.trim();
        if address_1.is_empty() {
            errors.insert("address_1", "Address is required".to_owned());
        }

        let city = self.city.trim();
        if city.is_empty() {
            errors.insert("city", "City is required".to_owned());
        }

        let postal_code = self.postal_code.trim();
        if postal_code.is_empty() {
            errors.insert("postal_code", "Postal code is required".to_owned());
        }

        let country_code = self.country_code.trim().to_ascii_lowercase();
        if country_code.is_empty() {
            errors.insert("country_code", "Country is required".to_owned());
        } else if !countries::is_supported(&country_code) {
            errors.insert(
                "country_code",
                "We do not ship to this country yet".to_owned(),
            );
        }

        let email_input = self.email.trim().to_lowercase();
        let email = if email_input.is_empty() {
            errors.insert("email", "Email is required".to_owned());
            None
        } else {
            match Email::parse(&email_input) {
                Ok(email) => Some(email),
                Err(_) => {
                    errors.insert("email", "Please enter a valid email address".to_owned());
                    None
                }
            }
        };

        let phone_input = self.phone.trim();
        let requirement = PhoneRequirement::for_country(&country_code);
        if let Some(message) = phone::validate_with_message(phone_input, &country_code, requirement)
        {
            errors.insert("phone", message);
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        let Some(email) = email else {
            // Unreachable in practice: a missing email was recorded above.
            return Err(errors);
        };
        let normalized_phone = if phone_input.is_empty() {
            None
        } else {
            Some(phone::to_e164(phone_input, &country_code))
        };

        Ok(ValidatedAddress {
            email,
            shipping_address: AddressInput {
                first_name: first_name.to_owned(),
                last_name: last_name.to_owned(),
                address_1: address_1.to_owned(),
                address_2: non_empty(self.address_2.trim()),
                city: city.to_owned(),
                postal_code: postal_code.to_owned(),
                country_code,
                phone: normalized_phone,
            },
        })
    }
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_owned())
    }
}

/// Persists an address patch onto a cart.
pub trait CartUpdater {
    /// Apply the patch to the cart.
    fn update_cart(
        &self,
        cart_id: &CartId,
        update: &CartUpdate,
    ) -> impl Future<Output = Result<Cart, CommerceError>> + Send;
}

impl CartUpdater for crate::commerce::CommerceClient {
    async fn update_cart(&self, cart_id: &CartId, update: &CartUpdate) -> Result<Cart, CommerceError> {
        Self::update_cart(self, cart_id, update).await
    }
}

/// Terminal result of one address form submission.
#[derive(Debug)]
pub enum SubmitOutcome {
    /// Address persisted; the delivery step is next.
    Saved,
    /// Validation failed; the form re-renders with every field error.
    Invalid(FieldErrors),
    /// The cart no longer exists; the flow restarts.
    CartExpired,
    /// The backend rejected the patch; recoverable, the customer may retry.
    Failed(CommerceError),
}

/// Validate the form and, when it is fully valid, persist it as a cart patch.
///
/// The backend is called at most once, and only with a fully valid form. An
/// invalid form never produces an external call.
pub async fn submit<U: CartUpdater>(
    updater: &U,
    cart_id: &CartId,
    form: &AddressForm,
) -> SubmitOutcome {
    let validated = match form.validate() {
        Ok(validated) => validated,
        Err(errors) => return SubmitOutcome::Invalid(errors),
    };

    match updater.update_cart(cart_id, &validated.into_cart_update()).await {
        Ok(_) => SubmitOutcome::Saved,
        Err(CommerceError::CartNotFound(_)) => SubmitOutcome::CartExpired,
        Err(e) => SubmitOutcome::Failed(e),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    fn valid_form() -> AddressForm {
        AddressForm {
            email: "ada@example.com".to_owned(),
            first_name: "Ada".to_owned(),
            last_name: "Lovelace".to_owned(),
            address_1: "1 Analytical Way".to_owned(),
            address_2: String::new(),
            city: "Brooklyn".to_owned(),
            postal_code: "11201".to_owned(),
            country_code: "us".to_owned(),
            phone: "555-123-4567".to_owned(),
        }
    }

    #[test]
    fn test_valid_form_passes() {
        let validated = valid_form().validate().unwrap();
        assert_eq!(validated.email.as_str(), "ada@example.com");
        assert_eq!(validated.shipping_address.city, "Brooklyn");
        assert_eq!(validated.shipping_address.address_2, None);
    }

    #[test]
    fn test_phone_normalized_to_e164() {
        let validated = valid_form().validate().unwrap();
        let phone = validated.shipping_address.phone.unwrap();
        assert!(phone.starts_with("+1"), "got {phone}");
    }

    #[test]
    fn test_empty_form_reports_all_required_fields() {
        let errors = AddressForm::default().validate().unwrap_err();

        // Atomic validation: every missing field contributes a message
        for field in [
            "email",
            "first_name",
            "last_name",
            "address_1",
            "city",
            "postal_code",
        ] {
            assert!(errors.contains_key(field), "missing error for {field}");
        }
        // Default country is the home country, where phone is optional
        assert!(!errors.contains_key("phone"));
        assert!(!errors.contains_key("country_code"));
    }

    #[test]
    fn test_invalid_email() {
        let mut form = valid_form();
        form.email = "not-an-email".to_owned();
        let errors = form.validate().unwrap_err();
        assert_eq!(
            errors.get("email").map(String::as_str),
            Some("Please enter a valid email address")
        );
    }

    #[test]
    fn test_unsupported_country() {
        let mut form = valid_form();
        form.country_code = "zz".to_owned();
        let errors = form.validate().unwrap_err();
        assert!(errors.contains_key("country_code"));
    }

    #[test]
    fn test_country_code_case_insensitive() {
        let mut form = valid_form();
        form.country_code = "US".to_owned();
        let validated = form.validate().unwrap();
        assert_eq!(validated.shipping_address.country_code, "us");
    }

    #[test]
    fn test_phone_optional_for_domestic() {
        let mut form = valid_form();
        form.phone = String::new();
        let validated = form.validate().unwrap();
        assert_eq!(validated.shipping_address.phone, None);
    }

    #[test]
    fn test_phone_required_for_international() {
        let mut form = valid_form();
        form.country_code = "gb".to_owned();
        form.city = "London".to_owned();
        form.postal_code = "SW1A 1AA".to_owned();
        form.phone = String::new();
        let errors = form.validate().unwrap_err();
        assert_eq!(
            errors.get("phone").map(String::as_str),
            Some("Phone number is required for international shipping")
        );
    }

    #[test]
    fn test_invalid_phone_revalidated_against_selected_country() {
        let mut form = valid_form();
        form.phone = "123".to_owned();
        let errors = form.validate().unwrap_err();
        let message = errors.get("phone").unwrap();
        assert!(message.contains("valid phone number"));
    }

    #[test]
    fn test_billing_equals_shipping() {
        let update = valid_form().validate().unwrap().into_cart_update();
        assert_eq!(update.billing_address, update.shipping_address);
        assert_eq!(update.email, "ada@example.com");
    }

    #[test]
    fn test_email_lowercased() {
        let mut form = valid_form();
        form.email = "Ada@Example.COM".to_owned();
        let validated = form.validate().unwrap();
        assert_eq!(validated.email.as_str(), "ada@example.com");
    }

    /// Records every patch it is asked to apply.
    struct RecordingUpdater {
        updates: Mutex<Vec<CartUpdate>>,
        fail_with: Option<fn() -> CommerceError>,
    }

    impl RecordingUpdater {
        fn succeeding() -> Self {
            Self {
                updates: Mutex::new(Vec::new()),
                fail_with: None,
            }
        }

        fn failing(fail_with: fn() -> CommerceError) -> Self {
            Self {
                updates: Mutex::new(Vec::new()),
                fail_with: Some(fail_with),
            }
        }

        fn calls(&self) -> usize {
            self.updates.lock().unwrap().len()
        }
    }

    impl CartUpdater for RecordingUpdater {
        async fn update_cart(
            &self,
            cart_id: &CartId,
            update: &CartUpdate,
        ) -> Result<Cart, CommerceError> {
            self.updates.lock().unwrap().push(update.clone());
            if let Some(fail_with) = self.fail_with {
                return Err(fail_with());
            }
            Ok(Cart {
                id: cart_id.clone(),
                email: Some(update.email.clone()),
                currency_code: None,
                items: Vec::new(),
                shipping_address: None,
                billing_address: None,
                shipping_methods: Vec::new(),
                subtotal: None,
                shipping_total: None,
                total: None,
            })
        }
    }

    #[tokio::test]
    async fn test_valid_submission_patches_cart_exactly_once() {
        let updater = RecordingUpdater::succeeding();
        let cart_id = CartId::new("cart_1");

        let outcome = submit(&updater, &cart_id, &valid_form()).await;

        assert!(matches!(outcome, SubmitOutcome::Saved));
        assert_eq!(updater.calls(), 1);

        let updates = updater.updates.lock().unwrap();
        let update = updates.first().unwrap();
        assert_eq!(update.email, "ada@example.com");
        assert_eq!(update.billing_address, update.shipping_address);
    }

    #[tokio::test]
    async fn test_invalid_submission_never_calls_backend() {
        let updater = RecordingUpdater::succeeding();
        let cart_id = CartId::new("cart_1");

        let outcome = submit(&updater, &cart_id, &AddressForm::default()).await;

        assert!(matches!(outcome, SubmitOutcome::Invalid(_)));
        assert_eq!(updater.calls(), 0);
    }

    #[tokio::test]
    async fn test_expired_cart_restarts_flow() {
        let updater =
            RecordingUpdater::failing(|| CommerceError::CartNotFound("cart_1".to_owned()));
        let cart_id = CartId::new("cart_1");

        let outcome = submit(&updater, &cart_id, &valid_form()).await;

        assert!(matches!(outcome, SubmitOutcome::CartExpired));
    }

    #[tokio::test]
    async fn test_backend_rejection_is_recoverable() {
        let updater = RecordingUpdater::failing(|| CommerceError::Api {
            status: 422,
            message: "invalid region".to_owned(),
        });
        let cart_id = CartId::new("cart_1");

        let outcome = submit(&updater, &cart_id, &valid_form()).await;

        assert!(matches!(outcome, SubmitOutcome::Failed(_)));
        // The invalid patch is not retried automatically
        assert_eq!(updater.calls(), 1);
    }
}

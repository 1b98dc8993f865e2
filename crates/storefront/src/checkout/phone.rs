//! Country-aware phone number validation and formatting.
//!
//! Thin wrapper over the `phonenumber` crate (libphonenumber metadata). Every
//! function here is pure and total: a number that cannot be parsed or
//! formatted degrades to the best available fallback instead of erroring, so
//! a broken phone library can never block the rest of the address form.
//!
//! Validation accepts numbers that either pass strict metadata validity or
//! parse cleanly with a plausible digit count. Checkout forms reject too many
//! real customers when newly allocated ranges lag the bundled metadata, so
//! the strict check alone is not the gate.

use phonenumber::{Mode, PhoneNumber};

use super::countries;

/// Fewest digits a subscriber number can plausibly have.
const MIN_PLAUSIBLE_DIGITS: usize = 7;
/// ITU E.164 maximum number length.
const MAX_PLAUSIBLE_DIGITS: usize = 15;

/// Whether the phone field is mandatory in the current form context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhoneRequirement {
    /// A value must be entered.
    Required,
    /// Empty is acceptable; a non-empty value must still be valid.
    Optional,
}

impl PhoneRequirement {
    /// Store policy: phone is required for international shipments, optional
    /// for domestic ones.
    #[must_use]
    pub fn for_country(country_code: &str) -> Self {
        if country_code == countries::HOME_COUNTRY {
            Self::Optional
        } else {
            Self::Required
        }
    }
}

/// Parse a phone string for a country. An unsupported country code falls
/// back to region-less parsing rather than failing outright.
fn parse(phone: &str, country_code: &str) -> Option<PhoneNumber> {
    phonenumber::parse(countries::region_for(country_code), phone).ok()
}

fn plausible_digit_count(phone: &str) -> bool {
    let digits = phone.chars().filter(char::is_ascii_digit).count();
    (MIN_PLAUSIBLE_DIGITS..=MAX_PLAUSIBLE_DIGITS).contains(&digits)
}

/// Whether the string is an acceptable phone number for the given region.
#[must_use]
pub fn is_valid(phone: &str, country_code: &str) -> bool {
    parse(phone, country_code)
        .is_some_and(|number| phonenumber::is_valid(&number) || plausible_digit_count(phone))
}

/// Validate a phone value, returning a user-facing error message or `None`
/// when the value is acceptable.
///
/// An empty value is an error only under [`PhoneRequirement::Required`]; a
/// non-empty value must validate for the region either way.
#[must_use]
pub fn validate_with_message(
    phone: &str,
    country_code: &str,
    requirement: PhoneRequirement,
) -> Option<String> {
    let trimmed = phone.trim();

    if trimmed.is_empty() {
        return match requirement {
            PhoneRequirement::Required => {
                Some("Phone number is required for international shipping".to_owned())
            }
            PhoneRequirement::Optional => None,
        };
    }

    if is_valid(trimmed, country_code) {
        None
    } else {
        Some(format!(
            "Please enter a valid phone number (e.g. {})",
            example_placeholder(country_code)
        ))
    }
}

/// Normalize to canonical E.164 form (`+<calling code><subscriber number>`).
///
/// Returns the input unchanged when it cannot be parsed and validated, and is
/// idempotent: normalizing an already-normalized number is a no-op.
#[must_use]
pub fn to_e164(phone: &str, country_code: &str) -> String {
    format_with_mode(phone, country_code, Mode::E164)
}

/// Best-effort national display formatting (e.g. `(555) 123-4567`).
#[must_use]
pub fn to_national_display(phone: &str, country_code: &str) -> String {
    format_with_mode(phone, country_code, Mode::National)
}

/// Best-effort international display formatting (e.g. `+1 555-123-4567`).
#[must_use]
pub fn to_international_display(phone: &str, country_code: &str) -> String {
    format_with_mode(phone, country_code, Mode::International)
}

fn format_with_mode(phone: &str, country_code: &str, mode: Mode) -> String {
    let trimmed = phone.trim();
    match parse(trimmed, country_code) {
        Some(number) if phonenumber::is_valid(&number) || plausible_digit_count(trimmed) => {
            number.format().mode(mode).to_string()
        }
        _ => phone.to_owned(),
    }
}

/// A region-appropriate example number for use as an input placeholder.
///
/// Always contains the country's calling code; countries without a curated
/// example fall back to a generic `{calling code} 555 123 4567` pattern.
#[must_use]
pub fn example_placeholder(country_code: &str) -> String {
    let national = match country_code {
        "gb" => "7911 123456",
        "de" => "1512 3456789",
        "fr" => "6 12 34 56 78",
        "au" => "412 345 678",
        "jp" => "90 1234 5678",
        _ => "555 123 4567",
    };
    format!("{} {national}", countries::calling_code_for(country_code))
}

/// Incrementally reformat partial input for live display.
///
/// Complete numbers are shown in national (or international, when the input
/// carries a `+` prefix) format; input that does not yet parse as a number is
/// returned unchanged.
#[must_use]
pub fn as_you_type(phone: &str, country_code: &str) -> String {
    let trimmed = phone.trim();
    if trimmed.is_empty() {
        return phone.to_owned();
    }

    let mode = if trimmed.starts_with('+') {
        Mode::International
    } else {
        Mode::National
    };
    format_with_mode(phone, country_code, mode)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_us_numbers() {
        assert!(is_valid("555-123-4567", "us"));
        assert!(is_valid("(212) 661-7000", "us"));
        assert!(is_valid("+1 212 661 7000", "us"));
    }

    #[test]
    fn test_invalid_numbers() {
        assert!(!is_valid("123", "us"));
        assert!(!is_valid("not a phone", "us"));
        assert!(!is_valid("", "us"));
    }

    #[test]
    fn test_unknown_region_falls_back_to_international_parsing() {
        // "zz" is not in the registry; a full international number still
        // validates via region-less parsing.
        assert!(is_valid("+44 20 7946 0958", "zz"));
        // A national-format number has no region to resolve against.
        assert!(!is_valid("020 7946 0958", "zz"));
    }

    #[test]
    fn test_validate_with_message_empty_required() {
        let message = validate_with_message("", "de", PhoneRequirement::Required);
        assert_eq!(
            message.as_deref(),
            Some("Phone number is required for international shipping")
        );
        // Whitespace counts as empty
        let message = validate_with_message("   ", "us", PhoneRequirement::Required);
        assert!(message.is_some());
    }

    #[test]
    fn test_validate_with_message_empty_optional() {
        assert_eq!(
            validate_with_message("", "us", PhoneRequirement::Optional),
            None
        );
    }

    #[test]
    fn test_validate_with_message_invalid_format() {
        let message = validate_with_message("123", "us", PhoneRequirement::Optional)
            .expect("three digits is not a phone number");
        assert!(message.contains("valid phone number"));
        // The format error embeds a region-appropriate example
        assert!(message.contains("+1"));
    }

    #[test]
    fn test_validate_with_message_valid() {
        assert_eq!(
            validate_with_message("555-123-4567", "us", PhoneRequirement::Optional),
            None
        );
    }

    #[test]
    fn test_requirement_policy() {
        assert_eq!(
            PhoneRequirement::for_country("us"),
            PhoneRequirement::Optional
        );
        assert_eq!(
            PhoneRequirement::for_country("de"),
            PhoneRequirement::Required
        );
        assert_eq!(
            PhoneRequirement::for_country("gb"),
            PhoneRequirement::Required
        );
    }

    #[test]
    fn test_to_e164_us() {
        let normalized = to_e164("555-123-4567", "us");
        assert!(normalized.starts_with("+1"), "got {normalized}");
        assert!(!normalized.contains('-'));
    }

    #[test]
    fn test_to_e164_returns_input_on_failure() {
        assert_eq!(to_e164("123", "us"), "123");
        assert_eq!(to_e164("not a phone", "us"), "not a phone");
        assert_eq!(to_e164("", "us"), "");
    }

    #[test]
    fn test_to_e164_idempotent() {
        for (input, country) in [
            ("555-123-4567", "us"),
            ("+44 20 7946 0958", "gb"),
            ("123", "us"),
            ("garbage", "zz"),
        ] {
            let once = to_e164(input, country);
            let twice = to_e164(&once, country);
            assert_eq!(once, twice, "not idempotent for {input:?}/{country}");
        }
    }

    #[test]
    fn test_display_formats_return_input_on_failure() {
        assert_eq!(to_national_display("abc", "us"), "abc");
        assert_eq!(to_international_display("abc", "us"), "abc");
    }

    #[test]
    fn test_international_display_has_calling_code() {
        let formatted = to_international_display("555-123-4567", "us");
        assert!(formatted.starts_with("+1"), "got {formatted}");
    }

    #[test]
    fn test_example_placeholder_contains_calling_code() {
        // Property holds for every supported country
        for country in super::super::countries::list() {
            let placeholder = example_placeholder(country.code);
            assert!(!placeholder.is_empty());
            assert!(
                placeholder.contains(country.calling_code),
                "{} placeholder {placeholder:?} missing {}",
                country.code,
                country.calling_code
            );
        }
        // Unknown codes fall back to the +1 pattern
        assert_eq!(example_placeholder("zz"), "+1 555 123 4567");
    }

    #[test]
    fn test_as_you_type_falls_back_to_raw_input() {
        assert_eq!(as_you_type("", "us"), "");
        assert_eq!(as_you_type("abc", "us"), "abc");
    }

    #[test]
    fn test_as_you_type_formats_complete_numbers() {
        let formatted = as_you_type("+12126617000", "us");
        assert!(formatted.starts_with("+1"), "got {formatted}");
    }
}

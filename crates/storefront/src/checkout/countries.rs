//! Supported shipping countries.
//!
//! One authoritative registry keyed by lowercase ISO 3166-1 alpha-2 code.
//! Display names, calling codes, and phone regions all come from this table
//! so the address form and the phone validator cannot drift apart.

use phonenumber::country;

/// Default calling code when a country is unknown. Only affects the cosmetic
/// prefix shown next to the phone field, so a safe default beats an error.
pub const DEFAULT_CALLING_CODE: &str = "+1";

/// The store's home country. Shipments elsewhere are international.
pub const HOME_COUNTRY: &str = "us";

/// A supported shipping country.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountryEntry {
    /// Lowercase ISO 3166-1 alpha-2 code (the form value).
    pub code: &'static str,
    /// Human-readable name shown in the country selector.
    pub display_name: &'static str,
    /// International calling code with leading `+`.
    pub calling_code: &'static str,
    /// Region identifier for the phone number parser.
    pub region: country::Id,
}

/// Countries the store ships to: United States first, then alphabetical by
/// display name.
static COUNTRIES: &[CountryEntry] = &[
    CountryEntry {
        code: "us",
        display_name: "United States",
        calling_code: "+1",
        region: country::Id::US,
    },
    CountryEntry {
        code: "au",
        display_name: "Australia",
        calling_code: "+61",
        region: country::Id::AU,
    },
    CountryEntry {
        code: "at",
        display_name: "Austria",
        calling_code: "+43",
        region: country::Id::AT,
    },
    CountryEntry {
        code: "be",
        display_name: "Belgium",
        calling_code: "+32",
        region: country::Id::BE,
    },
    CountryEntry {
        code: "ca",
        display_name: "Canada",
        calling_code: "+1",
        region: country::Id::CA,
    },
    CountryEntry {
        code: "dk",
        display_name: "Denmark",
        calling_code: "+45",
        region: country::Id::DK,
    },
    CountryEntry {
        code: "fi",
        display_name: "Finland",
        calling_code: "+358",
        region: country::Id::FI,
    },
    CountryEntry {
        code: "fr",
        display_name: "France",
        calling_code: "+33",
        region: country::Id::FR,
    },
    CountryEntry {
        code: "de",
        display_name: "Germany",
        calling_code: "+49",
        region: country::Id::DE,
    },
    CountryEntry {
        code: "ie",
        display_name: "Ireland",
        calling_code: "+353",
        region: country::Id::IE,
    },
    CountryEntry {
        code: "it",
        display_name: "Italy",
        calling_code: "+39",
        region: country::Id::IT,
    },
    CountryEntry {
        code: "jp",
        display_name: "Japan",
        calling_code: "+81",
        region: country::Id::JP,
    },
    CountryEntry {
        code: "nl",
        display_name: "Netherlands",
        calling_code: "+31",
        region: country::Id::NL,
    },
    CountryEntry {
        code: "nz",
        display_name: "New Zealand",
        calling_code: "+64",
        region: country::Id::NZ,
    },
    CountryEntry {
        code: "no",
        display_name: "Norway",
        calling_code: "+47",
        region: country::Id::NO,
    },
    CountryEntry {
        code: "pt",
        display_name: "Portugal",
        calling_code: "+351",
        region: country::Id::PT,
    },
    CountryEntry {
        code: "es",
        display_name: "Spain",
        calling_code: "+34",
        region: country::Id::ES,
    },
    CountryEntry {
        code: "se",
        display_name: "Sweden",
        calling_code: "+46",
        region: country::Id::SE,
    },
    CountryEntry {
        code: "ch",
        display_name: "Switzerland",
        calling_code: "+41",
        region: country::Id::CH,
    },
    CountryEntry {
        code: "gb",
        display_name: "United Kingdom",
        calling_code: "+44",
        region: country::Id::GB,
    },
];

/// All supported countries in display order.
#[must_use]
pub fn list() -> &'static [CountryEntry] {
    COUNTRIES
}

/// Look up a country by its lowercase alpha-2 code.
#[must_use]
pub fn by_code(code: &str) -> Option<&'static CountryEntry> {
    COUNTRIES.iter().find(|c| c.code == code)
}

/// Whether a country code is supported for shipping.
#[must_use]
pub fn is_supported(code: &str) -> bool {
    by_code(code).is_some()
}

/// Calling code for a country, defaulting to [`DEFAULT_CALLING_CODE`] for
/// unknown codes.
#[must_use]
pub fn calling_code_for(code: &str) -> &'static str {
    by_code(code).map_or(DEFAULT_CALLING_CODE, |c| c.calling_code)
}

/// Phone parser region for a country code, if the country is supported.
#[must_use]
pub fn region_for(code: &str) -> Option<country::Id> {
    by_code(code).map(|c| c.region)
}

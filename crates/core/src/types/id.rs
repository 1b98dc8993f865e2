//! Newtype IDs for type-safe entity references.
//!
//! The commerce backend addresses carts and orders by opaque string
//! identifiers. Use the `define_id!` macro to create type-safe wrappers that
//! prevent accidentally mixing IDs from different entity types.

/// Macro to define a type-safe ID wrapper around an opaque string.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`
/// - Conversion methods: `new()`, `as_str()`, `into_inner()`
/// - `Display` and `From<String>`/`From<&str>` implementations
///
/// # Example
///
/// ```rust
/// # use tidepool_core::define_id;
/// define_id!(SessionId);
///
/// let id = SessionId::new("sess_01ABC");
/// assert_eq!(id.as_str(), "sess_01ABC");
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from a string value.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the underlying string value.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the ID and return its inner string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl ::core::convert::From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl ::core::convert::From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }
    };
}

define_id!(CartId);
define_id!(OrderId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cart_id_round_trip() {
        let id = CartId::new("cart_01HXYZ");
        assert_eq!(id.as_str(), "cart_01HXYZ");
        assert_eq!(id.to_string(), "cart_01HXYZ");
        assert_eq!(id.clone().into_inner(), "cart_01HXYZ");
    }

    #[test]
    fn test_ids_are_distinct_types() {
        // CartId and OrderId with the same inner value are unrelated types;
        // equality is only defined within a type.
        let cart = CartId::new("id_1");
        let other = CartId::from("id_1");
        assert_eq!(cart, other);
    }

    #[test]
    fn test_serde_transparent() {
        let id = OrderId::new("order_123");
        let json = serde_json::to_string(&id).expect("serialize");
        assert_eq!(json, "\"order_123\"");
        let back: OrderId = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, id);
    }
}

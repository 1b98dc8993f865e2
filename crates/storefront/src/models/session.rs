//! Session-stored data.
//!
//! The storefront keeps no durable local state; the session carries only the
//! opaque reference into the commerce backend.

/// Session keys.
pub mod keys {
    /// Key for storing the active cart ID.
    pub const CART_ID: &str = "cart_id";
}

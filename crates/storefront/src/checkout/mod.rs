//! Checkout domain logic.
//!
//! This module owns the one piece of stateful logic the storefront does not
//! delegate to the commerce backend: the address & step progression workflow.
//!
//! - [`steps`] - derives which checkout step is authoritative to display
//! - [`countries`] - the supported-country registry (single source of truth
//!   for codes, display names, calling codes, and phone regions)
//! - [`phone`] - country-aware phone validation and formatting
//! - [`address`] - the shipping address form and its validation rules
//! - [`payment`] - the payment-confirmation state machine

pub mod address;
pub mod countries;
pub mod payment;
pub mod phone;
pub mod steps;

pub use steps::{CheckoutStep, resolve};

//! Shared domain types.

pub mod email;
pub mod id;
pub mod money;

pub use email::{Email, EmailError};
pub use id::{CartId, OrderId};
pub use money::{CurrencyCode, Money};

//! Shared types for the order system.

pub mod types;

pub use types::{Money, OrderId, PaymentId, ProductId, UserId};

//! Domain layer for the order lifecycle system.
//!
//! This crate provides the persistent record types (products, cart lines,
//! orders, payments) and the status state machines that govern their
//! transitions. All mutation rules live in the `workflow` crate; records
//! here are plain data.

pub mod cart;
pub mod order;
pub mod payment;
pub mod product;
pub mod status;

pub use cart::CartLine;
pub use order::{Order, OrderLine};
pub use payment::{EXTERNAL_ID_PENDING, Payment, PaymentWebhook};
pub use product::Product;
pub use status::{OrderStatus, PaymentOutcome, PaymentStatus};

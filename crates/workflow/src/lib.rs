//! Order lifecycle workflow.
//!
//! Coordinates a customer order across three mutable resources — cart,
//! product stock and payment — so that money is only charged for items
//! that are actually reserved and every failure path leaves the
//! resources consistent:
//!
//! 1. Checkout reserves stock line by line and rolls every reservation
//!    back if any line comes up short (all-or-nothing).
//! 2. Payment is initiated as a fire-and-forget call to an external
//!    gateway; the outcome arrives later on an independent webhook,
//!    correlated purely by order ID.
//! 3. Cancellation, allowed only before the outcome lands, compensates
//!    by restoring the reserved stock.

pub mod cart;
pub mod error;
pub mod gateway;
pub mod orders;
pub mod payments;
pub mod stock;

pub use cart::{CartLineView, CartService};
pub use error::WorkflowError;
pub use gateway::{
    GatewayError, PaymentGateway, RecordingPaymentGateway, SimulatedPaymentGateway,
};
pub use orders::OrderWorkflow;
pub use payments::{PaymentReconciler, PaymentService};
pub use stock::StockLedger;

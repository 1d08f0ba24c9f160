//! Workflow error types.

use domain::OrderStatus;
use store::StoreError;
use thiserror::Error;

/// Errors that can occur during workflow operations.
///
/// All variants are recoverable and user-facing; none are fatal.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// Checkout was attempted with no lines in the cart.
    #[error("Cart is empty")]
    EmptyCart,

    /// Cancellation was attempted on an order that is no longer in
    /// `CREATED` status.
    #[error("Cannot cancel order with status: {actual}. Only CREATED orders can be cancelled")]
    CancellationNotAllowed { actual: OrderStatus },

    /// Payment initiation was attempted on an order that is no longer
    /// in `CREATED` status.
    #[error("Order is not in CREATED status. Current status: {actual}")]
    PaymentNotAllowed { actual: OrderStatus },

    /// Store error (not-found, insufficient stock, duplicate payment).
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result type for workflow operations.
pub type Result<T> = std::result::Result<T, WorkflowError>;

//! Store error types.

use common::{OrderId, ProductId};
use thiserror::Error;

/// Errors that can occur when interacting with the stores.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The product was not found in the catalog.
    #[error("Product not found with id: {0}")]
    ProductNotFound(ProductId),

    /// The order was not found.
    #[error("Order not found with id: {0}")]
    OrderNotFound(OrderId),

    /// No payment exists for the order.
    #[error("Payment not found for order: {0}")]
    PaymentNotFound(OrderId),

    /// A guarded stock decrement found fewer units than requested.
    /// Carries the quantity still available so the caller can surface
    /// a correctable message.
    #[error("Insufficient stock available. Available: {available}")]
    InsufficientStock {
        product_id: ProductId,
        available: u32,
    },

    /// The unique payment-per-order index rejected a second payment.
    #[error("Payment already exists for this order")]
    DuplicatePayment(OrderId),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

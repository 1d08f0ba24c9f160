//! Product record.

use common::{Money, ProductId};
use serde::{Deserialize, Serialize};

/// A product in the catalog.
///
/// `stock` is only ever mutated through the stock ledger's guarded
/// reserve/release operations and never goes below zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// The product identifier (SKU).
    pub id: ProductId,

    /// Human-readable product name.
    pub name: String,

    /// Current unit price. Orders snapshot this at checkout time.
    pub price: Money,

    /// Units currently available for reservation.
    pub stock: u32,
}

impl Product {
    /// Creates a new product.
    pub fn new(id: impl Into<ProductId>, name: impl Into<String>, price: Money, stock: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price,
            stock,
        }
    }
}

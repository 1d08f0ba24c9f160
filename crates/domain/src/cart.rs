//! Cart line record.

use common::{ProductId, UserId};
use serde::{Deserialize, Serialize};

/// One product entry in a user's cart.
///
/// Unique per `(user_id, product_id)`; adding the same product again
/// merges into the existing line by increasing its quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    /// The cart owner.
    pub user_id: UserId,

    /// The product in the cart.
    pub product_id: ProductId,

    /// Requested quantity, always at least 1.
    pub quantity: u32,
}

impl CartLine {
    /// Creates a new cart line.
    pub fn new(user_id: UserId, product_id: impl Into<ProductId>, quantity: u32) -> Self {
        Self {
            user_id,
            product_id: product_id.into(),
            quantity,
        }
    }
}

//! Order and order line records.

use chrono::{DateTime, Utc};
use common::{Money, OrderId, ProductId, UserId};
use serde::{Deserialize, Serialize};

use crate::status::OrderStatus;

/// A line in an order: the quantity and the unit price frozen at
/// checkout time. Later catalog price changes never affect it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    /// The product ordered.
    pub product_id: ProductId,

    /// Quantity ordered.
    pub quantity: u32,

    /// Price per unit at the time the order was created.
    pub unit_price: Money,
}

impl OrderLine {
    /// Creates a new order line.
    pub fn new(product_id: impl Into<ProductId>, quantity: u32, unit_price: Money) -> Self {
        Self {
            product_id: product_id.into(),
            quantity,
            unit_price,
        }
    }

    /// Returns the total price for this line (quantity × unit price).
    pub fn line_total(&self) -> Money {
        self.unit_price.multiply(self.quantity)
    }
}

/// A customer order.
///
/// Created from a non-empty cart snapshot; after creation only `status`
/// ever changes. Lines and `created_at` are immutable, and orders are
/// never deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// The order identifier.
    pub id: OrderId,

    /// The customer who placed the order.
    pub user_id: UserId,

    /// Sum of all line totals, frozen at creation.
    pub total_amount: Money,

    /// Current lifecycle status.
    pub status: OrderStatus,

    /// When the order was created.
    pub created_at: DateTime<Utc>,

    /// Price-snapshot lines, in cart order.
    pub lines: Vec<OrderLine>,
}

impl Order {
    /// Creates a new order in `Created` status from snapshot lines.
    ///
    /// The total is computed from the lines' frozen unit prices.
    pub fn create(user_id: UserId, lines: Vec<OrderLine>) -> Self {
        let total_amount = lines.iter().map(OrderLine::line_total).sum();
        Self {
            id: OrderId::new(),
            user_id,
            total_amount,
            status: OrderStatus::Created,
            created_at: Utc::now(),
            lines,
        }
    }

    /// Returns the number of lines in the order.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }
}

//! Payment record and gateway webhook payload.

use chrono::{DateTime, Utc};
use common::{Money, OrderId, PaymentId};
use serde::{Deserialize, Serialize};

use crate::status::{PaymentOutcome, PaymentStatus};

/// Placeholder external ID until the gateway assigns a real one.
pub const EXTERNAL_ID_PENDING: &str = "pending";

/// A payment record for an order.
///
/// At most one payment exists per order; the payment store enforces the
/// unique order index and the payment service checks before creating.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    /// The internal payment record identifier.
    pub id: PaymentId,

    /// The order this payment charges.
    pub order_id: OrderId,

    /// Amount charged.
    pub amount: Money,

    /// Current payment status.
    pub status: PaymentStatus,

    /// External payment service ID, `"pending"` until the gateway
    /// reports back through the webhook.
    pub external_payment_id: String,

    /// When the payment record was created.
    pub created_at: DateTime<Utc>,
}

impl Payment {
    /// Creates a new pending payment for an order.
    pub fn pending(order_id: OrderId, amount: Money) -> Self {
        Self {
            id: PaymentId::new(),
            order_id,
            amount,
            status: PaymentStatus::Pending,
            external_payment_id: EXTERNAL_ID_PENDING.to_string(),
            created_at: Utc::now(),
        }
    }
}

/// Inbound webhook payload from the payment gateway reporting a
/// terminal payment outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentWebhook {
    /// The order the outcome applies to. Correlation is keyed entirely
    /// by this field.
    #[serde(rename = "orderId")]
    pub order_id: OrderId,

    /// The gateway-assigned external payment ID.
    #[serde(rename = "paymentId")]
    pub payment_id: String,

    /// The terminal outcome.
    pub status: PaymentOutcome,

    /// Human-readable gateway message.
    pub message: String,
}

//! Order and payment status state machines.

use serde::{Deserialize, Serialize};

/// The status of an order in its lifecycle.
///
/// Transitions:
/// ```text
/// Created ──┬──► Paid      (payment outcome: success)
///           ├──► Failed    (payment outcome: failure)
///           └──► Cancelled (explicit user cancellation)
/// ```
///
/// `Paid`, `Failed` and `Cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// Order exists, stock is reserved, payment has not concluded.
    #[default]
    Created,

    /// Payment succeeded (terminal state).
    Paid,

    /// Payment failed (terminal state; stock stays committed unless the
    /// caller cancels explicitly — cancellation is only possible before
    /// the outcome lands).
    Failed,

    /// Order was cancelled and its stock restored (terminal state).
    Cancelled,
}

impl OrderStatus {
    /// Returns true if the order can be cancelled in this status.
    pub fn can_cancel(&self) -> bool {
        matches!(self, OrderStatus::Created)
    }

    /// Returns true if a payment can be initiated in this status.
    pub fn can_accept_payment(&self) -> bool {
        matches!(self, OrderStatus::Created)
    }

    /// Returns true if this is a terminal status.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OrderStatus::Paid | OrderStatus::Failed | OrderStatus::Cancelled
        )
    }

    /// Returns the status name as it appears on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Created => "CREATED",
            OrderStatus::Paid => "PAID",
            OrderStatus::Failed => "FAILED",
            OrderStatus::Cancelled => "CANCELLED",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The status of a payment record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    /// Payment record created, gateway outcome not yet received.
    #[default]
    Pending,

    /// Gateway reported a successful charge.
    Success,

    /// Gateway rejected the charge.
    Failed,
}

impl PaymentStatus {
    /// Returns the status name as it appears on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "PENDING",
            PaymentStatus::Success => "SUCCESS",
            PaymentStatus::Failed => "FAILED",
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Terminal outcome reported by the payment gateway webhook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentOutcome {
    /// The charge went through.
    Success,

    /// The charge was declined.
    Failed,
}

impl PaymentOutcome {
    /// Returns the payment status a record moves to for this outcome.
    pub fn payment_status(&self) -> PaymentStatus {
        match self {
            PaymentOutcome::Success => PaymentStatus::Success,
            PaymentOutcome::Failed => PaymentStatus::Failed,
        }
    }

    /// Returns the order status an order moves to for this outcome.
    pub fn order_status(&self) -> OrderStatus {
        match self {
            PaymentOutcome::Success => OrderStatus::Paid,
            PaymentOutcome::Failed => OrderStatus::Failed,
        }
    }

    /// Returns the outcome name as it appears on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentOutcome::Success => "SUCCESS",
            PaymentOutcome::Failed => "FAILED",
        }
    }
}

impl std::fmt::Display for PaymentOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_status_is_created() {
        assert_eq!(OrderStatus::default(), OrderStatus::Created);
    }

    #[test]
    fn only_created_can_cancel() {
        assert!(OrderStatus::Created.can_cancel());
        assert!(!OrderStatus::Paid.can_cancel());
        assert!(!OrderStatus::Failed.can_cancel());
        assert!(!OrderStatus::Cancelled.can_cancel());
    }

    #[test]
    fn only_created_can_accept_payment() {
        assert!(OrderStatus::Created.can_accept_payment());
        assert!(!OrderStatus::Paid.can_accept_payment());
        assert!(!OrderStatus::Failed.can_accept_payment());
        assert!(!OrderStatus::Cancelled.can_accept_payment());
    }

    #[test]
    fn terminal_statuses() {
        assert!(!OrderStatus::Created.is_terminal());
        assert!(OrderStatus::Paid.is_terminal());
        assert!(OrderStatus::Failed.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());
    }

    #[test]
    fn outcome_maps_to_statuses() {
        assert_eq!(
            PaymentOutcome::Success.payment_status(),
            PaymentStatus::Success
        );
        assert_eq!(PaymentOutcome::Success.order_status(), OrderStatus::Paid);
        assert_eq!(
            PaymentOutcome::Failed.payment_status(),
            PaymentStatus::Failed
        );
        assert_eq!(PaymentOutcome::Failed.order_status(), OrderStatus::Failed);
    }

    #[test]
    fn wire_format_is_screaming_snake() {
        assert_eq!(
            serde_json::to_string(&OrderStatus::Created).unwrap(),
            "\"CREATED\""
        );
        assert_eq!(
            serde_json::to_string(&PaymentStatus::Pending).unwrap(),
            "\"PENDING\""
        );
        let outcome: PaymentOutcome = serde_json::from_str("\"SUCCESS\"").unwrap();
        assert_eq!(outcome, PaymentOutcome::Success);
    }

    #[test]
    fn display_matches_wire_format() {
        assert_eq!(OrderStatus::Cancelled.to_string(), "CANCELLED");
        assert_eq!(PaymentStatus::Success.to_string(), "SUCCESS");
        assert_eq!(PaymentOutcome::Failed.to_string(), "FAILED");
    }
}

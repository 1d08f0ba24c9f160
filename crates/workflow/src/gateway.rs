//! Payment gateway trait, simulation, and test double.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use common::{Money, OrderId, PaymentId};
use domain::{PaymentOutcome, PaymentWebhook};
use thiserror::Error;
use tokio::sync::mpsc;
use uuid::Uuid;

/// Error from the outbound gateway call.
///
/// Callers treat this as non-fatal: a failed submit is logged and the
/// payment record stays `Pending`.
#[derive(Debug, Error)]
#[error("Failed to call payment service: {0}")]
pub struct GatewayError(String);

impl GatewayError {
    /// Creates a new gateway error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// External asynchronous payment processor.
///
/// `submit` is fire-and-forget: it returns as soon as the charge
/// request is dispatched. The terminal outcome arrives later through
/// the inbound webhook, correlated by order ID only.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Submits a charge request for an order.
    async fn submit(
        &self,
        order_id: OrderId,
        amount: Money,
        payment_id: PaymentId,
    ) -> Result<(), GatewayError>;
}

/// Simulated payment processor.
///
/// Reproduces the external mock service: each submission spawns a task
/// that waits `delay`, resolves to `SUCCESS` with probability
/// `success_rate` (`FAILED` otherwise), and delivers the webhook on the
/// channel the inbound entry point consumes.
#[derive(Debug, Clone)]
pub struct SimulatedPaymentGateway {
    delay: Duration,
    success_rate: f64,
    webhooks: mpsc::UnboundedSender<PaymentWebhook>,
}

impl SimulatedPaymentGateway {
    /// Creates a new simulated gateway delivering webhooks on `webhooks`.
    pub fn new(
        delay: Duration,
        success_rate: f64,
        webhooks: mpsc::UnboundedSender<PaymentWebhook>,
    ) -> Self {
        Self {
            delay,
            success_rate,
            webhooks,
        }
    }
}

#[async_trait]
impl PaymentGateway for SimulatedPaymentGateway {
    async fn submit(
        &self,
        order_id: OrderId,
        _amount: Money,
        _payment_id: PaymentId,
    ) -> Result<(), GatewayError> {
        let delay = self.delay;
        let success_rate = self.success_rate;
        let webhooks = self.webhooks.clone();

        let external_id = format!("pay_{}", &Uuid::new_v4().simple().to_string()[..8]);
        tracing::info!(%order_id, external_id, "payment processing started");

        tokio::spawn(async move {
            tokio::time::sleep(delay).await;

            let success = rand::random::<f64>() < success_rate;
            let (status, message) = if success {
                (PaymentOutcome::Success, "Payment completed successfully")
            } else {
                (PaymentOutcome::Failed, "Payment failed")
            };
            tracing::info!(%order_id, %status, "payment processing completed");

            let webhook = PaymentWebhook {
                order_id,
                payment_id: external_id,
                status,
                message: message.to_string(),
            };
            if webhooks.send(webhook).is_err() {
                tracing::warn!(%order_id, "webhook receiver dropped; outcome not delivered");
            }
        });

        Ok(())
    }
}

#[derive(Debug, Default)]
struct RecordingState {
    submissions: Vec<(OrderId, Money, PaymentId)>,
    fail_on_submit: bool,
}

/// Recording gateway for tests: captures submissions and can be told
/// to fail the outbound call.
#[derive(Debug, Clone, Default)]
pub struct RecordingPaymentGateway {
    state: Arc<RwLock<RecordingState>>,
}

impl RecordingPaymentGateway {
    /// Creates a new recording gateway.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the gateway to fail on subsequent submit calls.
    pub fn set_fail_on_submit(&self, fail: bool) {
        self.state.write().unwrap().fail_on_submit = fail;
    }

    /// Returns the number of recorded submissions.
    pub fn submission_count(&self) -> usize {
        self.state.read().unwrap().submissions.len()
    }

    /// Returns the most recent submission, if any.
    pub fn last_submission(&self) -> Option<(OrderId, Money, PaymentId)> {
        self.state.read().unwrap().submissions.last().copied()
    }
}

#[async_trait]
impl PaymentGateway for RecordingPaymentGateway {
    async fn submit(
        &self,
        order_id: OrderId,
        amount: Money,
        payment_id: PaymentId,
    ) -> Result<(), GatewayError> {
        let mut state = self.state.write().unwrap();

        if state.fail_on_submit {
            return Err(GatewayError::new("Payment service unreachable"));
        }

        state.submissions.push((order_id, amount, payment_id));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn recording_gateway_captures_submissions() {
        let gateway = RecordingPaymentGateway::new();
        let order_id = OrderId::new();
        let payment_id = PaymentId::new();

        gateway
            .submit(order_id, Money::from_cents(3000), payment_id)
            .await
            .unwrap();

        assert_eq!(gateway.submission_count(), 1);
        let (o, amount, p) = gateway.last_submission().unwrap();
        assert_eq!(o, order_id);
        assert_eq!(amount.cents(), 3000);
        assert_eq!(p, payment_id);
    }

    #[tokio::test]
    async fn recording_gateway_can_fail() {
        let gateway = RecordingPaymentGateway::new();
        gateway.set_fail_on_submit(true);

        let result = gateway
            .submit(OrderId::new(), Money::from_cents(100), PaymentId::new())
            .await;
        assert!(result.is_err());
        assert_eq!(gateway.submission_count(), 0);
    }

    #[tokio::test]
    async fn simulated_gateway_delivers_webhook() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        // success_rate 1.0 makes the outcome deterministic
        let gateway = SimulatedPaymentGateway::new(Duration::from_millis(1), 1.0, tx);
        let order_id = OrderId::new();

        gateway
            .submit(order_id, Money::from_cents(3000), PaymentId::new())
            .await
            .unwrap();

        let webhook = rx.recv().await.unwrap();
        assert_eq!(webhook.order_id, order_id);
        assert_eq!(webhook.status, PaymentOutcome::Success);
        assert!(webhook.payment_id.starts_with("pay_"));
    }

    #[tokio::test]
    async fn simulated_gateway_zero_success_rate_fails() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let gateway = SimulatedPaymentGateway::new(Duration::from_millis(1), 0.0, tx);

        gateway
            .submit(OrderId::new(), Money::from_cents(3000), PaymentId::new())
            .await
            .unwrap();

        let webhook = rx.recv().await.unwrap();
        assert_eq!(webhook.status, PaymentOutcome::Failed);
        assert_eq!(webhook.message, "Payment failed");
    }
}

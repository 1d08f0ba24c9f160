//! Payment initiation and webhook reconciliation.

use common::{Money, OrderId};
use domain::{Payment, PaymentWebhook};
use store::{CartStore, OrderStore, PaymentStore, ProductCatalog, StoreError};

use crate::error::{Result, WorkflowError};
use crate::gateway::PaymentGateway;
use crate::orders::OrderWorkflow;

/// Creates payment records and dispatches charge requests to the
/// external gateway.
#[derive(Debug, Clone)]
pub struct PaymentService<O, P, G>
where
    O: OrderStore,
    P: PaymentStore,
    G: PaymentGateway,
{
    orders: O,
    payments: P,
    gateway: G,
}

impl<O, P, G> PaymentService<O, P, G>
where
    O: OrderStore,
    P: PaymentStore,
    G: PaymentGateway,
{
    /// Creates a new payment service.
    pub fn new(orders: O, payments: P, gateway: G) -> Self {
        Self {
            orders,
            payments,
            gateway,
        }
    }

    /// Initiates payment for an order.
    ///
    /// The order must exist, be in `CREATED` status, and have no
    /// payment yet. Persists a `PENDING` payment record, then submits
    /// the charge request. A failed submit does not fail initiation:
    /// the record stays pending and the error is only logged, since the
    /// webhook is the sole reconciliation path either way.
    #[tracing::instrument(skip(self))]
    pub async fn initiate(&self, order_id: OrderId, amount: Money) -> Result<Payment> {
        let order = self
            .orders
            .find_by_id(order_id)
            .await?
            .ok_or(StoreError::OrderNotFound(order_id))?;

        if !order.status.can_accept_payment() {
            return Err(WorkflowError::PaymentNotAllowed {
                actual: order.status,
            });
        }

        if self.payments.find_by_order_id(order_id).await?.is_some() {
            return Err(StoreError::DuplicatePayment(order_id).into());
        }

        let payment = self
            .payments
            .insert(Payment::pending(order_id, amount))
            .await?;
        tracing::info!(%order_id, payment_id = %payment.id, "payment created");

        if let Err(e) = self.gateway.submit(order_id, amount, payment.id).await {
            // The record stays pending; a webhook may still arrive.
            tracing::error!(error = %e, %order_id, "failed to call payment service");
        }

        metrics::counter!("payments_initiated_total").increment(1);
        Ok(payment)
    }
}

/// Maps inbound gateway webhooks to payment and order state transitions.
#[derive(Debug, Clone)]
pub struct PaymentReconciler<C, K, O, P>
where
    C: ProductCatalog + Clone,
    K: CartStore,
    O: OrderStore,
    P: PaymentStore,
{
    payments: P,
    workflow: OrderWorkflow<C, K, O, P>,
}

impl<C, K, O, P> PaymentReconciler<C, K, O, P>
where
    C: ProductCatalog + Clone,
    K: CartStore,
    O: OrderStore,
    P: PaymentStore,
{
    /// Creates a new reconciler.
    pub fn new(payments: P, workflow: OrderWorkflow<C, K, O, P>) -> Self {
        Self { payments, workflow }
    }

    /// Applies a gateway outcome to the payment and its order.
    ///
    /// Both records are validated before either is written, so the
    /// payment and order always move together: a webhook for an order
    /// with no payment, or a payment whose order has vanished, changes
    /// nothing.
    #[tracing::instrument(skip(self), fields(order_id = %event.order_id, status = %event.status))]
    pub async fn handle_webhook(&self, event: PaymentWebhook) -> Result<Payment> {
        metrics::counter!("payment_webhooks_total").increment(1);

        let mut payment = self
            .payments
            .find_by_order_id(event.order_id)
            .await?
            .ok_or(StoreError::PaymentNotFound(event.order_id))?;
        self.workflow.order(event.order_id).await?;

        payment.status = event.status.payment_status();
        payment.external_payment_id = event.payment_id;
        let payment = self.payments.update(payment).await?;
        tracing::info!(payment_status = %payment.status, "payment status updated");

        self.workflow
            .apply_payment_outcome(event.order_id, event.status)
            .await?;

        Ok(payment)
    }
}

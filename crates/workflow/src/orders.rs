//! Order workflow: checkout, cancellation, payment outcome application.

use common::{OrderId, UserId};
use domain::{CartLine, Order, OrderLine, OrderStatus, Payment, PaymentOutcome};
use store::{CartStore, OrderStore, PaymentStore, ProductCatalog, StoreError};

use crate::error::{Result, WorkflowError};
use crate::stock::StockLedger;

/// The order state machine.
///
/// Drives `Created → {Paid, Failed, Cancelled}`: checkout creates an
/// order from a cart snapshot with stock reserved and prices frozen,
/// `apply_payment_outcome` finalizes it when the gateway reports back,
/// and `cancel` compensates by restoring the reserved stock.
///
/// Checkout is all-or-nothing: the cross-record sequence (reserve N
/// products, then write the order) has an explicit rollback path that
/// releases every reservation made so far before an error surfaces.
#[derive(Debug, Clone)]
pub struct OrderWorkflow<C, K, O, P>
where
    C: ProductCatalog + Clone,
    K: CartStore,
    O: OrderStore,
    P: PaymentStore,
{
    catalog: C,
    ledger: StockLedger<C>,
    carts: K,
    orders: O,
    payments: P,
}

impl<C, K, O, P> OrderWorkflow<C, K, O, P>
where
    C: ProductCatalog + Clone,
    K: CartStore,
    O: OrderStore,
    P: PaymentStore,
{
    /// Creates a new order workflow over the given stores.
    pub fn new(catalog: C, carts: K, orders: O, payments: P) -> Self {
        let ledger = StockLedger::new(catalog.clone());
        Self {
            catalog,
            ledger,
            carts,
            orders,
            payments,
        }
    }

    /// Converts the user's cart into an order.
    ///
    /// Reserves stock for every cart line and snapshots the prices read
    /// at reservation time, persists the order in `Created` status and
    /// clears the cart. If any line cannot be reserved, every earlier
    /// reservation is released before the error propagates. No payment
    /// is created here; initiation is a separate explicit call.
    #[tracing::instrument(skip(self))]
    pub async fn checkout(&self, user_id: UserId) -> Result<Order> {
        metrics::counter!("checkouts_total").increment(1);
        let start = std::time::Instant::now();

        let lines = self.carts.list_by_user(user_id).await?;
        if lines.is_empty() {
            return Err(WorkflowError::EmptyCart);
        }

        let order_lines = match self.reserve_lines(&lines).await {
            Ok(order_lines) => order_lines,
            Err(e) => {
                metrics::counter!("checkouts_failed").increment(1);
                return Err(e);
            }
        };

        let order = Order::create(user_id, order_lines);
        let order = match self.orders.save(order.clone()).await {
            Ok(order) => order,
            Err(e) => {
                // The reservations are already committed; give them back
                // before surfacing the fault.
                self.release_best_effort(&order.lines).await;
                metrics::counter!("checkouts_failed").increment(1);
                return Err(e.into());
            }
        };

        self.carts.delete_all_for_user(user_id).await?;

        metrics::histogram!("checkout_duration_seconds").record(start.elapsed().as_secs_f64());
        tracing::info!(
            order_id = %order.id,
            %user_id,
            total = %order.total_amount,
            lines = order.line_count(),
            "order created"
        );
        Ok(order)
    }

    /// Cancels an order that has not yet reached a payment outcome.
    ///
    /// Restores stock for every order line, then marks the order
    /// `Cancelled`. Only `Created` orders can be cancelled.
    #[tracing::instrument(skip(self))]
    pub async fn cancel(&self, order_id: OrderId) -> Result<Order> {
        let mut order = self.order(order_id).await?;

        if !order.status.can_cancel() {
            return Err(WorkflowError::CancellationNotAllowed {
                actual: order.status,
            });
        }

        for line in &order.lines {
            self.ledger.release(&line.product_id, line.quantity).await?;
        }

        order.status = OrderStatus::Cancelled;
        let order = self.orders.save(order).await?;

        metrics::counter!("orders_cancelled_total").increment(1);
        tracing::info!(%order_id, "order cancelled, stock restored");
        Ok(order)
    }

    /// Applies a terminal payment outcome to an order: `Paid` on
    /// success, `Failed` on failure.
    ///
    /// Touches no stock — the reservation was committed at checkout and
    /// a failed payment does not restore it unless the caller cancels
    /// explicitly. An outcome arriving for an order that was cancelled
    /// in the meantime (the cancel/webhook race) is ignored: the order
    /// stays `Cancelled` and the anomaly is logged.
    #[tracing::instrument(skip(self))]
    pub async fn apply_payment_outcome(
        &self,
        order_id: OrderId,
        outcome: PaymentOutcome,
    ) -> Result<Order> {
        let mut order = self.order(order_id).await?;

        if order.status == OrderStatus::Cancelled {
            metrics::counter!("payment_outcomes_stale_total").increment(1);
            tracing::warn!(
                %order_id,
                %outcome,
                "payment outcome arrived for a cancelled order; order left untouched"
            );
            return Ok(order);
        }

        order.status = outcome.order_status();
        let order = self.orders.save(order).await?;

        tracing::info!(%order_id, status = %order.status, "payment outcome applied");
        Ok(order)
    }

    /// Loads an order, failing with `OrderNotFound` if it is missing.
    pub async fn order(&self, order_id: OrderId) -> Result<Order> {
        self.orders
            .find_by_id(order_id)
            .await?
            .ok_or_else(|| StoreError::OrderNotFound(order_id).into())
    }

    /// Loads an order together with its payment, if one exists.
    #[tracing::instrument(skip(self))]
    pub async fn order_with_payment(&self, order_id: OrderId) -> Result<(Order, Option<Payment>)> {
        let order = self.order(order_id).await?;
        let payment = self.payments.find_by_order_id(order_id).await?;
        Ok((order, payment))
    }

    /// Returns all orders for a user, newest first.
    #[tracing::instrument(skip(self))]
    pub async fn orders_for_user(&self, user_id: UserId) -> Result<Vec<Order>> {
        Ok(self.orders.find_by_user(user_id).await?)
    }

    /// Reserves stock for each cart line, snapshotting the unit price
    /// read alongside each reservation. On any failure the lines
    /// reserved so far are released and the error propagates.
    async fn reserve_lines(&self, lines: &[CartLine]) -> Result<Vec<OrderLine>> {
        let mut reserved = Vec::with_capacity(lines.len());

        for line in lines {
            let product = match self.catalog.get(&line.product_id).await {
                Ok(Some(product)) => product,
                Ok(None) => {
                    self.release_best_effort(&reserved).await;
                    return Err(StoreError::ProductNotFound(line.product_id.clone()).into());
                }
                Err(e) => {
                    self.release_best_effort(&reserved).await;
                    return Err(e.into());
                }
            };

            if let Err(e) = self.ledger.reserve(&line.product_id, line.quantity).await {
                self.release_best_effort(&reserved).await;
                return Err(e);
            }

            reserved.push(OrderLine::new(
                line.product_id.clone(),
                line.quantity,
                product.price,
            ));
        }

        Ok(reserved)
    }

    async fn release_best_effort(&self, lines: &[OrderLine]) {
        for line in lines {
            if let Err(e) = self.ledger.release(&line.product_id, line.quantity).await {
                tracing::error!(
                    error = %e,
                    product_id = %line.product_id,
                    "failed to release reserved stock during checkout rollback"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::{Money, ProductId};
    use domain::Product;
    use store::{InMemoryCartStore, InMemoryOrderStore, InMemoryPaymentStore, InMemoryProductCatalog};

    type TestWorkflow = OrderWorkflow<
        InMemoryProductCatalog,
        InMemoryCartStore,
        InMemoryOrderStore,
        InMemoryPaymentStore,
    >;

    async fn setup() -> (TestWorkflow, InMemoryProductCatalog, InMemoryCartStore) {
        let catalog = InMemoryProductCatalog::new();
        catalog
            .insert(Product::new("SKU-001", "Widget", Money::from_cents(1000), 5))
            .await
            .unwrap();
        catalog
            .insert(Product::new("SKU-002", "Gadget", Money::from_cents(2500), 3))
            .await
            .unwrap();

        let carts = InMemoryCartStore::new();
        let workflow = OrderWorkflow::new(
            catalog.clone(),
            carts.clone(),
            InMemoryOrderStore::new(),
            InMemoryPaymentStore::new(),
        );
        (workflow, catalog, carts)
    }

    async fn fill_cart(carts: &InMemoryCartStore, user: UserId) {
        carts
            .upsert(CartLine::new(user, "SKU-001", 2))
            .await
            .unwrap();
        carts
            .upsert(CartLine::new(user, "SKU-002", 1))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn checkout_reserves_stock_and_freezes_prices() {
        let (workflow, catalog, carts) = setup().await;
        let user = UserId::new();
        fill_cart(&carts, user).await;

        let order = workflow.checkout(user).await.unwrap();

        assert_eq!(order.status, OrderStatus::Created);
        assert_eq!(order.total_amount.cents(), 2 * 1000 + 2500);
        assert_eq!(order.line_count(), 2);
        assert_eq!(catalog.stock_of(&ProductId::new("SKU-001")).await, Some(3));
        assert_eq!(catalog.stock_of(&ProductId::new("SKU-002")).await, Some(2));

        // Cart is cleared
        assert!(carts.list_by_user(user).await.unwrap().is_empty());

        // Later price changes never touch the snapshot
        catalog
            .insert(Product::new("SKU-001", "Widget", Money::from_cents(9999), 3))
            .await
            .unwrap();
        let reloaded = workflow.order(order.id).await.unwrap();
        assert_eq!(reloaded.lines[0].unit_price.cents(), 1000);
        assert_eq!(reloaded.total_amount.cents(), 4500);
    }

    #[tokio::test]
    async fn checkout_empty_cart_fails() {
        let (workflow, _, _) = setup().await;
        let result = workflow.checkout(UserId::new()).await;
        assert!(matches!(result, Err(WorkflowError::EmptyCart)));
    }

    #[tokio::test]
    async fn checkout_is_all_or_nothing() {
        let (workflow, catalog, carts) = setup().await;
        let user = UserId::new();

        carts
            .upsert(CartLine::new(user, "SKU-001", 2))
            .await
            .unwrap();
        // 4 > 3 in stock: this line fails after SKU-001 was reserved
        carts
            .upsert(CartLine::new(user, "SKU-002", 4))
            .await
            .unwrap();

        let err = workflow.checkout(user).await.unwrap_err();
        assert!(matches!(
            err,
            WorkflowError::Store(StoreError::InsufficientStock { .. })
        ));

        // The earlier reservation was rolled back; nothing changed
        assert_eq!(catalog.stock_of(&ProductId::new("SKU-001")).await, Some(5));
        assert_eq!(catalog.stock_of(&ProductId::new("SKU-002")).await, Some(3));
        assert_eq!(workflow.orders.order_count().await, 0);

        // The cart is left intact for the user to correct
        assert_eq!(carts.list_by_user(user).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn cancel_restores_stock_once() {
        let (workflow, catalog, carts) = setup().await;
        let user = UserId::new();
        fill_cart(&carts, user).await;

        let order = workflow.checkout(user).await.unwrap();
        assert_eq!(catalog.stock_of(&ProductId::new("SKU-001")).await, Some(3));

        let cancelled = workflow.cancel(order.id).await.unwrap();
        assert_eq!(cancelled.status, OrderStatus::Cancelled);
        assert_eq!(catalog.stock_of(&ProductId::new("SKU-001")).await, Some(5));
        assert_eq!(catalog.stock_of(&ProductId::new("SKU-002")).await, Some(3));

        // Second cancel is rejected and must not restore again
        let err = workflow.cancel(order.id).await.unwrap_err();
        match err {
            WorkflowError::CancellationNotAllowed { actual } => {
                assert_eq!(actual, OrderStatus::Cancelled)
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(catalog.stock_of(&ProductId::new("SKU-001")).await, Some(5));
    }

    #[tokio::test]
    async fn cancel_unknown_order_fails() {
        let (workflow, _, _) = setup().await;
        let result = workflow.cancel(OrderId::new()).await;
        assert!(matches!(
            result,
            Err(WorkflowError::Store(StoreError::OrderNotFound(_)))
        ));
    }

    #[tokio::test]
    async fn paid_order_cannot_be_cancelled() {
        let (workflow, _, carts) = setup().await;
        let user = UserId::new();
        fill_cart(&carts, user).await;

        let order = workflow.checkout(user).await.unwrap();
        workflow
            .apply_payment_outcome(order.id, PaymentOutcome::Success)
            .await
            .unwrap();

        let err = workflow.cancel(order.id).await.unwrap_err();
        assert!(matches!(
            err,
            WorkflowError::CancellationNotAllowed {
                actual: OrderStatus::Paid
            }
        ));
    }

    #[tokio::test]
    async fn outcome_moves_order_to_paid_or_failed() {
        let (workflow, _, carts) = setup().await;

        let user = UserId::new();
        fill_cart(&carts, user).await;
        let order = workflow.checkout(user).await.unwrap();
        let updated = workflow
            .apply_payment_outcome(order.id, PaymentOutcome::Success)
            .await
            .unwrap();
        assert_eq!(updated.status, OrderStatus::Paid);

        let user = UserId::new();
        carts
            .upsert(CartLine::new(user, "SKU-001", 1))
            .await
            .unwrap();
        let order = workflow.checkout(user).await.unwrap();
        let updated = workflow
            .apply_payment_outcome(order.id, PaymentOutcome::Failed)
            .await
            .unwrap();
        assert_eq!(updated.status, OrderStatus::Failed);
    }

    #[tokio::test]
    async fn failed_outcome_does_not_restore_stock() {
        let (workflow, catalog, carts) = setup().await;
        let user = UserId::new();
        fill_cart(&carts, user).await;

        let order = workflow.checkout(user).await.unwrap();
        workflow
            .apply_payment_outcome(order.id, PaymentOutcome::Failed)
            .await
            .unwrap();

        // Stock stays committed unless the caller cancels explicitly
        assert_eq!(catalog.stock_of(&ProductId::new("SKU-001")).await, Some(3));
    }

    #[tokio::test]
    async fn stale_outcome_after_cancel_is_ignored() {
        let (workflow, catalog, carts) = setup().await;
        let user = UserId::new();
        fill_cart(&carts, user).await;

        let order = workflow.checkout(user).await.unwrap();
        workflow.cancel(order.id).await.unwrap();

        // The delayed webhook loses the race against cancellation
        let result = workflow
            .apply_payment_outcome(order.id, PaymentOutcome::Success)
            .await
            .unwrap();

        assert_eq!(result.status, OrderStatus::Cancelled);
        // Restored stock is not re-reserved by the stale outcome
        assert_eq!(catalog.stock_of(&ProductId::new("SKU-001")).await, Some(5));
    }

    #[tokio::test]
    async fn outcome_for_unknown_order_fails() {
        let (workflow, _, _) = setup().await;
        let result = workflow
            .apply_payment_outcome(OrderId::new(), PaymentOutcome::Success)
            .await;
        assert!(matches!(
            result,
            Err(WorkflowError::Store(StoreError::OrderNotFound(_)))
        ));
    }

    #[tokio::test]
    async fn orders_for_user_lists_own_orders() {
        let (workflow, _, carts) = setup().await;
        let alice = UserId::new();
        let bob = UserId::new();

        carts
            .upsert(CartLine::new(alice, "SKU-001", 1))
            .await
            .unwrap();
        workflow.checkout(alice).await.unwrap();
        carts
            .upsert(CartLine::new(bob, "SKU-001", 1))
            .await
            .unwrap();
        workflow.checkout(bob).await.unwrap();

        let orders = workflow.orders_for_user(alice).await.unwrap();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].user_id, alice);
    }
}

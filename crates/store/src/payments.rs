//! Payment store trait and in-memory implementation.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::OrderId;
use domain::{Payment, PaymentStatus};
use tokio::sync::RwLock;

use crate::error::{Result, StoreError};

/// Store of payment records with a unique index on `order_id`.
#[async_trait]
pub trait PaymentStore: Send + Sync {
    /// Inserts a new payment. Fails with `DuplicatePayment` if any
    /// payment already exists for the same order.
    async fn insert(&self, payment: Payment) -> Result<Payment>;

    /// Replaces the stored record with the same payment ID. Fails with
    /// `PaymentNotFound` if the record does not exist.
    async fn update(&self, payment: Payment) -> Result<Payment>;

    /// Looks up the payment for an order.
    async fn find_by_order_id(&self, order_id: OrderId) -> Result<Option<Payment>>;

    /// Returns payments still `Pending` that were created before the
    /// cutoff. A swallowed gateway submit leaves a payment pending
    /// forever; this is the hook an out-of-band sweeper reconciles from.
    async fn find_stale_pending(&self, older_than: DateTime<Utc>) -> Result<Vec<Payment>>;
}

/// In-memory payment store, keyed by order ID to mirror the unique
/// payment-per-order index.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPaymentStore {
    payments: Arc<RwLock<HashMap<OrderId, Payment>>>,
}

impl InMemoryPaymentStore {
    /// Creates a new empty payment store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the total number of payments stored.
    pub async fn payment_count(&self) -> usize {
        self.payments.read().await.len()
    }
}

#[async_trait]
impl PaymentStore for InMemoryPaymentStore {
    async fn insert(&self, payment: Payment) -> Result<Payment> {
        let mut payments = self.payments.write().await;
        if payments.contains_key(&payment.order_id) {
            return Err(StoreError::DuplicatePayment(payment.order_id));
        }
        payments.insert(payment.order_id, payment.clone());
        Ok(payment)
    }

    async fn update(&self, payment: Payment) -> Result<Payment> {
        let mut payments = self.payments.write().await;
        match payments.get_mut(&payment.order_id) {
            Some(existing) if existing.id == payment.id => {
                *existing = payment.clone();
                Ok(payment)
            }
            _ => Err(StoreError::PaymentNotFound(payment.order_id)),
        }
    }

    async fn find_by_order_id(&self, order_id: OrderId) -> Result<Option<Payment>> {
        let payments = self.payments.read().await;
        Ok(payments.get(&order_id).cloned())
    }

    async fn find_stale_pending(&self, older_than: DateTime<Utc>) -> Result<Vec<Payment>> {
        let payments = self.payments.read().await;
        let mut stale: Vec<_> = payments
            .values()
            .filter(|p| p.status == PaymentStatus::Pending && p.created_at < older_than)
            .cloned()
            .collect();
        stale.sort_by_key(|p| p.created_at);
        Ok(stale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::Money;

    #[tokio::test]
    async fn insert_and_find_by_order() {
        let store = InMemoryPaymentStore::new();
        let order_id = OrderId::new();

        let payment = Payment::pending(order_id, Money::from_cents(3000));
        store.insert(payment.clone()).await.unwrap();

        let found = store.find_by_order_id(order_id).await.unwrap().unwrap();
        assert_eq!(found.id, payment.id);
        assert_eq!(found.status, PaymentStatus::Pending);
    }

    #[tokio::test]
    async fn second_insert_for_same_order_is_rejected() {
        let store = InMemoryPaymentStore::new();
        let order_id = OrderId::new();

        store
            .insert(Payment::pending(order_id, Money::from_cents(3000)))
            .await
            .unwrap();

        let err = store
            .insert(Payment::pending(order_id, Money::from_cents(3000)))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::DuplicatePayment(_)));
        assert_eq!(store.payment_count().await, 1);
    }

    #[tokio::test]
    async fn update_replaces_existing_record() {
        let store = InMemoryPaymentStore::new();
        let order_id = OrderId::new();

        let mut payment = store
            .insert(Payment::pending(order_id, Money::from_cents(3000)))
            .await
            .unwrap();

        payment.status = PaymentStatus::Success;
        payment.external_payment_id = "pay_a1b2c3d4".to_string();
        store.update(payment).await.unwrap();

        let found = store.find_by_order_id(order_id).await.unwrap().unwrap();
        assert_eq!(found.status, PaymentStatus::Success);
        assert_eq!(found.external_payment_id, "pay_a1b2c3d4");
    }

    #[tokio::test]
    async fn update_unknown_payment_fails() {
        let store = InMemoryPaymentStore::new();
        let payment = Payment::pending(OrderId::new(), Money::from_cents(100));

        let err = store.update(payment).await.unwrap_err();
        assert!(matches!(err, StoreError::PaymentNotFound(_)));
    }

    #[tokio::test]
    async fn stale_pending_filters_by_status_and_age() {
        let store = InMemoryPaymentStore::new();

        let pending = Payment::pending(OrderId::new(), Money::from_cents(100));
        store.insert(pending).await.unwrap();

        let mut settled = Payment::pending(OrderId::new(), Money::from_cents(200));
        settled.status = PaymentStatus::Success;
        store.insert(settled).await.unwrap();

        // Cutoff in the future: the pending record qualifies, the settled one never does.
        let cutoff = Utc::now() + chrono::Duration::seconds(60);
        let stale = store.find_stale_pending(cutoff).await.unwrap();
        assert_eq!(stale.len(), 1);
        assert_eq!(stale[0].status, PaymentStatus::Pending);

        // Cutoff in the past: nothing is old enough.
        let cutoff = Utc::now() - chrono::Duration::seconds(60);
        assert!(store.find_stale_pending(cutoff).await.unwrap().is_empty());
    }
}

//! Cart line store trait and in-memory implementation.

use std::sync::Arc;

use async_trait::async_trait;
use common::{ProductId, UserId};
use domain::CartLine;
use tokio::sync::RwLock;

use crate::error::Result;

/// Store of cart lines, unique per `(user_id, product_id)`.
#[async_trait]
pub trait CartStore: Send + Sync {
    /// Returns all cart lines for a user, in insertion order.
    async fn list_by_user(&self, user_id: UserId) -> Result<Vec<CartLine>>;

    /// Finds a single line by owner and product.
    async fn find(&self, user_id: UserId, product_id: &ProductId) -> Result<Option<CartLine>>;

    /// Inserts the line or replaces the existing line for the same
    /// `(user_id, product_id)` pair.
    async fn upsert(&self, line: CartLine) -> Result<CartLine>;

    /// Removes all lines for a user. Idempotent.
    async fn delete_all_for_user(&self, user_id: UserId) -> Result<()>;
}

/// In-memory cart store.
///
/// Lines are kept in a Vec so `list_by_user` preserves the order items
/// were first added, which carries through to order lines at checkout.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCartStore {
    lines: Arc<RwLock<Vec<CartLine>>>,
}

impl InMemoryCartStore {
    /// Creates a new empty cart store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the total number of lines across all users.
    pub async fn line_count(&self) -> usize {
        self.lines.read().await.len()
    }
}

#[async_trait]
impl CartStore for InMemoryCartStore {
    async fn list_by_user(&self, user_id: UserId) -> Result<Vec<CartLine>> {
        let lines = self.lines.read().await;
        Ok(lines
            .iter()
            .filter(|l| l.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn find(&self, user_id: UserId, product_id: &ProductId) -> Result<Option<CartLine>> {
        let lines = self.lines.read().await;
        Ok(lines
            .iter()
            .find(|l| l.user_id == user_id && &l.product_id == product_id)
            .cloned())
    }

    async fn upsert(&self, line: CartLine) -> Result<CartLine> {
        let mut lines = self.lines.write().await;
        match lines
            .iter_mut()
            .find(|l| l.user_id == line.user_id && l.product_id == line.product_id)
        {
            Some(existing) => *existing = line.clone(),
            None => lines.push(line.clone()),
        }
        Ok(line)
    }

    async fn delete_all_for_user(&self, user_id: UserId) -> Result<()> {
        let mut lines = self.lines.write().await;
        lines.retain(|l| l.user_id != user_id);
        Ok(())
    }
}

//! Product catalog trait and in-memory implementation.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use common::ProductId;
use domain::Product;
use tokio::sync::RwLock;

use crate::error::{Result, StoreError};

/// Read-mostly store of products with price and stock count.
///
/// The two stock mutations are the only write paths for `stock` and
/// each executes as one atomic step: `decrement_stock` is a guarded
/// check-then-decrement, so concurrent reservations of the same
/// product can never drive the count below zero or lose an update.
#[async_trait]
pub trait ProductCatalog: Send + Sync {
    /// Inserts a product, replacing any existing entry with the same ID.
    async fn insert(&self, product: Product) -> Result<Product>;

    /// Looks up a product by ID.
    async fn get(&self, id: &ProductId) -> Result<Option<Product>>;

    /// Returns all products.
    async fn list(&self) -> Result<Vec<Product>>;

    /// Returns products whose name contains the query, case-insensitive.
    async fn search(&self, query: &str) -> Result<Vec<Product>>;

    /// Atomically decrements stock if at least `quantity` units are
    /// available; otherwise fails with `InsufficientStock` carrying the
    /// available count.
    async fn decrement_stock(&self, id: &ProductId, quantity: u32) -> Result<()>;

    /// Atomically increments stock. No upper bound check: this is the
    /// compensation path and restoration is unconditional.
    async fn increment_stock(&self, id: &ProductId, quantity: u32) -> Result<()>;
}

/// In-memory product catalog.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProductCatalog {
    products: Arc<RwLock<HashMap<ProductId, Product>>>,
}

impl InMemoryProductCatalog {
    /// Creates a new empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current stock for a product, for test assertions.
    pub async fn stock_of(&self, id: &ProductId) -> Option<u32> {
        self.products.read().await.get(id).map(|p| p.stock)
    }
}

#[async_trait]
impl ProductCatalog for InMemoryProductCatalog {
    async fn insert(&self, product: Product) -> Result<Product> {
        let mut products = self.products.write().await;
        products.insert(product.id.clone(), product.clone());
        Ok(product)
    }

    async fn get(&self, id: &ProductId) -> Result<Option<Product>> {
        let products = self.products.read().await;
        Ok(products.get(id).cloned())
    }

    async fn list(&self) -> Result<Vec<Product>> {
        let products = self.products.read().await;
        let mut all: Vec<_> = products.values().cloned().collect();
        all.sort_by(|a, b| a.id.as_str().cmp(b.id.as_str()));
        Ok(all)
    }

    async fn search(&self, query: &str) -> Result<Vec<Product>> {
        let needle = query.to_lowercase();
        let products = self.products.read().await;
        let mut matches: Vec<_> = products
            .values()
            .filter(|p| p.name.to_lowercase().contains(&needle))
            .cloned()
            .collect();
        matches.sort_by(|a, b| a.id.as_str().cmp(b.id.as_str()));
        Ok(matches)
    }

    async fn decrement_stock(&self, id: &ProductId, quantity: u32) -> Result<()> {
        let mut products = self.products.write().await;
        let product = products
            .get_mut(id)
            .ok_or_else(|| StoreError::ProductNotFound(id.clone()))?;

        if product.stock < quantity {
            return Err(StoreError::InsufficientStock {
                product_id: id.clone(),
                available: product.stock,
            });
        }

        product.stock -= quantity;
        Ok(())
    }

    async fn increment_stock(&self, id: &ProductId, quantity: u32) -> Result<()> {
        let mut products = self.products.write().await;
        let product = products
            .get_mut(id)
            .ok_or_else(|| StoreError::ProductNotFound(id.clone()))?;

        product.stock = product.stock.saturating_add(quantity);
        Ok(())
    }
}

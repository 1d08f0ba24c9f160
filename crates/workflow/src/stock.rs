//! Stock ledger: the single funnel for stock mutation.

use common::ProductId;
use store::ProductCatalog;

use crate::error::Result;

/// Atomic stock reserve/release operations over the product catalog.
///
/// All stock mutation in the system goes through this type. The
/// catalog's guarded decrement makes `reserve` a single atomic
/// check-then-decrement, so concurrent checkouts targeting the same
/// product cannot lose updates or oversell.
#[derive(Debug, Clone)]
pub struct StockLedger<C: ProductCatalog> {
    catalog: C,
}

impl<C: ProductCatalog> StockLedger<C> {
    /// Creates a new stock ledger over the given catalog.
    pub fn new(catalog: C) -> Self {
        Self { catalog }
    }

    /// Reserves `quantity` units of a product.
    ///
    /// Fails with `InsufficientStock` (carrying the available count) if
    /// fewer units remain; the stock count is unchanged on failure.
    #[tracing::instrument(skip(self))]
    pub async fn reserve(&self, product_id: &ProductId, quantity: u32) -> Result<()> {
        self.catalog.decrement_stock(product_id, quantity).await?;

        metrics::counter!("stock_reservations_total").increment(1);
        tracing::debug!(%product_id, quantity, "stock reserved");
        Ok(())
    }

    /// Releases `quantity` units back to a product's stock.
    ///
    /// The compensating action for `reserve`: restoration is
    /// unconditional, with no upper bound check.
    #[tracing::instrument(skip(self))]
    pub async fn release(&self, product_id: &ProductId, quantity: u32) -> Result<()> {
        self.catalog.increment_stock(product_id, quantity).await?;

        metrics::counter!("stock_releases_total").increment(1);
        tracing::debug!(%product_id, quantity, "stock released");
        Ok(())
    }
}

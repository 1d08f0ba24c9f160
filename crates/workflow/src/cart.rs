//! Cart service: per-user product/quantity lines.

use common::{ProductId, UserId};
use domain::{CartLine, Product};
use store::{CartStore, ProductCatalog, StoreError};

use crate::error::Result;

/// A cart line joined with the current product record.
///
/// This is a live view: the product's price and name may have drifted
/// since the line was added. Prices only freeze at checkout.
#[derive(Debug, Clone)]
pub struct CartLineView {
    /// The product in the cart.
    pub product_id: ProductId,

    /// Requested quantity.
    pub quantity: u32,

    /// The product as it currently appears in the catalog.
    pub product: Product,
}

/// Manages per-user carts: adding items (merging duplicates), listing
/// them against live product data, and clearing.
#[derive(Debug, Clone)]
pub struct CartService<C, K>
where
    C: ProductCatalog,
    K: CartStore,
{
    catalog: C,
    carts: K,
}

impl<C, K> CartService<C, K>
where
    C: ProductCatalog,
    K: CartStore,
{
    /// Creates a new cart service.
    pub fn new(catalog: C, carts: K) -> Self {
        Self { catalog, carts }
    }

    /// Adds `quantity` units of a product to the user's cart.
    ///
    /// Merges into an existing line for the same product. Fails if the
    /// product is unknown, or if the merged quantity exceeds the stock
    /// currently available.
    #[tracing::instrument(skip(self))]
    pub async fn add_item(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<CartLine> {
        let product = self
            .catalog
            .get(&product_id)
            .await?
            .ok_or_else(|| StoreError::ProductNotFound(product_id.clone()))?;

        let existing = self.carts.find(user_id, &product_id).await?;
        let requested = existing.as_ref().map(|l| l.quantity).unwrap_or(0) + quantity;

        if product.stock < requested {
            return Err(StoreError::InsufficientStock {
                product_id,
                available: product.stock,
            }
            .into());
        }

        let line = self
            .carts
            .upsert(CartLine::new(user_id, product_id, requested))
            .await?;

        tracing::info!(%user_id, product_id = %line.product_id, quantity = line.quantity, "cart line updated");
        Ok(line)
    }

    /// Returns the user's cart lines joined with current product data.
    #[tracing::instrument(skip(self))]
    pub async fn list_items(&self, user_id: UserId) -> Result<Vec<CartLineView>> {
        let lines = self.carts.list_by_user(user_id).await?;

        let mut views = Vec::with_capacity(lines.len());
        for line in lines {
            let product = self
                .catalog
                .get(&line.product_id)
                .await?
                .ok_or_else(|| StoreError::ProductNotFound(line.product_id.clone()))?;
            views.push(CartLineView {
                product_id: line.product_id,
                quantity: line.quantity,
                product,
            });
        }
        Ok(views)
    }

    /// Removes all lines from the user's cart. Idempotent.
    #[tracing::instrument(skip(self))]
    pub async fn clear(&self, user_id: UserId) -> Result<()> {
        self.carts.delete_all_for_user(user_id).await?;
        tracing::info!(%user_id, "cart cleared");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::WorkflowError;
    use common::Money;
    use store::{InMemoryCartStore, InMemoryProductCatalog};

    async fn setup(stock: u32) -> CartService<InMemoryProductCatalog, InMemoryCartStore> {
        let catalog = InMemoryProductCatalog::new();
        catalog
            .insert(Product::new("SKU-001", "Widget", Money::from_cents(1000), stock))
            .await
            .unwrap();
        CartService::new(catalog, InMemoryCartStore::new())
    }

    #[tokio::test]
    async fn add_creates_line() {
        let cart = setup(5).await;
        let user = UserId::new();

        let line = cart
            .add_item(user, ProductId::new("SKU-001"), 3)
            .await
            .unwrap();
        assert_eq!(line.quantity, 3);
    }

    #[tokio::test]
    async fn add_merges_into_existing_line() {
        let cart = setup(5).await;
        let user = UserId::new();

        cart.add_item(user, ProductId::new("SKU-001"), 2).await.unwrap();
        let line = cart
            .add_item(user, ProductId::new("SKU-001"), 2)
            .await
            .unwrap();

        assert_eq!(line.quantity, 4);
        assert_eq!(cart.list_items(user).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn add_unknown_product_fails() {
        let cart = setup(5).await;
        let result = cart
            .add_item(UserId::new(), ProductId::new("SKU-404"), 1)
            .await;
        assert!(matches!(
            result,
            Err(WorkflowError::Store(StoreError::ProductNotFound(_)))
        ));
    }

    #[tokio::test]
    async fn merged_quantity_is_checked_against_stock() {
        let cart = setup(5).await;
        let user = UserId::new();

        cart.add_item(user, ProductId::new("SKU-001"), 3).await.unwrap();

        // 3 already in the cart + 4 more would exceed the 5 in stock
        let err = cart
            .add_item(user, ProductId::new("SKU-001"), 4)
            .await
            .unwrap_err();
        match err {
            WorkflowError::Store(StoreError::InsufficientStock { available, .. }) => {
                assert_eq!(available, 5)
            }
            other => panic!("unexpected error: {other}"),
        }

        // The line keeps its previous quantity
        let items = cart.list_items(user).await.unwrap();
        assert_eq!(items[0].quantity, 3);
    }

    #[tokio::test]
    async fn list_joins_current_product_data() {
        let cart = setup(5).await;
        let user = UserId::new();
        cart.add_item(user, ProductId::new("SKU-001"), 2).await.unwrap();

        // Price drifts after the add; the view shows the current price
        cart.catalog
            .insert(Product::new("SKU-001", "Widget", Money::from_cents(1500), 5))
            .await
            .unwrap();

        let items = cart.list_items(user).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].product.price.cents(), 1500);
        assert_eq!(items[0].quantity, 2);
    }

    #[tokio::test]
    async fn clear_empties_the_cart_and_is_idempotent() {
        let cart = setup(5).await;
        let user = UserId::new();
        cart.add_item(user, ProductId::new("SKU-001"), 2).await.unwrap();

        cart.clear(user).await.unwrap();
        assert!(cart.list_items(user).await.unwrap().is_empty());

        cart.clear(user).await.unwrap();
    }
}

//! Persistence collaborators for the order system.
//!
//! One trait per record family: product catalog, cart lines, orders,
//! payments. The in-memory
//! implementations back the server and the test suites; every trait
//! method is a single atomic operation against its store, so the
//! cross-record sequences (checkout, cancel, reconciliation) in the
//! `workflow` crate carry their own rollback paths.

pub mod cart;
pub mod catalog;
pub mod error;
pub mod orders;
pub mod payments;

pub use cart::{CartStore, InMemoryCartStore};
pub use catalog::{InMemoryProductCatalog, ProductCatalog};
pub use error::{Result, StoreError};
pub use orders::{InMemoryOrderStore, OrderStore};
pub use payments::{InMemoryPaymentStore, PaymentStore};

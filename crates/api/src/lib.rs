//! HTTP API server with observability for the order system.
//!
//! Provides REST endpoints for products, carts, orders and payments,
//! the inbound payment webhook, structured logging (tracing) and
//! Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::routing::{delete, get, post};
use metrics_exporter_prometheus::PrometheusHandle;
use store::{InMemoryCartStore, InMemoryOrderStore, InMemoryPaymentStore, InMemoryProductCatalog};
use tokio::sync::mpsc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use workflow::{
    CartService, OrderWorkflow, PaymentReconciler, PaymentService, SimulatedPaymentGateway,
};

use config::Config;

/// The cart service over the in-memory stores.
pub type Cart = CartService<InMemoryProductCatalog, InMemoryCartStore>;

/// The order workflow over the in-memory stores.
pub type Orders = OrderWorkflow<
    InMemoryProductCatalog,
    InMemoryCartStore,
    InMemoryOrderStore,
    InMemoryPaymentStore,
>;

/// The payment service backed by the simulated gateway.
pub type Payments =
    PaymentService<InMemoryOrderStore, InMemoryPaymentStore, SimulatedPaymentGateway>;

/// The webhook reconciler over the in-memory stores.
pub type Reconciler = PaymentReconciler<
    InMemoryProductCatalog,
    InMemoryCartStore,
    InMemoryOrderStore,
    InMemoryPaymentStore,
>;

/// Shared application state accessible from all handlers.
pub struct AppState {
    pub catalog: InMemoryProductCatalog,
    pub cart: Cart,
    pub orders: Orders,
    pub payments: Payments,
    pub reconciler: Reconciler,
}

/// Creates the Axum application router with all routes and shared state.
pub fn create_app(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/api/products", post(routes::products::create))
        .route("/api/products", get(routes::products::list))
        .route("/api/products/search", get(routes::products::search))
        .route("/api/products/{id}", get(routes::products::get))
        .route("/api/cart/add", post(routes::cart::add))
        .route("/api/cart/{user_id}", get(routes::cart::get_cart))
        .route("/api/cart/{user_id}/clear", delete(routes::cart::clear))
        .route("/api/orders", post(routes::orders::create))
        .route("/api/orders/{id}", get(routes::orders::get))
        .route("/api/orders/user/{user_id}", get(routes::orders::user_orders))
        .route("/api/orders/{id}/cancel", post(routes::orders::cancel))
        .route("/api/payments/create", post(routes::payments::create))
        .route("/api/webhooks/payment", post(routes::webhook::payment))
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates the default application state: in-memory stores, the
/// simulated payment gateway, and the delivery task that feeds its
/// webhooks back into the reconciler.
///
/// Must be called from within a Tokio runtime.
pub fn create_default_state(config: &Config) -> Arc<AppState> {
    let catalog = InMemoryProductCatalog::new();
    let carts = InMemoryCartStore::new();
    let orders = InMemoryOrderStore::new();
    let payment_store = InMemoryPaymentStore::new();

    let (webhook_tx, mut webhook_rx) = mpsc::unbounded_channel();
    let gateway = SimulatedPaymentGateway::new(
        Duration::from_millis(config.payment_delay_ms),
        config.payment_success_rate,
        webhook_tx,
    );

    let cart = CartService::new(catalog.clone(), carts.clone());
    let order_workflow = OrderWorkflow::new(
        catalog.clone(),
        carts,
        orders.clone(),
        payment_store.clone(),
    );
    let payments = PaymentService::new(orders, payment_store.clone(), gateway);
    let reconciler = PaymentReconciler::new(payment_store, order_workflow.clone());

    // The simulated gateway's outcomes arrive on an independent flow,
    // exactly like the external service calling the webhook endpoint.
    let delivery = reconciler.clone();
    tokio::spawn(async move {
        while let Some(event) = webhook_rx.recv().await {
            if let Err(e) = delivery.handle_webhook(event).await {
                tracing::error!(error = %e, "failed to process gateway webhook");
            }
        }
    });

    Arc::new(AppState {
        catalog,
        cart,
        orders: order_workflow,
        payments,
        reconciler,
    })
}

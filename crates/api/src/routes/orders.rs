//! Order endpoints: checkout, lookup, cancellation.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use common::{OrderId, UserId};
use domain::{Order, Payment};
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::error::ApiError;
use crate::routes::parse_uuid;

// -- Request types --

#[derive(Deserialize)]
pub struct CreateOrderRequest {
    pub user_id: String,
}

// -- Response types --

#[derive(Serialize)]
pub struct OrderLineResponse {
    pub product_id: String,
    pub quantity: u32,
    pub unit_price_cents: i64,
}

#[derive(Serialize)]
pub struct PaymentResponse {
    pub id: String,
    pub order_id: String,
    pub amount_cents: i64,
    pub status: String,
    pub external_payment_id: String,
    pub created_at: String,
}

impl From<Payment> for PaymentResponse {
    fn from(payment: Payment) -> Self {
        Self {
            id: payment.id.to_string(),
            order_id: payment.order_id.to_string(),
            amount_cents: payment.amount.cents(),
            status: payment.status.to_string(),
            external_payment_id: payment.external_payment_id,
            created_at: payment.created_at.to_rfc3339(),
        }
    }
}

#[derive(Serialize)]
pub struct OrderResponse {
    pub id: String,
    pub user_id: String,
    pub total_cents: i64,
    pub status: String,
    pub created_at: String,
    pub items: Vec<OrderLineResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment: Option<PaymentResponse>,
}

impl OrderResponse {
    fn from_order(order: Order, payment: Option<Payment>) -> Self {
        let items = order
            .lines
            .iter()
            .map(|line| OrderLineResponse {
                product_id: line.product_id.to_string(),
                quantity: line.quantity,
                unit_price_cents: line.unit_price.cents(),
            })
            .collect();

        Self {
            id: order.id.to_string(),
            user_id: order.user_id.to_string(),
            total_cents: order.total_amount.cents(),
            status: order.status.to_string(),
            created_at: order.created_at.to_rfc3339(),
            items,
            payment: payment.map(Into::into),
        }
    }
}

// -- Handlers --

/// POST /api/orders — check out the user's cart into an order.
#[tracing::instrument(skip(state, req))]
pub async fn create(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<OrderResponse>), ApiError> {
    let user_id = UserId::from_uuid(parse_uuid(&req.user_id)?);

    let order = state.orders.checkout(user_id).await?;

    Ok((
        StatusCode::CREATED,
        Json(OrderResponse::from_order(order, None)),
    ))
}

/// GET /api/orders/{id} — fetch an order with its payment, if any.
#[tracing::instrument(skip(state))]
pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<OrderResponse>, ApiError> {
    let order_id = OrderId::from_uuid(parse_uuid(&id)?);

    let (order, payment) = state.orders.order_with_payment(order_id).await?;

    Ok(Json(OrderResponse::from_order(order, payment)))
}

/// GET /api/orders/user/{user_id} — list a user's orders.
#[tracing::instrument(skip(state))]
pub async fn user_orders(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<OrderResponse>>, ApiError> {
    let user_id = UserId::from_uuid(parse_uuid(&user_id)?);

    let orders = state.orders.orders_for_user(user_id).await?;
    let responses = orders
        .into_iter()
        .map(|order| OrderResponse::from_order(order, None))
        .collect();

    Ok(Json(responses))
}

/// POST /api/orders/{id}/cancel — cancel a CREATED order, restoring stock.
#[tracing::instrument(skip(state))]
pub async fn cancel(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<OrderResponse>, ApiError> {
    let order_id = OrderId::from_uuid(parse_uuid(&id)?);

    let order = state.orders.cancel(order_id).await?;

    Ok(Json(OrderResponse::from_order(order, None)))
}

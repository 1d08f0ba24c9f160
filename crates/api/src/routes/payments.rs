//! Payment initiation endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use common::{Money, OrderId};
use serde::Deserialize;

use crate::AppState;
use crate::error::ApiError;
use crate::routes::orders::PaymentResponse;
use crate::routes::parse_uuid;

#[derive(Deserialize)]
pub struct PaymentRequest {
    pub order_id: String,
    pub amount_cents: i64,
}

/// POST /api/payments/create — create a payment and dispatch the
/// charge request to the gateway.
#[tracing::instrument(skip(state, req))]
pub async fn create(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PaymentRequest>,
) -> Result<(StatusCode, Json<PaymentResponse>), ApiError> {
    let order_id = OrderId::from_uuid(parse_uuid(&req.order_id)?);
    if req.amount_cents < 1 {
        return Err(ApiError::BadRequest(
            "Amount must be greater than 0".to_string(),
        ));
    }

    let payment = state
        .payments
        .initiate(order_id, Money::from_cents(req.amount_cents))
        .await?;

    Ok((StatusCode::CREATED, Json(payment.into())))
}

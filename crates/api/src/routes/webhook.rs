//! Inbound payment gateway webhook.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use domain::PaymentWebhook;

use crate::AppState;
use crate::error::ApiError;

/// POST /api/webhooks/payment — apply a gateway outcome to the payment
/// and its order.
#[tracing::instrument(skip(state, req), fields(order_id = %req.order_id))]
pub async fn payment(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PaymentWebhook>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.reconciler.handle_webhook(req).await?;

    Ok(Json(
        serde_json::json!({ "message": "Webhook processed successfully" }),
    ))
}

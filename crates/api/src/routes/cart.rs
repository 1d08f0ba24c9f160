//! Cart endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use common::{ProductId, UserId};
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::error::ApiError;
use crate::routes::parse_uuid;
use crate::routes::products::ProductResponse;

// -- Request types --

#[derive(Deserialize)]
pub struct AddToCartRequest {
    pub user_id: String,
    pub product_id: String,
    pub quantity: u32,
}

// -- Response types --

#[derive(Serialize)]
pub struct CartLineResponse {
    pub user_id: String,
    pub product_id: String,
    pub quantity: u32,
}

#[derive(Serialize)]
pub struct CartItemResponse {
    pub product_id: String,
    pub quantity: u32,
    pub product: ProductResponse,
}

// -- Handlers --

/// POST /api/cart/add — add an item to a user's cart.
#[tracing::instrument(skip(state, req))]
pub async fn add(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AddToCartRequest>,
) -> Result<(StatusCode, Json<CartLineResponse>), ApiError> {
    let user_id = UserId::from_uuid(parse_uuid(&req.user_id)?);
    if req.quantity < 1 {
        return Err(ApiError::BadRequest(
            "Quantity must be at least 1".to_string(),
        ));
    }

    let line = state
        .cart
        .add_item(user_id, ProductId::new(req.product_id), req.quantity)
        .await?;

    let response = CartLineResponse {
        user_id: line.user_id.to_string(),
        product_id: line.product_id.to_string(),
        quantity: line.quantity,
    };
    Ok((StatusCode::CREATED, Json(response)))
}

/// GET /api/cart/{user_id} — list cart items with live product data.
#[tracing::instrument(skip(state))]
pub async fn get_cart(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<CartItemResponse>>, ApiError> {
    let user_id = UserId::from_uuid(parse_uuid(&user_id)?);

    let items = state.cart.list_items(user_id).await?;
    let responses = items
        .into_iter()
        .map(|item| CartItemResponse {
            product_id: item.product_id.to_string(),
            quantity: item.quantity,
            product: item.product.into(),
        })
        .collect();

    Ok(Json(responses))
}

/// DELETE /api/cart/{user_id}/clear — empty a user's cart.
#[tracing::instrument(skip(state))]
pub async fn clear(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let user_id = UserId::from_uuid(parse_uuid(&user_id)?);

    state.cart.clear(user_id).await?;

    Ok(Json(
        serde_json::json!({ "message": "Cart cleared successfully" }),
    ))
}

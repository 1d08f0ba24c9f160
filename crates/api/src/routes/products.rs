//! Product catalog endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use common::{Money, ProductId};
use domain::Product;
use serde::{Deserialize, Serialize};
use store::ProductCatalog;

use crate::AppState;
use crate::error::ApiError;

// -- Request types --

#[derive(Deserialize)]
pub struct CreateProductRequest {
    pub id: String,
    pub name: String,
    pub price_cents: i64,
    pub stock: u32,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: String,
}

// -- Response types --

#[derive(Serialize)]
pub struct ProductResponse {
    pub id: String,
    pub name: String,
    pub price_cents: i64,
    pub stock: u32,
}

impl From<Product> for ProductResponse {
    fn from(product: Product) -> Self {
        Self {
            id: product.id.to_string(),
            name: product.name,
            price_cents: product.price.cents(),
            stock: product.stock,
        }
    }
}

// -- Handlers --

/// POST /api/products — create a product.
#[tracing::instrument(skip(state, req))]
pub async fn create(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<ProductResponse>), ApiError> {
    if req.id.trim().is_empty() {
        return Err(ApiError::BadRequest("Product ID is required".to_string()));
    }
    if req.name.trim().is_empty() {
        return Err(ApiError::BadRequest("Product name is required".to_string()));
    }
    if req.price_cents < 0 {
        return Err(ApiError::BadRequest(
            "Price must not be negative".to_string(),
        ));
    }

    let product = state
        .catalog
        .insert(Product::new(
            req.id,
            req.name,
            Money::from_cents(req.price_cents),
            req.stock,
        ))
        .await?;

    Ok((StatusCode::CREATED, Json(product.into())))
}

/// GET /api/products — list all products.
#[tracing::instrument(skip(state))]
pub async fn list(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ProductResponse>>, ApiError> {
    let products = state.catalog.list().await?;
    Ok(Json(products.into_iter().map(Into::into).collect()))
}

/// GET /api/products/{id} — fetch a single product.
#[tracing::instrument(skip(state))]
pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ProductResponse>, ApiError> {
    let product = state
        .catalog
        .get(&ProductId::new(id.as_str()))
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Product not found with id: {id}")))?;

    Ok(Json(product.into()))
}

/// GET /api/products/search?q= — search products by name.
#[tracing::instrument(skip(state))]
pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<ProductResponse>>, ApiError> {
    let products = state.catalog.search(&params.q).await?;
    Ok(Json(products.into_iter().map(Into::into).collect()))
}

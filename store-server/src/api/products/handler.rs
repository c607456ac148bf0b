//! Product API handlers
//!
//! Catalog reads are public; catalog writes and stock adjustments are
//! admin operations. Stock is owned by the inventory ledger, so the
//! generic update endpoint cannot touch it.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use http::StatusCode;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::api::identity::Identity;
use crate::core::ServerState;
use shared::models::{Product, ProductCreate, ProductUpdate};
use shared::{AppError, AppResult};

/// Query params for the product list
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// Include deactivated products (admin view)
    #[serde(default)]
    pub include_inactive: bool,
}

/// GET /api/products - catalog listing
pub async fn list(
    State(state): State<ServerState>,
    identity: Identity,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<Product>>> {
    let include_inactive = query.include_inactive && identity.require_admin().is_ok();
    let products = state.engine.ledger().list(include_inactive)?;
    Ok(Json(products))
}

/// GET /api/products/:id
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Product>> {
    let product = state
        .engine
        .ledger()
        .get(&id)?
        .ok_or_else(|| AppError::not_found(format!("Product {}", id)))?;
    Ok(Json(product))
}

/// POST /api/products - add a product (admin)
pub async fn create(
    State(state): State<ServerState>,
    identity: Identity,
    Json(payload): Json<ProductCreate>,
) -> AppResult<(StatusCode, Json<Product>)> {
    identity.require_admin()?;
    if payload.price < Decimal::ZERO {
        return Err(AppError::validation("Price cannot be negative"));
    }
    if payload.discount_price.is_some_and(|d| d < Decimal::ZERO) {
        return Err(AppError::validation("Discount price cannot be negative"));
    }

    let product = state.engine.ledger().insert(payload)?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// PUT /api/products/:id - edit catalog fields (admin)
pub async fn update(
    State(state): State<ServerState>,
    identity: Identity,
    Path(id): Path<String>,
    Json(payload): Json<ProductUpdate>,
) -> AppResult<Json<Product>> {
    identity.require_admin()?;
    let product = state.engine.ledger().update(&id, payload)?;
    Ok(Json(product))
}

/// DELETE /api/products/:id - deactivate, never physically remove
/// (existing order lines keep pointing at the product)
pub async fn deactivate(
    State(state): State<ServerState>,
    identity: Identity,
    Path(id): Path<String>,
) -> AppResult<Json<Product>> {
    identity.require_admin()?;
    let product = state.engine.ledger().deactivate(&id)?;
    Ok(Json(product))
}

/// Stock adjustment request
#[derive(Debug, Deserialize)]
pub struct SetStockRequest {
    pub stock: u32,
}

/// PUT /api/products/:id/stock - restock / correct stock (admin)
pub async fn set_stock(
    State(state): State<ServerState>,
    identity: Identity,
    Path(id): Path<String>,
    Json(payload): Json<SetStockRequest>,
) -> AppResult<Json<Product>> {
    identity.require_admin()?;
    let product = state.engine.ledger().set_stock(&id, payload.stock)?;
    Ok(Json(product))
}

/// Query params for the low-stock listing
#[derive(Debug, Deserialize)]
pub struct LowStockQuery {
    /// Defaults to the configured threshold
    #[serde(default)]
    pub threshold: Option<u32>,
}

/// GET /api/products/low-stock - active products under the threshold,
/// scarcest first (admin)
pub async fn low_stock(
    State(state): State<ServerState>,
    identity: Identity,
    Query(query): Query<LowStockQuery>,
) -> AppResult<Json<Vec<Product>>> {
    identity.require_admin()?;
    let threshold = query.threshold.unwrap_or(state.config.low_stock_threshold);
    let products = state.engine.ledger().low_stock(threshold)?.collect();
    Ok(Json(products))
}

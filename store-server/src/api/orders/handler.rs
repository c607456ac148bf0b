//! Order API handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use http::StatusCode;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::api::identity::Identity;
use crate::core::ServerState;
use crate::orders::{Buyer, CartItem, NewOrder};
use shared::models::{GuestInfo, Order, OrderStatus, PaymentMethod, PaymentStatus, ShippingAddress};
use shared::{AppError, AppResult, ErrorCode};

/// Query params for listing orders
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    50
}

/// One cart line in a checkout request
///
/// Serialize is required by the length validation on the cart, which
/// records the offending value as an error param.
#[derive(Debug, Serialize, Deserialize)]
pub struct CartItemPayload {
    pub product_id: String,
    pub quantity: u32,
    #[serde(default)]
    pub customization: Option<String>,
}

/// Guest contact info for anonymous checkout
#[derive(Debug, Deserialize, Validate)]
pub struct GuestPayload {
    #[validate(length(min = 1))]
    pub full_name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub phone: String,
}

impl From<GuestPayload> for GuestInfo {
    fn from(p: GuestPayload) -> Self {
        GuestInfo {
            full_name: p.full_name,
            email: p.email,
            phone: p.phone,
        }
    }
}

/// Checkout request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateOrderRequest {
    #[validate(length(min = 1, message = "Cart cannot be empty"))]
    pub items: Vec<CartItemPayload>,
    pub shipping_address: ShippingAddress,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    #[validate(nested)]
    pub guest: Option<GuestPayload>,
}

/// POST /api/orders - checkout
pub async fn create(
    State(state): State<ServerState>,
    identity: Identity,
    Json(payload): Json<CreateOrderRequest>,
) -> AppResult<(StatusCode, Json<Order>)> {
    payload
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let limiter_key = match &identity {
        Identity::Admin => "admin".to_string(),
        Identity::Customer(id) => format!("user:{}", id),
        Identity::Anonymous => match &payload.guest {
            Some(g) => format!("guest:{}", g.email),
            None => "guest:unknown".to_string(),
        },
    };
    if !state.checkout_limiter.check(&limiter_key) {
        return Err(AppError::new(ErrorCode::RateLimited));
    }

    // A request carries exactly one buyer: the authenticated account
    // or the embedded guest contact, never both.
    let buyer = match identity {
        Identity::Customer(user_id) => {
            if payload.guest.is_some() {
                return Err(AppError::with_message(
                    ErrorCode::BuyerConflict,
                    "Authenticated checkout cannot also carry guest info",
                ));
            }
            Buyer::User(user_id)
        }
        _ => {
            let guest = payload.guest.ok_or_else(|| {
                AppError::validation("Guest contact info is required for anonymous checkout")
            })?;
            Buyer::Guest(guest.into())
        }
    };

    let order = state.engine.create_order(NewOrder {
        items: payload
            .items
            .into_iter()
            .map(|i| CartItem {
                product_id: i.product_id,
                quantity: i.quantity,
                customization: i.customization,
            })
            .collect(),
        shipping_address: payload.shipping_address,
        payment_method: payload.payment_method,
        buyer,
    })?;

    Ok((StatusCode::CREATED, Json(order)))
}

/// GET /api/orders - own orders, or store-wide recent for admins
pub async fn list(
    State(state): State<ServerState>,
    identity: Identity,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<Order>>> {
    let actor = identity.require()?;
    let orders = state.engine.list_orders(&actor, query.limit)?;
    Ok(Json(orders))
}

/// GET /api/orders/:order_no
pub async fn get_by_no(
    State(state): State<ServerState>,
    identity: Identity,
    Path(order_no): Path<String>,
) -> AppResult<Json<Order>> {
    let actor = identity.require()?;
    let order = state.engine.get_order(&order_no, &actor)?;
    Ok(Json(order))
}

/// Status change request
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
    #[serde(default)]
    pub tracking_number: Option<String>,
}

/// PUT /api/orders/:order_no/status
pub async fn update_status(
    State(state): State<ServerState>,
    identity: Identity,
    Path(order_no): Path<String>,
    Json(payload): Json<UpdateStatusRequest>,
) -> AppResult<Json<Order>> {
    let actor = identity.require()?;
    let order = state
        .engine
        .transition(&order_no, payload.status, &actor, payload.tracking_number)?;
    Ok(Json(order))
}

/// Payment status change request
#[derive(Debug, Deserialize)]
pub struct UpdatePaymentRequest {
    pub payment_status: PaymentStatus,
}

/// PUT /api/orders/:order_no/payment
pub async fn update_payment(
    State(state): State<ServerState>,
    identity: Identity,
    Path(order_no): Path<String>,
    Json(payload): Json<UpdatePaymentRequest>,
) -> AppResult<Json<Order>> {
    let actor = identity.require()?;
    let order = state
        .engine
        .update_payment_status(&order_no, payload.payment_status, &actor)?;
    Ok(Json(order))
}

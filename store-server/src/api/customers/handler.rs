//! Customer API handlers

use axum::{
    Json,
    extract::{Path, State},
};
use http::StatusCode;
use serde::Deserialize;
use validator::Validate;

use crate::api::identity::Identity;
use crate::core::ServerState;
use shared::models::{Customer, CustomerCreate};
use shared::{AppError, AppResult};

/// Registration request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(email)]
    pub email: String,
}

/// POST /api/customers - register
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<Customer>)> {
    payload
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let customer = state.customers.insert(CustomerCreate {
        name: payload.name,
        email: payload.email,
    })?;
    Ok((StatusCode::CREATED, Json(customer)))
}

/// GET /api/customers - active customers (admin)
pub async fn list(
    State(state): State<ServerState>,
    identity: Identity,
) -> AppResult<Json<Vec<Customer>>> {
    identity.require_admin()?;
    let customers = state.customers.list_active()?;
    Ok(Json(customers))
}

/// GET /api/customers/:id - own profile or admin
pub async fn get_by_id(
    State(state): State<ServerState>,
    identity: Identity,
    Path(id): Path<String>,
) -> AppResult<Json<Customer>> {
    if identity != Identity::Admin && identity != Identity::Customer(id.clone()) {
        return Err(AppError::forbidden("Not your profile"));
    }

    let customer = state
        .customers
        .get(&id)?
        .ok_or_else(|| AppError::not_found(format!("Customer {}", id)))?;
    Ok(Json(customer))
}

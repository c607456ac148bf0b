//! Order API module
//!
//! Checkout and order lifecycle. Creation is open to guests; reads
//! are scoped to the owner; lifecycle mutations go through the
//! engine's authorization rules.

mod handler;

use axum::{
    Router,
    routing::{get, put},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/orders", order_routes())
}

fn order_routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route("/{order_no}", get(handler::get_by_no))
        .route("/{order_no}/status", put(handler::update_status))
        .route("/{order_no}/payment", put(handler::update_payment))
}

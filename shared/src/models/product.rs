//! Product Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Product entity
///
/// `stock` and `sales` are owned by the inventory ledger: every sale
/// decrements stock and increments sales by the same quantity, and
/// stock never goes negative. Products are soft-deleted by flipping
/// `is_active` so historical order lines can keep referencing them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub title: String,
    /// Base unit price
    pub price: Decimal,
    /// Promotional price; when present it is the price charged
    pub discount_price: Option<Decimal>,
    /// Units on hand (never negative)
    pub stock: u32,
    /// Cumulative units sold
    pub sales: u64,
    pub image: Option<String>,
    pub is_active: bool,
    /// Unix millis
    pub created_at: i64,
}

impl Product {
    /// The unit price a buyer is charged right now
    pub fn effective_price(&self) -> Decimal {
        self.discount_price.unwrap_or(self.price)
    }
}

/// Create product payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductCreate {
    pub title: String,
    pub price: Decimal,
    pub discount_price: Option<Decimal>,
    pub stock: Option<u32>,
    pub image: Option<String>,
}

/// Update product payload
///
/// Stock is deliberately absent: stock mutations go through the
/// inventory ledger (reserve/release/set_stock), not generic update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductUpdate {
    pub title: Option<String>,
    pub price: Option<Decimal>,
    pub discount_price: Option<Decimal>,
    pub image: Option<String>,
    pub is_active: Option<bool>,
}

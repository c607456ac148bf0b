//! Order Model
//!
//! Orders are immutable once created except for status transitions,
//! payment-status transitions, and tracking-number attachment. Line
//! items are frozen snapshots of the product at purchase time, so
//! later catalog edits never change a persisted order.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Order fulfilment status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Whether moving to `target` is legal.
    ///
    /// The forward path Pending -> Processing -> Shipped -> Delivered
    /// advances one step at a time. Cancellation is reachable only
    /// from Pending and Processing; shipped or delivered orders can
    /// no longer be cancelled.
    pub fn can_transition_to(self, target: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, target),
            (Pending, Processing)
                | (Processing, Shipped)
                | (Shipped, Delivered)
                | (Pending, Cancelled)
                | (Processing, Cancelled)
        )
    }

    /// Terminal states accept no further transitions
    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }
}

/// Payment status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
    Refunded,
}

impl PaymentStatus {
    /// Payment state machine: Pending -> Completed | Failed,
    /// Completed -> Refunded, Failed -> Pending (retry).
    pub fn can_transition_to(self, target: PaymentStatus) -> bool {
        use PaymentStatus::*;
        matches!(
            (self, target),
            (Pending, Completed) | (Pending, Failed) | (Completed, Refunded) | (Failed, Pending)
        )
    }
}

/// Payment method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    /// Cash on delivery
    Cod,
    Online,
}

/// Contact info embedded in a guest order (no owning account)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuestInfo {
    pub full_name: String,
    pub email: String,
    pub phone: String,
}

/// Shipping address
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShippingAddress {
    pub full_name: String,
    pub phone: String,
    pub address_line1: String,
    pub address_line2: Option<String>,
    pub city: String,
    pub region: String,
    pub postal_code: String,
}

/// Frozen line item: the product as it was at purchase time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: String,
    pub title: String,
    /// Price charged per unit (discount price at purchase time if any)
    pub unit_price: Decimal,
    pub quantity: u32,
    pub customization: Option<String>,
    pub image: Option<String>,
}

impl OrderItem {
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// A recorded status change (audit trail)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusChange {
    pub status: OrderStatus,
    /// Unix millis
    pub at: i64,
}

/// Order entity
///
/// Exactly one of `user_id` / `guest` is set. Totals satisfy
/// `total = subtotal + shipping_fee + tax`, computed once at creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    /// Human-readable, collision-resistant order number (primary key)
    pub order_no: String,
    pub user_id: Option<String>,
    pub guest: Option<GuestInfo>,
    pub items: Vec<OrderItem>,
    pub shipping_address: ShippingAddress,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub status: OrderStatus,
    pub subtotal: Decimal,
    pub shipping_fee: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
    pub tracking_number: Option<String>,
    /// Unix millis
    pub created_at: i64,
    pub history: Vec<StatusChange>,
}

impl Order {
    /// Whether the given authenticated user owns this order
    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.user_id.as_deref() == Some(user_id)
    }

    /// Guest order = no owning account, identified by contact info
    pub fn is_guest(&self) -> bool {
        self.guest.is_some()
    }
}

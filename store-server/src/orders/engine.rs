//! Order lifecycle engine
//!
//! Orchestrates the inventory ledger, pricing calculator, and order
//! store: cart -> priced order with frozen line items, the status
//! state machine, and cancellation with stock restoration.
//!
//! The ledger has no cross-product transaction, so multi-item orders
//! are made all-or-nothing here: reservations are applied one product
//! at a time and compensated (released) if any later step fails.
//! Status and payment updates go the other way: each one is a single
//! write transaction (the status gate, the document write, and the
//! stock releases on cancellation commit together), so concurrent
//! updates to the same order serialize on the storage writer.
//! Events are published only after the storage commit.

use crate::orders::events::{OrderEvent, OrderEventBus};
use crate::orders::number;
use crate::pricing;
use crate::storage::{InventoryLedger, OrderStore, StorageError, StoreDb};
use shared::models::{
    GuestInfo, Order, OrderItem, OrderStatus, PaymentMethod, PaymentStatus, ShippingAddress,
    StatusChange,
};
use shared::util::now_millis;
use shared::{AppError, AppResult, ErrorCode};
use std::time::{Duration, Instant};

/// Retries on order-number collision before giving up
const ORDER_NO_RETRIES: u32 = 3;

/// Who is asking for an operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Actor {
    Admin,
    Customer(String),
}

impl Actor {
    fn is_admin(&self) -> bool {
        matches!(self, Actor::Admin)
    }

    fn owns(&self, order: &Order) -> bool {
        match self {
            Actor::Admin => false,
            Actor::Customer(id) => order.is_owned_by(id),
        }
    }
}

/// Order buyer: an authenticated account or embedded guest contact
/// info, never both (enforced at request parsing)
#[derive(Debug, Clone)]
pub enum Buyer {
    User(String),
    Guest(GuestInfo),
}

/// One cart line as submitted by the client
#[derive(Debug, Clone)]
pub struct CartItem {
    pub product_id: String,
    pub quantity: u32,
    pub customization: Option<String>,
}

/// Validated order-creation input
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub items: Vec<CartItem>,
    pub shipping_address: ShippingAddress,
    pub payment_method: PaymentMethod,
    pub buyer: Buyer,
}

/// Order lifecycle engine
#[derive(Clone)]
pub struct OrderEngine {
    ledger: InventoryLedger,
    orders: OrderStore,
    events: OrderEventBus,
    create_timeout: Duration,
}

impl OrderEngine {
    pub fn new(db: StoreDb, events: OrderEventBus, create_timeout: Duration) -> Self {
        Self {
            ledger: InventoryLedger::new(db.clone()),
            orders: OrderStore::new(db),
            events,
            create_timeout,
        }
    }

    pub fn ledger(&self) -> &InventoryLedger {
        &self.ledger
    }

    pub fn order_store(&self) -> &OrderStore {
        &self.orders
    }

    // ========== Creation ==========

    /// Create an order from a cart.
    ///
    /// Reserves stock per item with rollback of all prior
    /// reservations on the first failure, freezes line items at the
    /// reserved price, computes totals once, and persists with
    /// status Pending / payment Pending. The whole operation runs
    /// under a deadline; exceeding it fails with `OperationTimedOut`
    /// after the same compensation.
    pub fn create_order(&self, input: NewOrder) -> AppResult<Order> {
        if input.items.is_empty() {
            return Err(AppError::new(ErrorCode::OrderEmpty));
        }

        let deadline = Instant::now() + self.create_timeout;
        let mut reserved: Vec<(String, u32)> = Vec::with_capacity(input.items.len());
        let mut lines: Vec<OrderItem> = Vec::with_capacity(input.items.len());

        for item in &input.items {
            if Instant::now() >= deadline {
                self.rollback(&reserved);
                return Err(AppError::timed_out("Order creation exceeded its deadline"));
            }

            let unit_price = match self.ledger.reserve(&item.product_id, item.quantity) {
                Ok(price) => price,
                Err(err) => {
                    self.rollback(&reserved);
                    return Err(err.into());
                }
            };
            reserved.push((item.product_id.clone(), item.quantity));

            // Snapshot title/image after the reservation succeeded;
            // products are never physically removed, so this read
            // cannot miss.
            let product = match self.ledger.get(&item.product_id) {
                Ok(Some(p)) => p,
                Ok(None) => {
                    self.rollback(&reserved);
                    return Err(AppError::internal("Reserved product vanished"));
                }
                Err(err) => {
                    self.rollback(&reserved);
                    return Err(err.into());
                }
            };

            lines.push(OrderItem {
                product_id: product.id,
                title: product.title,
                unit_price,
                quantity: item.quantity,
                customization: item.customization.clone(),
                image: product.image,
            });
        }

        let totals = pricing::price_items(
            &lines
                .iter()
                .map(|l| (l.unit_price, l.quantity))
                .collect::<Vec<_>>(),
        );

        let (user_id, guest) = match input.buyer {
            Buyer::User(id) => (Some(id), None),
            Buyer::Guest(info) => (None, Some(info)),
        };

        let created_at = now_millis();
        let mut order = Order {
            order_no: String::new(),
            user_id,
            guest,
            items: lines,
            shipping_address: input.shipping_address,
            payment_method: input.payment_method,
            payment_status: PaymentStatus::Pending,
            status: OrderStatus::Pending,
            subtotal: totals.subtotal,
            shipping_fee: totals.shipping_fee,
            tax: totals.tax,
            total: totals.total,
            tracking_number: None,
            created_at,
            history: vec![StatusChange {
                status: OrderStatus::Pending,
                at: created_at,
            }],
        };

        // The store enforces order-number uniqueness; retry with a
        // fresh random suffix on collision.
        let mut attempts = 0;
        loop {
            order.order_no = number::generate();
            match self.orders.insert(&order) {
                Ok(()) => break,
                Err(StorageError::DuplicateOrder(_)) if attempts < ORDER_NO_RETRIES => {
                    attempts += 1;
                }
                Err(err) => {
                    self.rollback(&reserved);
                    return Err(err.into());
                }
            }
        }

        tracing::info!(
            order_no = %order.order_no,
            items = order.items.len(),
            total = %order.total,
            "Order created"
        );
        self.events.publish(OrderEvent::Placed {
            order: Box::new(order.clone()),
        });
        Ok(order)
    }

    // ========== Transitions ==========

    /// Move an order along the status state machine.
    ///
    /// Forward transitions (Processing, Shipped, Delivered) require
    /// an admin; cancellation is allowed to the admin or the owning
    /// customer. The status gate, the document write, and (for
    /// cancellation) the stock releases run in one write transaction,
    /// so two racing cancellations cannot both pass the gate and an
    /// order never releases its stock twice.
    pub fn transition(
        &self,
        order_no: &str,
        target: OrderStatus,
        actor: &Actor,
        tracking_number: Option<String>,
    ) -> AppResult<Order> {
        // Ownership never changes after creation, so the permission
        // check can use a plain read; the status gate runs on the
        // current document inside the write transaction below.
        let current = self
            .orders
            .get(order_no)?
            .ok_or_else(|| order_not_found(order_no))?;

        if target == OrderStatus::Cancelled {
            if !actor.is_admin() && !actor.owns(&current) {
                return Err(AppError::forbidden(
                    "Only the order owner or an admin can cancel",
                ));
            }
        } else if !actor.is_admin() {
            return Err(AppError::new(ErrorCode::AdminRequired));
        }

        let mut from = current.status;
        let order = self.orders.update_with(order_no, |order: &mut Order| {
            from = order.status;
            if !order.status.can_transition_to(target) {
                return Err(AppError::invalid_transition(format!(
                    "Cannot transition order from {:?} to {:?}",
                    order.status, target
                )));
            }

            let releases = if target == OrderStatus::Cancelled {
                order
                    .items
                    .iter()
                    .map(|i| (i.product_id.clone(), i.quantity))
                    .collect()
            } else {
                Vec::new()
            };

            order.status = target;
            if let Some(tracking) = tracking_number {
                order.tracking_number = Some(tracking);
            }
            order.history.push(StatusChange {
                status: target,
                at: now_millis(),
            });
            Ok(releases)
        })?;

        tracing::info!(order_no = %order.order_no, from = ?from, to = ?target, "Order transitioned");
        self.events.publish(OrderEvent::StatusChanged {
            order_no: order.order_no.clone(),
            from,
            to: target,
        });
        Ok(order)
    }

    /// Update the payment status along the payment state machine.
    ///
    /// Same single-transaction shape as [`Self::transition`]: the gate
    /// runs against the current document, so a racing status change
    /// on the same order is never overwritten.
    pub fn update_payment_status(
        &self,
        order_no: &str,
        target: PaymentStatus,
        actor: &Actor,
    ) -> AppResult<Order> {
        if !actor.is_admin() {
            return Err(AppError::new(ErrorCode::AdminRequired));
        }

        let mut from = target;
        let order = self.orders.update_with(order_no, |order: &mut Order| {
            from = order.payment_status;
            if !order.payment_status.can_transition_to(target) {
                return Err(AppError::with_message(
                    ErrorCode::InvalidPaymentTransition,
                    format!(
                        "Cannot transition payment from {:?} to {:?}",
                        order.payment_status, target
                    ),
                ));
            }
            order.payment_status = target;
            Ok(Vec::new())
        })?;

        self.events.publish(OrderEvent::PaymentStatusChanged {
            order_no: order.order_no.clone(),
            from,
            to: target,
        });
        Ok(order)
    }

    // ========== Queries (access-controlled) ==========

    /// Fetch one order; admins see everything, customers their own
    pub fn get_order(&self, order_no: &str, actor: &Actor) -> AppResult<Order> {
        let order = self
            .orders
            .get(order_no)?
            .ok_or_else(|| order_not_found(order_no))?;

        if actor.is_admin() || actor.owns(&order) {
            Ok(order)
        } else {
            Err(AppError::forbidden("Not your order"))
        }
    }

    /// List orders: admins get the most recent across the store,
    /// customers get their own
    pub fn list_orders(&self, actor: &Actor, limit: usize) -> AppResult<Vec<Order>> {
        let orders = match actor {
            Actor::Admin => self.orders.list_recent(limit)?,
            Actor::Customer(id) => self.orders.list_for_user(id)?,
        };
        Ok(orders)
    }

    // ========== Compensation ==========

    /// Best-effort release of reservations applied so far in a failed
    /// create. Products are never physically removed, so failures
    /// here indicate storage-level trouble and are logged loudly.
    fn rollback(&self, reserved: &[(String, u32)]) {
        for (product_id, quantity) in reserved {
            if let Err(err) = self.ledger.release(product_id, *quantity) {
                tracing::error!(
                    product_id = %product_id,
                    quantity,
                    error = %err,
                    "Failed to roll back reservation"
                );
            }
        }
    }

}

fn order_not_found(order_no: &str) -> AppError {
    AppError::with_message(
        ErrorCode::OrderNotFound,
        format!("Order {} not found", order_no),
    )
    .with_detail("order_no", order_no)
}

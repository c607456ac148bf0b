//! Order event bus
//!
//! The lifecycle engine publishes an event after every committed
//! order mutation; the notification collaborator (email, push — out
//! of scope) consumes them. Delivery failure never rolls back the
//! mutation: it is counted and surfaced on the health endpoint as a
//! non-blocking warning.

use shared::models::{Order, OrderStatus, PaymentStatus};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::broadcast;

/// Default channel capacity before slow consumers start lagging
const DEFAULT_CAPACITY: usize = 256;

/// Committed order mutation, published after the storage commit
#[derive(Debug, Clone)]
pub enum OrderEvent {
    Placed {
        order: Box<Order>,
    },
    StatusChanged {
        order_no: String,
        from: OrderStatus,
        to: OrderStatus,
    },
    PaymentStatusChanged {
        order_no: String,
        from: PaymentStatus,
        to: PaymentStatus,
    },
}

impl OrderEvent {
    pub fn order_no(&self) -> &str {
        match self {
            Self::Placed { order } => &order.order_no,
            Self::StatusChanged { order_no, .. } => order_no,
            Self::PaymentStatusChanged { order_no, .. } => order_no,
        }
    }
}

/// Broadcast bus for committed order events
#[derive(Clone)]
pub struct OrderEventBus {
    tx: broadcast::Sender<OrderEvent>,
    dropped: Arc<AtomicU64>,
}

impl OrderEventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity);
        Self {
            tx,
            dropped: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Subscribe to future events
    pub fn subscribe(&self) -> broadcast::Receiver<OrderEvent> {
        self.tx.subscribe()
    }

    /// Publish a committed event.
    ///
    /// Failure (no consumer attached) is a dependency failure of the
    /// notification collaborator: counted and logged, never returned
    /// to the caller whose order mutation already committed.
    pub fn publish(&self, event: OrderEvent) {
        let order_no = event.order_no().to_string();
        match self.tx.send(event) {
            Ok(receivers) => {
                tracing::debug!(order_no = %order_no, receivers, "Published order event");
            }
            Err(_) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(
                    order_no = %order_no,
                    "Order event dropped: no notification consumer attached"
                );
            }
        }
    }

    /// Number of events that found no consumer (health endpoint)
    pub fn dropped_count(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl Default for OrderEventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

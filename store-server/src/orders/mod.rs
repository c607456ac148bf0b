//! Order placement and lifecycle

mod engine;
mod events;
mod number;

pub use engine::{Actor, Buyer, CartItem, NewOrder, OrderEngine};
pub use events::{OrderEvent, OrderEventBus};
pub use number::ORDER_NO_PREFIX;

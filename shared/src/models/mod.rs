//! Data models
//!
//! Shared between the server and API clients. Money fields are
//! `rust_decimal::Decimal`; timestamps are Unix millis (`i64`).

pub mod customer;
pub mod order;
pub mod product;

// Re-exports
pub use customer::*;
pub use order::*;
pub use product::*;

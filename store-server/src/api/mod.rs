//! API routing module
//!
//! # Structure
//!
//! - [`health`] - liveness and component checks
//! - [`products`] - catalog and stock management
//! - [`customers`] - registration and profiles
//! - [`orders`] - checkout and order lifecycle
//! - [`dashboard`] - store statistics
//! - [`identity`] - gateway-asserted caller identity

pub mod identity;

pub mod customers;
pub mod dashboard;
pub mod health;
pub mod orders;
pub mod products;

pub use identity::Identity;

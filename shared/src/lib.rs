//! Shared domain types for the storefront server
//!
//! This crate holds everything both the server and its API clients
//! agree on: data models, the unified error system, and small
//! utilities. It performs no I/O.

pub mod error;
pub mod models;
pub mod util;

pub use error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};

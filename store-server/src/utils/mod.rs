//! Utility module
//!
//! - [`AppError`] / [`ApiResponse`] - unified error and response types
//!   (from `shared::error`)
//! - [`logger`] - tracing setup

pub mod logger;

pub use shared::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};

//! Unified error codes for the storefront server
//!
//! Error codes are shared between the server and its clients so that
//! the admin console and storefront can branch on stable numbers.
//! Codes are organized by category:
//! - 0xxx: General errors
//! - 2xxx: Permission errors
//! - 4xxx: Order errors
//! - 5xxx: Payment errors
//! - 6xxx: Product / inventory errors
//! - 8xxx: Customer errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// Represented as `u16` for efficient serialization and stable
/// cross-language numbering (Rust server, TypeScript clients).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Invalid format
    InvalidFormat = 6,
    /// Required field missing
    RequiredField = 7,
    /// Value out of range
    ValueOutOfRange = 8,
    /// Too many requests in the current window
    RateLimited = 9,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,
    /// Admin role required
    AdminRequired = 2002,

    // ==================== 4xxx: Order ====================
    /// Order not found
    OrderNotFound = 4001,
    /// Illegal order status transition
    InvalidTransition = 4002,
    /// Order has no line items
    OrderEmpty = 4003,
    /// Exactly one of user identity / guest info must be supplied
    BuyerConflict = 4004,

    // ==================== 5xxx: Payment ====================
    /// Illegal payment status transition
    InvalidPaymentTransition = 5001,

    // ==================== 6xxx: Product ====================
    /// Product not found
    ProductNotFound = 6001,
    /// Requested quantity exceeds available stock
    InsufficientStock = 6002,
    /// Product is inactive (soft-deleted)
    ProductInactive = 6003,
    /// Quantity must be a positive integer
    InvalidQuantity = 6004,

    // ==================== 8xxx: Customer ====================
    /// Customer not found
    CustomerNotFound = 8001,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// A downstream collaborator (notification delivery) failed
    DependencyFailure = 9003,
    /// Operation exceeded its deadline
    OperationTimedOut = 9004,
    /// Configuration error
    ConfigError = 9005,
}

impl ErrorCode {
    /// Get the numeric value of this error code
    pub fn code(&self) -> u16 {
        *self as u16
    }

    /// Get the default human-readable message for this error code
    pub fn message(&self) -> &'static str {
        match self {
            Self::Success => "OK",
            Self::Unknown => "Unknown error",
            Self::ValidationFailed => "Validation failed",
            Self::NotFound => "Resource not found",
            Self::AlreadyExists => "Resource already exists",
            Self::InvalidRequest => "Invalid request",
            Self::InvalidFormat => "Invalid format",
            Self::RequiredField => "Required field missing",
            Self::ValueOutOfRange => "Value out of range",
            Self::RateLimited => "Too many requests",

            Self::PermissionDenied => "Permission denied",
            Self::AdminRequired => "Admin role required",

            Self::OrderNotFound => "Order not found",
            Self::InvalidTransition => "Illegal order status transition",
            Self::OrderEmpty => "Order has no items",
            Self::BuyerConflict => "Supply exactly one of user identity or guest info",

            Self::InvalidPaymentTransition => "Illegal payment status transition",

            Self::ProductNotFound => "Product not found",
            Self::InsufficientStock => "Insufficient stock",
            Self::ProductInactive => "Product is no longer available",
            Self::InvalidQuantity => "Quantity must be positive",

            Self::CustomerNotFound => "Customer not found",

            Self::InternalError => "Internal server error",
            Self::DatabaseError => "Database error",
            Self::DependencyFailure => "A downstream service failed",
            Self::OperationTimedOut => "Operation timed out",
            Self::ConfigError => "Configuration error",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({})", self, self.code())
    }
}

impl From<ErrorCode> for u16 {
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

impl TryFrom<u16> for ErrorCode {
    type Error = String;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Success),
            1 => Ok(Self::Unknown),
            2 => Ok(Self::ValidationFailed),
            3 => Ok(Self::NotFound),
            4 => Ok(Self::AlreadyExists),
            5 => Ok(Self::InvalidRequest),
            6 => Ok(Self::InvalidFormat),
            7 => Ok(Self::RequiredField),
            8 => Ok(Self::ValueOutOfRange),
            9 => Ok(Self::RateLimited),

            2001 => Ok(Self::PermissionDenied),
            2002 => Ok(Self::AdminRequired),

            4001 => Ok(Self::OrderNotFound),
            4002 => Ok(Self::InvalidTransition),
            4003 => Ok(Self::OrderEmpty),
            4004 => Ok(Self::BuyerConflict),

            5001 => Ok(Self::InvalidPaymentTransition),

            6001 => Ok(Self::ProductNotFound),
            6002 => Ok(Self::InsufficientStock),
            6003 => Ok(Self::ProductInactive),
            6004 => Ok(Self::InvalidQuantity),

            8001 => Ok(Self::CustomerNotFound),

            9001 => Ok(Self::InternalError),
            9002 => Ok(Self::DatabaseError),
            9003 => Ok(Self::DependencyFailure),
            9004 => Ok(Self::OperationTimedOut),
            9005 => Ok(Self::ConfigError),

            _ => Err(format!("Unknown error code: {}", value)),
        }
    }
}

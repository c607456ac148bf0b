//! Store Server - storefront order placement and inventory engine
//!
//! # Module structure
//!
//! ```text
//! store-server/src/
//! ├── core/        # configuration, state, HTTP server
//! ├── api/         # HTTP routes and handlers
//! ├── pricing/     # order totals calculation
//! ├── orders/      # lifecycle engine, order numbers, event bus
//! ├── reporting/   # dashboard aggregation
//! ├── storage/     # embedded redb stores (products, orders, customers)
//! └── utils/       # logging and shared error re-exports
//! ```
//!
//! The write path is: cart -> inventory reservation (atomic per
//! product) -> pricing -> order document -> event publish. Everything
//! else is reads over the same embedded database.

pub mod api;
pub mod core;
pub mod orders;
pub mod pricing;
pub mod reporting;
pub mod storage;
pub mod utils;

pub use crate::core::{Config, Server, ServerState, build_app, build_router};
pub use orders::{Actor, Buyer, CartItem, NewOrder, OrderEngine, OrderEvent, OrderEventBus};
pub use reporting::{DashboardStats, ReportingAggregator};
pub use storage::{CustomerStore, InventoryLedger, OrderStore, StoreDb};

// Re-export unified error types from shared
pub use utils::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

/// Load `.env`, prepare the working directory, and initialize logging
pub fn setup_environment(config: &Config) -> std::io::Result<()> {
    dotenv::dotenv().ok();

    std::fs::create_dir_all(config.log_dir())?;

    let level = if config.is_production() { "info" } else { "debug" };
    init_logger_with_file(Some(level), config.log_dir().to_str());
    Ok(())
}

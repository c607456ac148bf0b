//! redb-based storage layer
//!
//! # Tables
//!
//! | Table | Key | Value | Purpose |
//! |-------|-----|-------|---------|
//! | `products` | `product_id` | `Product` | Catalog + stock/sales counters |
//! | `orders` | `order_no` | `Order` | Persisted order documents |
//! | `customers` | `customer_id` | `Customer` | Customer accounts |
//!
//! # Atomicity
//!
//! redb serializes write transactions (single writer), so the
//! read-check-write performed by [`InventoryLedger::reserve`] is the
//! "decrement stock by N only if stock >= N" conditional update: two
//! concurrent reservations against the same product cannot both
//! observe the pre-decrement stock.
//!
//! Values are JSON-serialized; the dataset is bounded (one store, no
//! multi-warehouse), so full-table scans for listing and reporting
//! are acceptable and keep the query layer simple.

mod customers;
mod inventory;
mod orders;

pub use customers::CustomerStore;
pub use inventory::InventoryLedger;
pub use orders::OrderStore;

use redb::{Database, ReadableDatabase, TableDefinition};
use shared::{AppError, ErrorCode};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Catalog + inventory counters: key = product_id, value = JSON-serialized Product
const PRODUCTS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("products");

/// Orders: key = order_no, value = JSON-serialized Order
const ORDERS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("orders");

/// Customers: key = customer_id, value = JSON-serialized Customer
const CUSTOMERS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("customers");

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Product not found: {0}")]
    ProductNotFound(String),

    #[error("Product is inactive: {0}")]
    ProductInactive(String),

    #[error("Insufficient stock for {product_id}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: String,
        requested: u32,
        available: u32,
    },

    #[error("Quantity must be positive")]
    InvalidQuantity,

    #[error("Order already exists: {0}")]
    DuplicateOrder(String),

    #[error("Order not found: {0}")]
    OrderNotFound(String),

    #[error("Customer not found: {0}")]
    CustomerNotFound(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::ProductNotFound(id) => {
                AppError::with_message(ErrorCode::ProductNotFound, format!("Product {} not found", id))
                    .with_detail("product_id", id)
            }
            StorageError::ProductInactive(id) => {
                AppError::new(ErrorCode::ProductInactive).with_detail("product_id", id)
            }
            StorageError::InsufficientStock {
                product_id,
                requested,
                available,
            } => AppError::insufficient_stock(product_id)
                .with_detail("requested", requested)
                .with_detail("available", available),
            StorageError::InvalidQuantity => AppError::new(ErrorCode::InvalidQuantity),
            StorageError::DuplicateOrder(no) => AppError::already_exists(format!("Order {}", no)),
            StorageError::OrderNotFound(no) => {
                AppError::with_message(ErrorCode::OrderNotFound, format!("Order {} not found", no))
                    .with_detail("order_no", no)
            }
            StorageError::CustomerNotFound(id) => {
                AppError::with_message(ErrorCode::CustomerNotFound, format!("Customer {} not found", id))
                    .with_detail("customer_id", id)
            }
            // Internal storage failures are wrapped, never leaked verbatim
            other => {
                tracing::error!(error = %other, "Storage failure");
                AppError::database("Storage operation failed")
            }
        }
    }
}

/// Embedded store backing the inventory ledger, order store, and
/// customer store. Cheap to clone (shared `Arc<Database>`).
#[derive(Clone)]
pub struct StoreDb {
    db: Arc<Database>,
}

impl StoreDb {
    /// Open or create the database at the given path
    ///
    /// redb commits with immediate durability and copy-on-write
    /// atomic swaps, so the file is always in a consistent state
    /// even across power loss.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let db = Database::create(path)?;
        let store = Self { db: Arc::new(db) };
        store.init_tables()?;
        Ok(store)
    }

    /// Open an in-memory database (tests, ephemeral dev mode)
    pub fn open_in_memory() -> StorageResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        let store = Self { db: Arc::new(db) };
        store.init_tables()?;
        Ok(store)
    }

    fn init_tables(&self) -> StorageResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let _ = write_txn.open_table(PRODUCTS_TABLE)?;
            let _ = write_txn.open_table(ORDERS_TABLE)?;
            let _ = write_txn.open_table(CUSTOMERS_TABLE)?;
        }
        write_txn.commit()?;
        Ok(())
    }

    pub(crate) fn begin_write(&self) -> StorageResult<redb::WriteTransaction> {
        Ok(self.db.begin_write()?)
    }

    pub(crate) fn begin_read(&self) -> StorageResult<redb::ReadTransaction> {
        Ok(self.db.begin_read()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_in_memory_initializes_tables() {
        let store = StoreDb::open_in_memory().unwrap();
        // Tables readable immediately after open
        let read_txn = store.begin_read().unwrap();
        assert!(read_txn.open_table(PRODUCTS_TABLE).is_ok());
        assert!(read_txn.open_table(ORDERS_TABLE).is_ok());
        assert!(read_txn.open_table(CUSTOMERS_TABLE).is_ok());
    }

    #[test]
    fn test_reopen_preserves_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.redb");

        {
            let store = StoreDb::open(&path).unwrap();
            InventoryLedger::new(store)
                .insert(shared::models::ProductCreate {
                    title: "Widget".into(),
                    price: rust_decimal::Decimal::from(100),
                    discount_price: None,
                    stock: Some(3),
                    image: None,
                })
                .unwrap();
        }

        let store = StoreDb::open(&path).unwrap();
        let products = InventoryLedger::new(store).list(true).unwrap();
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].stock, 3);
    }

    #[test]
    fn test_storage_error_to_app_error() {
        let err: AppError = StorageError::InsufficientStock {
            product_id: "p1".into(),
            requested: 5,
            available: 2,
        }
        .into();
        assert_eq!(err.code, ErrorCode::InsufficientStock);
        let details = err.details.unwrap();
        assert_eq!(details.get("requested").unwrap(), 5);
        assert_eq!(details.get("available").unwrap(), 2);

        let err: AppError = StorageError::OrderNotFound("SO-1".into()).into();
        assert_eq!(err.code, ErrorCode::OrderNotFound);

        let err: AppError = StorageError::DuplicateOrder("SO-1".into()).into();
        assert_eq!(err.code, ErrorCode::AlreadyExists);

        let err: AppError = StorageError::InvalidQuantity.into();
        assert_eq!(err.code, ErrorCode::InvalidQuantity);
    }
}

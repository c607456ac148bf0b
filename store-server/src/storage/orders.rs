//! Order store
//!
//! Persists order documents keyed by order number. The store is pure
//! mechanism: uniqueness and lookups live here, while authorization
//! and the status state machine live in the lifecycle engine.

use super::{ORDERS_TABLE, PRODUCTS_TABLE, StorageError, StorageResult, StoreDb, inventory};
use redb::ReadableTable;
use shared::models::{Order, OrderStatus};

/// Order document store over the `orders` table
#[derive(Clone)]
pub struct OrderStore {
    db: StoreDb,
}

impl OrderStore {
    pub fn new(db: StoreDb) -> Self {
        Self { db }
    }

    /// Persist a new order; rejects duplicate order numbers
    pub fn insert(&self, order: &Order) -> StorageResult<()> {
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(ORDERS_TABLE)?;
            if table.get(order.order_no.as_str())?.is_some() {
                return Err(StorageError::DuplicateOrder(order.order_no.clone()));
            }
            let value = serde_json::to_vec(order)?;
            table.insert(order.order_no.as_str(), value.as_slice())?;
        }
        txn.commit()?;
        Ok(())
    }

    /// Re-read, mutate, and persist an order in one write transaction.
    ///
    /// The closure sees the current document and returns the stock
    /// releases (product id, quantity) to apply to the products table
    /// alongside the write; an error from the closure aborts the
    /// transaction with nothing persisted. This is the linearization
    /// point for status and payment updates: concurrent callers
    /// serialize on the redb writer, so the second of two racing
    /// cancellations observes the already-cancelled document and
    /// cannot release stock a second time.
    pub fn update_with<E, F>(&self, order_no: &str, apply: F) -> Result<Order, E>
    where
        E: From<StorageError>,
        F: FnOnce(&mut Order) -> Result<Vec<(String, u32)>, E>,
    {
        let txn = self.db.begin_write()?;
        let order = {
            let mut orders = txn.open_table(ORDERS_TABLE).map_err(StorageError::from)?;
            let mut order: Order = match orders.get(order_no).map_err(StorageError::from)? {
                Some(value) => {
                    serde_json::from_slice(value.value()).map_err(StorageError::from)?
                }
                None => return Err(StorageError::OrderNotFound(order_no.to_string()).into()),
            };

            let releases = apply(&mut order)?;
            if !releases.is_empty() {
                let mut products = txn.open_table(PRODUCTS_TABLE).map_err(StorageError::from)?;
                for (product_id, quantity) in &releases {
                    inventory::release_on(&mut products, product_id, *quantity)?;
                }
            }

            let value = serde_json::to_vec(&order).map_err(StorageError::from)?;
            orders
                .insert(order_no, value.as_slice())
                .map_err(StorageError::from)?;
            order
        };
        txn.commit().map_err(StorageError::from)?;
        Ok(order)
    }

    /// Get an order by its order number
    pub fn get(&self, order_no: &str) -> StorageResult<Option<Order>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ORDERS_TABLE)?;
        match table.get(order_no)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Most recent orders first, up to `limit`
    pub fn list_recent(&self, limit: usize) -> StorageResult<Vec<Order>> {
        let mut orders = self.scan()?;
        orders.sort_by_key(|o| std::cmp::Reverse(o.created_at));
        orders.truncate(limit);
        Ok(orders)
    }

    /// Orders owned by an authenticated user, most recent first
    pub fn list_for_user(&self, user_id: &str) -> StorageResult<Vec<Order>> {
        let mut orders: Vec<Order> = self
            .scan()?
            .into_iter()
            .filter(|o| o.is_owned_by(user_id))
            .collect();
        orders.sort_by_key(|o| std::cmp::Reverse(o.created_at));
        Ok(orders)
    }

    /// Orders created within `[from, to)` millis; `None` bound = open
    pub fn scan_range(&self, from: Option<i64>, to: Option<i64>) -> StorageResult<Vec<Order>> {
        Ok(self
            .scan()?
            .into_iter()
            .filter(|o| from.is_none_or(|f| o.created_at >= f))
            .filter(|o| to.is_none_or(|t| o.created_at < t))
            .collect())
    }

    /// Count of orders currently in a given status
    pub fn count_by_status(&self, status: OrderStatus) -> StorageResult<u64> {
        Ok(self.scan()?.iter().filter(|o| o.status == status).count() as u64)
    }

    fn scan(&self) -> StorageResult<Vec<Order>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ORDERS_TABLE)?;
        let mut orders = Vec::new();
        for result in table.iter()? {
            let (_key, value) = result?;
            let order: Order = serde_json::from_slice(value.value())?;
            orders.push(order);
        }
        Ok(orders)
    }
}

//! Customer store

use super::{CUSTOMERS_TABLE, StorageResult, StoreDb};
use redb::ReadableTable;
use shared::models::{Customer, CustomerCreate};
use shared::util::{now_millis, snowflake_id};

/// Customer store over the `customers` table
#[derive(Clone)]
pub struct CustomerStore {
    db: StoreDb,
}

impl CustomerStore {
    pub fn new(db: StoreDb) -> Self {
        Self { db }
    }

    /// Register a customer
    pub fn insert(&self, payload: CustomerCreate) -> StorageResult<Customer> {
        let customer = Customer {
            id: format!("cust-{}", snowflake_id()),
            name: payload.name,
            email: payload.email,
            is_active: true,
            created_at: now_millis(),
        };

        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(CUSTOMERS_TABLE)?;
            let value = serde_json::to_vec(&customer)?;
            table.insert(customer.id.as_str(), value.as_slice())?;
        }
        txn.commit()?;
        Ok(customer)
    }

    /// Get a customer by id
    pub fn get(&self, customer_id: &str) -> StorageResult<Option<Customer>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(CUSTOMERS_TABLE)?;
        match table.get(customer_id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// List active customers, newest first
    pub fn list_active(&self) -> StorageResult<Vec<Customer>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(CUSTOMERS_TABLE)?;
        let mut customers = Vec::new();
        for result in table.iter()? {
            let (_key, value) = result?;
            let customer: Customer = serde_json::from_slice(value.value())?;
            if customer.is_active {
                customers.push(customer);
            }
        }
        customers.sort_by_key(|c| std::cmp::Reverse(c.created_at));
        Ok(customers)
    }

    /// Count of active customers (dashboard)
    pub fn count_active(&self) -> StorageResult<u64> {
        Ok(self.list_active()?.len() as u64)
    }
}

//! Inventory ledger
//!
//! Single source of truth for per-product stock and sales counters.
//! Stock is mutated only here: `reserve` on order creation, `release`
//! on cancellation, `set_stock` for admin corrections. Every mutation
//! runs inside one write transaction, so the stock check and the
//! decrement are a single atomic step.

use super::{PRODUCTS_TABLE, StorageError, StorageResult, StoreDb};
use redb::ReadableTable;
use rust_decimal::Decimal;
use shared::models::{Product, ProductCreate, ProductUpdate};
use shared::util::{now_millis, snowflake_id};

/// Inventory ledger over the `products` table
#[derive(Clone)]
pub struct InventoryLedger {
    db: StoreDb,
}

impl InventoryLedger {
    pub fn new(db: StoreDb) -> Self {
        Self { db }
    }

    // ========== Reservation ==========

    /// Atomically reserve `quantity` units of a product for an order.
    ///
    /// Decrements stock and increments the sales counter by the same
    /// quantity in one transaction. Returns the unit price charged
    /// (discount price if present), which the caller snapshots into
    /// the frozen order line.
    ///
    /// Fails without any mutation when the product is missing or
    /// inactive, when quantity is zero, or when stock < quantity.
    pub fn reserve(&self, product_id: &str, quantity: u32) -> StorageResult<Decimal> {
        if quantity == 0 {
            return Err(StorageError::InvalidQuantity);
        }

        let txn = self.db.begin_write()?;
        let price = {
            let mut table = txn.open_table(PRODUCTS_TABLE)?;
            let mut product = read_product(&table, product_id)?
                .ok_or_else(|| StorageError::ProductNotFound(product_id.to_string()))?;

            if !product.is_active {
                return Err(StorageError::ProductInactive(product_id.to_string()));
            }
            if product.stock < quantity {
                return Err(StorageError::InsufficientStock {
                    product_id: product_id.to_string(),
                    requested: quantity,
                    available: product.stock,
                });
            }

            product.stock -= quantity;
            product.sales += u64::from(quantity);
            let price = product.effective_price();
            write_product(&mut table, &product)?;
            price
        };
        txn.commit()?;

        tracing::debug!(product_id = %product_id, quantity, "Reserved stock");
        Ok(price)
    }

    /// Reverse a reservation: increment stock, decrement sales.
    ///
    /// Used by the lifecycle engine to compensate a failed multi-item
    /// create. Cancellation releases through `release_on` inside the
    /// order-update transaction instead, so the status gate and the
    /// restoration commit together. The sales counter saturates at
    /// zero as a backstop.
    pub fn release(&self, product_id: &str, quantity: u32) -> StorageResult<()> {
        if quantity == 0 {
            return Err(StorageError::InvalidQuantity);
        }

        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(PRODUCTS_TABLE)?;
            release_on(&mut table, product_id, quantity)?;
        }
        txn.commit()?;

        tracing::debug!(product_id = %product_id, quantity, "Released stock");
        Ok(())
    }

    /// Active products with stock below `threshold`, stock ascending.
    ///
    /// Returns a finite, restartable iterator (call again for a fresh
    /// snapshot); intended for admin low-stock alerting.
    pub fn low_stock(
        &self,
        threshold: u32,
    ) -> StorageResult<impl Iterator<Item = Product> + use<>> {
        let mut below: Vec<Product> = self
            .scan()?
            .into_iter()
            .filter(|p| p.is_active && p.stock < threshold)
            .collect();
        below.sort_by_key(|p| p.stock);
        Ok(below.into_iter())
    }

    // ========== Catalog CRUD ==========

    /// Create a product
    pub fn insert(&self, payload: ProductCreate) -> StorageResult<Product> {
        let product = Product {
            id: format!("prod-{}", snowflake_id()),
            title: payload.title,
            price: payload.price,
            discount_price: payload.discount_price,
            stock: payload.stock.unwrap_or(0),
            sales: 0,
            image: payload.image,
            is_active: true,
            created_at: now_millis(),
        };

        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(PRODUCTS_TABLE)?;
            write_product(&mut table, &product)?;
        }
        txn.commit()?;
        Ok(product)
    }

    /// Get a product by id
    pub fn get(&self, product_id: &str) -> StorageResult<Option<Product>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(PRODUCTS_TABLE)?;
        read_product(&table, product_id)
    }

    /// List products, newest first
    pub fn list(&self, include_inactive: bool) -> StorageResult<Vec<Product>> {
        let mut products: Vec<Product> = self
            .scan()?
            .into_iter()
            .filter(|p| include_inactive || p.is_active)
            .collect();
        products.sort_by_key(|p| std::cmp::Reverse(p.created_at));
        Ok(products)
    }

    /// Apply a partial update (title/prices/image/active flag)
    pub fn update(&self, product_id: &str, payload: ProductUpdate) -> StorageResult<Product> {
        let txn = self.db.begin_write()?;
        let product = {
            let mut table = txn.open_table(PRODUCTS_TABLE)?;
            let mut product = read_product(&table, product_id)?
                .ok_or_else(|| StorageError::ProductNotFound(product_id.to_string()))?;

            if let Some(title) = payload.title {
                product.title = title;
            }
            if let Some(price) = payload.price {
                product.price = price;
            }
            if payload.discount_price.is_some() {
                product.discount_price = payload.discount_price;
            }
            if let Some(image) = payload.image {
                product.image = Some(image);
            }
            if let Some(is_active) = payload.is_active {
                product.is_active = is_active;
            }

            write_product(&mut table, &product)?;
            product
        };
        txn.commit()?;
        Ok(product)
    }

    /// Soft delete: flip to inactive, never physically removed while
    /// orders reference it
    pub fn deactivate(&self, product_id: &str) -> StorageResult<Product> {
        self.update(
            product_id,
            ProductUpdate {
                title: None,
                price: None,
                discount_price: None,
                image: None,
                is_active: Some(false),
            },
        )
    }

    /// Admin stock correction (absolute set, bypasses sales counter)
    pub fn set_stock(&self, product_id: &str, stock: u32) -> StorageResult<Product> {
        let txn = self.db.begin_write()?;
        let product = {
            let mut table = txn.open_table(PRODUCTS_TABLE)?;
            let mut product = read_product(&table, product_id)?
                .ok_or_else(|| StorageError::ProductNotFound(product_id.to_string()))?;
            product.stock = stock;
            write_product(&mut table, &product)?;
            product
        };
        txn.commit()?;
        Ok(product)
    }

    /// Count of active products (dashboard)
    pub fn count_active(&self) -> StorageResult<u64> {
        Ok(self.scan()?.iter().filter(|p| p.is_active).count() as u64)
    }

    fn scan(&self) -> StorageResult<Vec<Product>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(PRODUCTS_TABLE)?;
        let mut products = Vec::new();
        for result in table.iter()? {
            let (_key, value) = result?;
            let product: Product = serde_json::from_slice(value.value())?;
            products.push(product);
        }
        Ok(products)
    }
}

fn read_product(
    table: &impl ReadableTable<&'static str, &'static [u8]>,
    product_id: &str,
) -> StorageResult<Option<Product>> {
    match table.get(product_id)? {
        Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
        None => Ok(None),
    }
}

fn write_product(
    table: &mut redb::Table<'_, &'static str, &'static [u8]>,
    product: &Product,
) -> StorageResult<()> {
    let value = serde_json::to_vec(product)?;
    table.insert(product.id.as_str(), value.as_slice())?;
    Ok(())
}

/// Release stock within an already-open products table; the caller
/// owns the transaction. The order store uses this so a cancellation
/// restores stock in the same transaction that flips the status.
pub(super) fn release_on(
    table: &mut redb::Table<'_, &'static str, &'static [u8]>,
    product_id: &str,
    quantity: u32,
) -> StorageResult<()> {
    let mut product = read_product(table, product_id)?
        .ok_or_else(|| StorageError::ProductNotFound(product_id.to_string()))?;
    product.stock += quantity;
    product.sales = product.sales.saturating_sub(u64::from(quantity));
    write_product(table, &product)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ledger() -> InventoryLedger {
        InventoryLedger::new(StoreDb::open_in_memory().unwrap())
    }

    fn seed(ledger: &InventoryLedger, stock: u32, price: i64, discount: Option<i64>) -> Product {
        ledger
            .insert(ProductCreate {
                title: "Widget".into(),
                price: Decimal::from(price),
                discount_price: discount.map(Decimal::from),
                stock: Some(stock),
                image: None,
            })
            .unwrap()
    }

    #[test]
    fn test_reserve_decrements_stock_and_increments_sales() {
        let ledger = ledger();
        let p = seed(&ledger, 10, 100, None);

        let price = ledger.reserve(&p.id, 3).unwrap();
        assert_eq!(price, Decimal::from(100));

        let p = ledger.get(&p.id).unwrap().unwrap();
        assert_eq!(p.stock, 7);
        assert_eq!(p.sales, 3);
    }

    #[test]
    fn test_reserve_returns_discount_price_when_present() {
        let ledger = ledger();
        let p = seed(&ledger, 5, 100, Some(80));
        assert_eq!(ledger.reserve(&p.id, 1).unwrap(), Decimal::from(80));
    }

    #[test]
    fn test_reserve_insufficient_stock_no_mutation() {
        let ledger = ledger();
        let p = seed(&ledger, 2, 100, None);

        let err = ledger.reserve(&p.id, 3).unwrap_err();
        assert!(matches!(
            err,
            StorageError::InsufficientStock {
                requested: 3,
                available: 2,
                ..
            }
        ));

        let p = ledger.get(&p.id).unwrap().unwrap();
        assert_eq!(p.stock, 2);
        assert_eq!(p.sales, 0);
    }

    #[test]
    fn test_reserve_missing_or_inactive_product() {
        let ledger = ledger();
        assert!(matches!(
            ledger.reserve("prod-none", 1).unwrap_err(),
            StorageError::ProductNotFound(_)
        ));

        let p = seed(&ledger, 5, 100, None);
        ledger.deactivate(&p.id).unwrap();
        assert!(matches!(
            ledger.reserve(&p.id, 1).unwrap_err(),
            StorageError::ProductInactive(_)
        ));
    }

    #[test]
    fn test_reserve_zero_quantity_rejected() {
        let ledger = ledger();
        let p = seed(&ledger, 5, 100, None);
        assert!(matches!(
            ledger.reserve(&p.id, 0).unwrap_err(),
            StorageError::InvalidQuantity
        ));
    }

    #[test]
    fn test_release_restores_stock_and_sales() {
        let ledger = ledger();
        let p = seed(&ledger, 10, 100, None);
        ledger.reserve(&p.id, 4).unwrap();
        ledger.release(&p.id, 4).unwrap();

        let p = ledger.get(&p.id).unwrap().unwrap();
        assert_eq!(p.stock, 10);
        assert_eq!(p.sales, 0);
    }

    #[test]
    fn test_concurrent_reserves_cannot_oversell() {
        // stock=3, two concurrent reservations of 2: exactly one
        // succeeds and final stock is 1
        let ledger = ledger();
        let p = seed(&ledger, 3, 100, None);

        let mut handles = Vec::new();
        for _ in 0..2 {
            let ledger = ledger.clone();
            let id = p.id.clone();
            handles.push(std::thread::spawn(move || ledger.reserve(&id, 2)));
        }
        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        let successes = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(successes, 1);
        assert!(results.iter().any(|r| matches!(
            r,
            Err(StorageError::InsufficientStock { .. })
        )));

        let p = ledger.get(&p.id).unwrap().unwrap();
        assert_eq!(p.stock, 1);
        assert_eq!(p.sales, 2);
    }

    #[test]
    fn test_many_concurrent_reserves_bounded_by_stock() {
        // stock=10, 8 threads each reserving 3: at most 3 can succeed
        let ledger = ledger();
        let p = seed(&ledger, 10, 100, None);

        let mut handles = Vec::new();
        for _ in 0..8 {
            let ledger = ledger.clone();
            let id = p.id.clone();
            handles.push(std::thread::spawn(move || ledger.reserve(&id, 3)));
        }
        let successes = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(Result::is_ok)
            .count();

        assert_eq!(successes, 3);
        let p = ledger.get(&p.id).unwrap().unwrap();
        assert_eq!(p.stock, 1);
        assert_eq!(p.sales, 9);
    }

    #[test]
    fn test_low_stock_sorted_ascending_active_only() {
        let ledger = ledger();
        let a = seed(&ledger, 8, 100, None);
        let b = seed(&ledger, 2, 100, None);
        let c = seed(&ledger, 5, 100, None);
        let d = seed(&ledger, 1, 100, None);
        ledger.deactivate(&d.id).unwrap();

        let ids: Vec<String> = ledger.low_stock(10).unwrap().map(|p| p.id).collect();
        assert_eq!(ids, vec![b.id, c.id, a.id]);

        // Restartable: a second call yields a fresh sequence
        assert_eq!(ledger.low_stock(10).unwrap().count(), 3);
        // Threshold is exclusive
        assert_eq!(ledger.low_stock(2).unwrap().count(), 0);
    }

    #[test]
    fn test_update_and_soft_delete() {
        let ledger = ledger();
        let p = seed(&ledger, 5, 100, None);

        let updated = ledger
            .update(
                &p.id,
                ProductUpdate {
                    title: Some("Widget Pro".into()),
                    price: Some(Decimal::from(120)),
                    discount_price: None,
                    image: None,
                    is_active: None,
                },
            )
            .unwrap();
        assert_eq!(updated.title, "Widget Pro");
        assert_eq!(updated.price, Decimal::from(120));
        assert!(updated.is_active);

        let deleted = ledger.deactivate(&p.id).unwrap();
        assert!(!deleted.is_active);
        // Still present in storage
        assert!(ledger.get(&p.id).unwrap().is_some());
        assert_eq!(ledger.count_active().unwrap(), 0);
    }

    #[test]
    fn test_set_stock_admin_correction() {
        let ledger = ledger();
        let p = seed(&ledger, 5, 100, None);
        let corrected = ledger.set_stock(&p.id, 42).unwrap();
        assert_eq!(corrected.stock, 42);
        // Sales untouched
        assert_eq!(corrected.sales, 0);
    }
}

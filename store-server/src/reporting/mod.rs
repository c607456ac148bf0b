//! Dashboard reporting
//!
//! Pure read-side aggregation over the stores. Every query runs in
//! redb read transactions, so reporting never blocks order writes.
//! Cancelled orders are excluded from revenue and order counts but
//! still appear in the status breakdown.

use crate::storage::{CustomerStore, InventoryLedger, OrderStore, StoreDb};
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::AppResult;
use shared::models::{Order, OrderStatus, Product};
use std::collections::BTreeMap;

/// Recent orders shown on the dashboard
const RECENT_ORDERS: usize = 10;

/// Top sellers shown on the dashboard
const TOP_PRODUCTS: usize = 5;

/// Lowest-stock products shown on the dashboard
const LOW_STOCK_PRODUCTS: usize = 5;

/// Default daily-series window when no `from` bound is given
const DEFAULT_SERIES_DAYS: i64 = 7;

/// One order-count cell of the status breakdown
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusCount {
    pub status: OrderStatus,
    pub count: u64,
}

/// Revenue and order count for one calendar day (UTC)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyPoint {
    /// Day in `YYYY-MM-DD`
    pub day: String,
    pub revenue: Decimal,
    pub orders: u64,
}

/// Everything the admin dashboard renders in one response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_customers: u64,
    pub total_products: u64,
    pub total_orders: u64,
    pub total_revenue: Decimal,
    pub recent_orders: Vec<Order>,
    pub top_products: Vec<Product>,
    pub status_breakdown: Vec<StatusCount>,
    pub daily_series: Vec<DailyPoint>,
    pub low_stock: Vec<Product>,
}

/// Read-side aggregator over the three stores
#[derive(Clone)]
pub struct ReportingAggregator {
    orders: OrderStore,
    ledger: InventoryLedger,
    customers: CustomerStore,
    low_stock_threshold: u32,
}

impl ReportingAggregator {
    pub fn new(db: StoreDb, low_stock_threshold: u32) -> Self {
        Self {
            orders: OrderStore::new(db.clone()),
            ledger: InventoryLedger::new(db.clone()),
            customers: CustomerStore::new(db),
            low_stock_threshold,
        }
    }

    /// Compute dashboard statistics over `[from, to)` millis; an open
    /// `from`/`to` means lifetime totals, and the daily series falls
    /// back to the trailing week.
    pub fn dashboard_stats(
        &self,
        from: Option<i64>,
        to: Option<i64>,
    ) -> AppResult<DashboardStats> {
        let in_range = self.orders.scan_range(from, to)?;
        let counted: Vec<&Order> = in_range
            .iter()
            .filter(|o| o.status != OrderStatus::Cancelled)
            .collect();

        let total_revenue: Decimal = counted.iter().map(|o| o.total).sum();

        let mut status_breakdown = Vec::new();
        for status in [
            OrderStatus::Pending,
            OrderStatus::Processing,
            OrderStatus::Shipped,
            OrderStatus::Delivered,
            OrderStatus::Cancelled,
        ] {
            status_breakdown.push(StatusCount {
                status,
                count: in_range.iter().filter(|o| o.status == status).count() as u64,
            });
        }

        let mut top_products = self.ledger.list(false)?;
        top_products.sort_by_key(|p| std::cmp::Reverse(p.sales));
        top_products.truncate(TOP_PRODUCTS);

        let low_stock: Vec<Product> = self
            .ledger
            .low_stock(self.low_stock_threshold)?
            .take(LOW_STOCK_PRODUCTS)
            .collect();

        Ok(DashboardStats {
            total_customers: self.customers.count_active()?,
            total_products: self.ledger.count_active()?,
            total_orders: counted.len() as u64,
            total_revenue,
            recent_orders: self.orders.list_recent(RECENT_ORDERS)?,
            top_products,
            status_breakdown,
            daily_series: daily_series(&in_range, from, to),
            low_stock,
        })
    }
}

/// Bucket non-Cancelled orders by UTC calendar day.
///
/// With no `from` bound the series covers the trailing week ending at
/// `to` (or now). Empty days inside the window are emitted as zero
/// points so charts draw a continuous line.
fn daily_series(orders: &[Order], from: Option<i64>, to: Option<i64>) -> Vec<DailyPoint> {
    // `to` is exclusive, so the last bucketed day ends just before it
    let end = to
        .and_then(|t| DateTime::from_timestamp_millis(t - 1))
        .unwrap_or_else(Utc::now);
    let start = from
        .and_then(DateTime::from_timestamp_millis)
        .unwrap_or_else(|| end - Duration::days(DEFAULT_SERIES_DAYS - 1));

    let mut buckets: BTreeMap<String, (Decimal, u64)> = BTreeMap::new();
    let mut day = start.date_naive();
    let last = end.date_naive();
    while day <= last {
        buckets.insert(day.format("%Y-%m-%d").to_string(), (Decimal::ZERO, 0));
        let Some(next) = day.succ_opt() else { break };
        day = next;
    }

    for order in orders {
        if order.status == OrderStatus::Cancelled {
            continue;
        }
        let Some(created) = DateTime::from_timestamp_millis(order.created_at) else {
            continue;
        };
        let key = created.date_naive().format("%Y-%m-%d").to_string();
        if let Some((revenue, count)) = buckets.get_mut(&key) {
            *revenue += order.total;
            *count += 1;
        }
    }

    buckets
        .into_iter()
        .map(|(day, (revenue, orders))| DailyPoint {
            day,
            revenue,
            orders,
        })
        .collect()
}

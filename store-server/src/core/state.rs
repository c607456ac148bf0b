use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

use dashmap::DashMap;

use crate::core::Config;
use crate::orders::{OrderEngine, OrderEventBus};
use crate::reporting::ReportingAggregator;
use crate::storage::{CustomerStore, StoreDb};
use shared::AppResult;

/// Per-resource request counters
///
/// Lock-free counters keyed by resource name, incremented by the
/// request-logging middleware and surfaced on the detailed health
/// endpoint.
#[derive(Debug, Default)]
pub struct RequestMetrics {
    counts: DashMap<String, u64>,
}

impl RequestMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment the counter for a resource and return the new value
    pub fn increment(&self, resource: &str) -> u64 {
        let mut entry = self.counts.entry(resource.to_string()).or_insert(0);
        *entry += 1;
        *entry
    }

    /// Snapshot of all counters, sorted by resource name
    pub fn snapshot(&self) -> Vec<(String, u64)> {
        let mut entries: Vec<(String, u64)> = self
            .counts
            .iter()
            .map(|e| (e.key().clone(), *e.value()))
            .collect();
        entries.sort();
        entries
    }
}

/// Sliding-window request limiter, keyed by caller.
///
/// Process-scoped with explicit construction, replacing ad-hoc global
/// mutable state. One entry per caller: window start plus a count,
/// reset when the window elapses. Expired entries are swept out at
/// most once per window; anonymous checkout keys are caller-chosen
/// (guest emails), so the map must not grow without bound.
#[derive(Debug)]
pub struct RateLimiter {
    max_per_window: u32,
    window_ms: i64,
    entries: DashMap<String, (i64, u32)>,
    last_sweep: AtomicI64,
}

impl RateLimiter {
    pub fn new(max_per_window: u32, window_ms: i64) -> Self {
        Self {
            max_per_window,
            window_ms,
            entries: DashMap::new(),
            last_sweep: AtomicI64::new(shared::util::now_millis()),
        }
    }

    /// Record one request for `key`; false means over the limit
    pub fn check(&self, key: &str) -> bool {
        let now = shared::util::now_millis();
        self.sweep(now);

        let mut entry = self.entries.entry(key.to_string()).or_insert((now, 0));
        let (window_start, count) = *entry;

        if now - window_start >= self.window_ms {
            *entry = (now, 1);
            return true;
        }
        if count < self.max_per_window {
            entry.1 += 1;
            return true;
        }
        false
    }

    /// Drop every entry whose window has elapsed. The timestamp CAS
    /// keeps concurrent callers from sweeping more than once per
    /// window.
    fn sweep(&self, now: i64) {
        let last = self.last_sweep.load(Ordering::Relaxed);
        if now - last < self.window_ms {
            return;
        }
        if self
            .last_sweep
            .compare_exchange(last, now, Ordering::Relaxed, Ordering::Relaxed)
            .is_err()
        {
            return;
        }
        self.entries
            .retain(|_, (start, _)| now - *start < self.window_ms);
    }
}

/// Server state, shared by every request handler.
///
/// All fields are shallow clones over `Arc`s, so handing a copy to
/// each request is cheap.
#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    pub db: StoreDb,
    pub engine: OrderEngine,
    pub reporting: ReportingAggregator,
    pub customers: CustomerStore,
    pub events: OrderEventBus,
    pub metrics: Arc<RequestMetrics>,
    pub checkout_limiter: Arc<RateLimiter>,
    started_at: std::time::Instant,
}

impl ServerState {
    /// Open the database under the configured working directory and
    /// wire up the engine, reporting, and event bus
    pub fn initialize(config: &Config) -> AppResult<Self> {
        std::fs::create_dir_all(&config.work_dir)
            .map_err(|e| shared::AppError::internal(format!("Cannot create work dir: {}", e)))?;
        let db = StoreDb::open(config.db_path())?;
        Ok(Self::with_db(config.clone(), db))
    }

    /// State over an in-memory database. Used by tests.
    pub fn in_memory(config: Config) -> AppResult<Self> {
        let db = StoreDb::open_in_memory()?;
        Ok(Self::with_db(config, db))
    }

    fn with_db(config: Config, db: StoreDb) -> Self {
        let events = OrderEventBus::new(config.event_capacity);
        let engine = OrderEngine::new(
            db.clone(),
            events.clone(),
            Duration::from_millis(config.create_order_timeout_ms),
        );
        let reporting = ReportingAggregator::new(db.clone(), config.low_stock_threshold);
        let customers = CustomerStore::new(db.clone());

        let checkout_limiter = Arc::new(RateLimiter::new(
            config.checkout_rate_limit,
            config.checkout_rate_window_ms,
        ));

        Self {
            config,
            db,
            engine,
            reporting,
            customers,
            events,
            metrics: Arc::new(RequestMetrics::new()),
            checkout_limiter,
            started_at: std::time::Instant::now(),
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}

/// Server configuration
///
/// # Environment variables
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | WORK_DIR | /var/lib/store-server | Working directory (database, logs) |
/// | HTTP_PORT | 3000 | HTTP API port |
/// | ENVIRONMENT | development | development \| staging \| production |
/// | CREATE_ORDER_TIMEOUT_MS | 5000 | Deadline for one order-creation call |
/// | LOW_STOCK_THRESHOLD | 5 | Stock level below which a product is flagged |
/// | EVENT_CAPACITY | 256 | Order event bus channel capacity |
/// | REQUEST_TIMEOUT_MS | 30000 | Per-request timeout |
/// | CHECKOUT_RATE_LIMIT | 30 | Max checkout attempts per caller per window |
/// | CHECKOUT_RATE_WINDOW_MS | 60000 | Checkout rate-limit window |
#[derive(Debug, Clone)]
pub struct Config {
    /// Working directory for the database and log files
    pub work_dir: String,
    /// HTTP API port
    pub http_port: u16,
    /// Runtime environment: development | staging | production
    pub environment: String,
    /// Deadline for a single order-creation call (milliseconds)
    pub create_order_timeout_ms: u64,
    /// Products with stock strictly below this are flagged low
    pub low_stock_threshold: u32,
    /// Order event bus channel capacity
    pub event_capacity: usize,
    /// Per-request timeout (milliseconds)
    pub request_timeout_ms: u64,
    /// Max checkout attempts per caller per window
    pub checkout_rate_limit: u32,
    /// Checkout rate-limit window (milliseconds)
    pub checkout_rate_window_ms: i64,
}

impl Config {
    /// Load configuration from environment variables, falling back to
    /// defaults for anything unset
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "/var/lib/store-server".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            create_order_timeout_ms: std::env::var("CREATE_ORDER_TIMEOUT_MS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(5000),
            low_stock_threshold: std::env::var("LOW_STOCK_THRESHOLD")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(5),
            event_capacity: std::env::var("EVENT_CAPACITY")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(256),
            request_timeout_ms: std::env::var("REQUEST_TIMEOUT_MS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(30_000),
            checkout_rate_limit: std::env::var("CHECKOUT_RATE_LIMIT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(30),
            checkout_rate_window_ms: std::env::var("CHECKOUT_RATE_WINDOW_MS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(60_000),
        }
    }

    /// Override the filesystem/port settings, keeping everything else
    /// from the environment. Used by tests.
    pub fn with_overrides(work_dir: impl Into<String>, http_port: u16) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.http_port = http_port;
        config
    }

    /// Path of the embedded database file
    pub fn db_path(&self) -> std::path::PathBuf {
        std::path::Path::new(&self.work_dir).join("store.redb")
    }

    /// Directory for rolling log files
    pub fn log_dir(&self) -> std::path::PathBuf {
        std::path::Path::new(&self.work_dir).join("logs")
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_keep_defaults() {
        let config = Config::with_overrides("/tmp/store-test", 0);
        assert_eq!(config.work_dir, "/tmp/store-test");
        assert_eq!(config.http_port, 0);
        assert_eq!(config.db_path(), std::path::Path::new("/tmp/store-test/store.redb"));
    }
}

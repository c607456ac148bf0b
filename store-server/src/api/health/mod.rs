//! Health check routes
//!
//! | Path | Method | Purpose |
//! |------|--------|---------|
//! | /health | GET | Liveness probe |
//! | /health/detailed | GET | Component checks and counters |

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;
use std::time::Instant;

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/health", get(health))
        .route("/health/detailed", get(detailed_health))
}

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Serialize)]
pub struct DetailedHealthResponse {
    status: &'static str,
    version: &'static str,
    uptime_seconds: u64,
    checks: HealthChecks,
    /// Requests served, per API resource
    requests: Vec<RequestCount>,
}

#[derive(Serialize)]
pub struct HealthChecks {
    database: CheckResult,
    event_bus: EventBusCheck,
}

#[derive(Serialize)]
pub struct CheckResult {
    status: &'static str,
    latency_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Event delivery is best-effort: dropped events degrade the check
/// without failing it
#[derive(Serialize)]
pub struct EventBusCheck {
    status: &'static str,
    dropped_events: u64,
}

#[derive(Serialize)]
pub struct RequestCount {
    resource: String,
    count: u64,
}

async fn detailed_health(State(state): State<ServerState>) -> Json<DetailedHealthResponse> {
    let started = Instant::now();
    let database = match state.db.begin_read() {
        Ok(_) => CheckResult {
            status: "ok",
            latency_ms: started.elapsed().as_millis() as u64,
            error: None,
        },
        Err(e) => CheckResult {
            status: "error",
            latency_ms: started.elapsed().as_millis() as u64,
            error: Some(e.to_string()),
        },
    };

    let dropped = state.events.dropped_count();
    let event_bus = EventBusCheck {
        status: if dropped == 0 { "ok" } else { "degraded" },
        dropped_events: dropped,
    };

    let status = if database.status == "ok" { "ok" } else { "error" };

    Json(DetailedHealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        uptime_seconds: state.uptime_seconds(),
        checks: HealthChecks {
            database,
            event_bus,
        },
        requests: state
            .metrics
            .snapshot()
            .into_iter()
            .map(|(resource, count)| RequestCount { resource, count })
            .collect(),
    })
}

//! Dashboard API handlers

use axum::{
    Json,
    extract::{Query, State},
};
use chrono::{Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::Deserialize;

use crate::api::identity::Identity;
use crate::core::ServerState;
use crate::reporting::DashboardStats;
use shared::{AppError, AppResult};

/// Date-range query, inclusive calendar days in UTC
#[derive(Debug, Deserialize)]
pub struct RangeQuery {
    #[serde(default)]
    pub from: Option<NaiveDate>,
    #[serde(default)]
    pub to: Option<NaiveDate>,
}

impl RangeQuery {
    /// `[from 00:00, to+1d 00:00)` as epoch millis
    fn to_millis(&self) -> AppResult<(Option<i64>, Option<i64>)> {
        if let (Some(from), Some(to)) = (self.from, self.to)
            && from > to
        {
            return Err(AppError::validation("`from` must not be after `to`"));
        }

        let from = self.from.map(|d| day_start_millis(d));
        let to = self.to.map(|d| day_start_millis(d + Duration::days(1)));
        Ok((from, to))
    }
}

fn day_start_millis(day: NaiveDate) -> i64 {
    Utc.from_utc_datetime(&day.and_time(NaiveTime::MIN))
        .timestamp_millis()
}

/// GET /api/dashboard - store statistics over an optional date range
/// (admin)
pub async fn stats(
    State(state): State<ServerState>,
    identity: Identity,
    Query(query): Query<RangeQuery>,
) -> AppResult<Json<DashboardStats>> {
    identity.require_admin()?;
    let (from, to) = query.to_millis()?;
    let stats = state.reporting.dashboard_stats(from, to)?;
    Ok(Json(stats))
}

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;

use crate::models::monitor::MonitorStatus;

/// One completed probe, written exactly once and never mutated. An
/// `http_status_code` of 0 means no response was received (network error,
/// DNS failure, timeout).
#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct CheckResult {
    pub id: i64,
    pub monitor_id: i64,
    pub status: MonitorStatus,
    pub response_time_ms: i64,
    pub http_status_code: Option<i64>,
    pub checked_at: OffsetDateTime,
}

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use time::OffsetDateTime;

/// Last-known status of a monitor. `Pending` is the initial value before any
/// check has completed and is a valid "previous" status for transition
/// detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum MonitorStatus {
    Pending,
    Up,
    Down,
}

impl fmt::Display for MonitorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MonitorStatus::Pending => "PENDING",
            MonitorStatus::Up => "UP",
            MonitorStatus::Down => "DOWN",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Monitor {
    pub id: i64,
    pub user_id: i64,
    pub url: String,
    pub check_interval_minutes: i64,
    pub is_active: bool,
    pub status: MonitorStatus,
    pub created_at: OffsetDateTime,
}

/// Snapshot of a monitor returned by the due-monitor query: the fields the
/// check pipeline needs, plus the timestamp of the most recent check.
#[derive(Debug, Clone, FromRow)]
pub struct DueMonitor {
    pub id: i64,
    pub user_id: i64,
    pub url: String,
    pub check_interval_minutes: i64,
    pub status: MonitorStatus,
    pub last_checked_at: Option<OffsetDateTime>,
}

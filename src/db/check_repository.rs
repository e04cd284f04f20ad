use crate::models::{CheckResult, MonitorStatus};
use sqlx::SqlitePool;
use time::{Duration, OffsetDateTime};

pub struct CheckRepository<'a> {
    pub pool: &'a SqlitePool,
}

impl<'a> CheckRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Record one completed probe. A single atomic insert; the caller decides
    /// whether a failure here is fatal (the scheduler logs and moves on).
    pub async fn insert_check(
        &self,
        monitor_id: i64,
        status: MonitorStatus,
        response_time_ms: i64,
        http_status_code: Option<i64>,
    ) -> Result<i64, sqlx::Error> {
        tracing::debug!(
            "Inserting check -> monitor_id: {}, status: {}, code: {:?}, time_ms: {}",
            monitor_id,
            status,
            http_status_code,
            response_time_ms
        );

        let result = sqlx::query(
            r#"
            INSERT INTO monitor_checks (monitor_id, status, response_time_ms, http_status_code, checked_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(monitor_id)
        .bind(status)
        .bind(response_time_ms)
        .bind(http_status_code)
        .bind(OffsetDateTime::now_utc())
        .execute(self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// The most recent check for a monitor, if any.
    pub async fn last_check(&self, monitor_id: i64) -> Result<Option<CheckResult>, sqlx::Error> {
        sqlx::query_as::<_, CheckResult>(
            r#"
            SELECT id, monitor_id, status, response_time_ms, http_status_code, checked_at
            FROM monitor_checks
            WHERE monitor_id = ?
            ORDER BY checked_at DESC, id DESC
            LIMIT 1
            "#,
        )
        .bind(monitor_id)
        .fetch_optional(self.pool)
        .await
    }

    pub async fn checks_for_monitor(
        &self,
        monitor_id: i64,
        limit: i64,
    ) -> Result<Vec<CheckResult>, sqlx::Error> {
        sqlx::query_as::<_, CheckResult>(
            r#"
            SELECT id, monitor_id, status, response_time_ms, http_status_code, checked_at
            FROM monitor_checks
            WHERE monitor_id = ?
            ORDER BY checked_at DESC, id DESC
            LIMIT ?
            "#,
        )
        .bind(monitor_id)
        .bind(limit)
        .fetch_all(self.pool)
        .await
    }

    /// Fraction of UP checks over a trailing window, as a percentage.
    /// `None` when the window holds no checks.
    pub async fn uptime_percentage(
        &self,
        monitor_id: i64,
        window: Duration,
    ) -> Result<Option<f64>, sqlx::Error> {
        let cutoff = OffsetDateTime::now_utc() - window;
        let (total, up): (i64, i64) = sqlx::query_as(
            r#"
            SELECT COUNT(*),
                   COALESCE(SUM(CASE WHEN status = 'UP' THEN 1 ELSE 0 END), 0)
            FROM monitor_checks
            WHERE monitor_id = ? AND checked_at >= ?
            "#,
        )
        .bind(monitor_id)
        .bind(cutoff)
        .fetch_one(self.pool)
        .await?;

        if total == 0 {
            Ok(None)
        } else {
            Ok(Some(up as f64 * 100.0 / total as f64))
        }
    }
}

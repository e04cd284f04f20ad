use crate::error::UpwatchError;
use crate::models::{DueMonitor, Monitor, MonitorStatus};
use sqlx::SqlitePool;
use time::{Duration, OffsetDateTime};
use url::Url;

pub struct MonitorRepository<'a> {
    pub pool: &'a SqlitePool,
}

impl<'a> MonitorRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a monitor for a user. Enforces the creation-path invariants:
    /// the URL must be http(s) and the interval at least one minute. Status
    /// starts as PENDING until the first check completes.
    pub async fn create(
        &self,
        user_id: i64,
        url: &str,
        check_interval_minutes: i64,
    ) -> Result<Monitor, UpwatchError> {
        let parsed = Url::parse(url).map_err(|e| UpwatchError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(UpwatchError::InvalidUrl {
                url: url.to_string(),
                reason: "only http and https URLs are supported".to_string(),
            });
        }
        if check_interval_minutes < 1 {
            return Err(UpwatchError::InvalidInterval(check_interval_minutes));
        }

        tracing::info!(
            "Creating monitor -> user_id: {}, url: '{}', interval: {} mins",
            user_id,
            url,
            check_interval_minutes
        );

        let created_at = OffsetDateTime::now_utc();
        let result = sqlx::query(
            r#"
            INSERT INTO monitors (user_id, url, check_interval_minutes, is_active, status, created_at)
            VALUES (?, ?, ?, 1, ?, ?)
            "#,
        )
        .bind(user_id)
        .bind(url)
        .bind(check_interval_minutes)
        .bind(MonitorStatus::Pending)
        .bind(created_at)
        .execute(self.pool)
        .await?;

        Ok(Monitor {
            id: result.last_insert_rowid(),
            user_id,
            url: url.to_string(),
            check_interval_minutes,
            is_active: true,
            status: MonitorStatus::Pending,
            created_at,
        })
    }

    pub async fn get_all_by_user(&self, user_id: i64) -> Result<Vec<Monitor>, sqlx::Error> {
        sqlx::query_as::<_, Monitor>(
            r#"
            SELECT id, user_id, url, check_interval_minutes, is_active, status, created_at
            FROM monitors
            WHERE user_id = ?
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await
    }

    pub async fn get_by_id(
        &self,
        monitor_id: i64,
        user_id: i64,
    ) -> Result<Option<Monitor>, sqlx::Error> {
        sqlx::query_as::<_, Monitor>(
            r#"
            SELECT id, user_id, url, check_interval_minutes, is_active, status, created_at
            FROM monitors
            WHERE id = ? AND user_id = ?
            "#,
        )
        .bind(monitor_id)
        .bind(user_id)
        .fetch_optional(self.pool)
        .await
    }

    /// Partial update: fields passed as `None` are left unchanged.
    pub async fn update(
        &self,
        monitor_id: i64,
        user_id: i64,
        check_interval_minutes: Option<i64>,
        is_active: Option<bool>,
    ) -> Result<bool, UpwatchError> {
        if let Some(interval) = check_interval_minutes {
            if interval < 1 {
                return Err(UpwatchError::InvalidInterval(interval));
            }
        }

        let result = sqlx::query(
            r#"
            UPDATE monitors
            SET check_interval_minutes = COALESCE(?, check_interval_minutes),
                is_active = COALESCE(?, is_active)
            WHERE id = ? AND user_id = ?
            "#,
        )
        .bind(check_interval_minutes)
        .bind(is_active)
        .bind(monitor_id)
        .bind(user_id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() > 0 {
            tracing::info!("Updated monitor_id: {}", monitor_id);
        } else {
            tracing::warn!("No monitor found to update with id: {}", monitor_id);
        }

        Ok(result.rows_affected() > 0)
    }

    /// Delete a monitor; its check history goes with it via cascade.
    pub async fn delete(&self, monitor_id: i64, user_id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            DELETE FROM monitors
            WHERE id = ? AND user_id = ?
            "#,
        )
        .bind(monitor_id)
        .bind(user_id)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Overwrite the denormalized last-known status field. Last-writer-wins;
    /// only the transition detector calls this.
    pub async fn set_status(
        &self,
        monitor_id: i64,
        status: MonitorStatus,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE monitors SET status = ? WHERE id = ?")
            .bind(status)
            .bind(monitor_id)
            .execute(self.pool)
            .await?;

        Ok(())
    }

    /// The due-monitor selector: active monitors that have never been checked,
    /// or whose most recent check is at least `check_interval_minutes` old at
    /// `now`. Pure read; a check completing mid-query may or may not be
    /// reflected (read-committed is acceptable here).
    pub async fn get_due_monitors(
        &self,
        now: OffsetDateTime,
    ) -> Result<Vec<DueMonitor>, sqlx::Error> {
        let active = sqlx::query_as::<_, DueMonitor>(
            r#"
            SELECT m.id, m.user_id, m.url, m.check_interval_minutes, m.status,
                   (SELECT MAX(c.checked_at)
                    FROM monitor_checks c
                    WHERE c.monitor_id = m.id) AS last_checked_at
            FROM monitors m
            WHERE m.is_active = 1
            "#,
        )
        .fetch_all(self.pool)
        .await?;

        Ok(active
            .into_iter()
            .filter(|m| match m.last_checked_at {
                None => true,
                Some(last) => last + Duration::minutes(m.check_interval_minutes) <= now,
            })
            .collect())
    }
}

use crate::db::{MonitorRepository, UserRepository};
use crate::models::{DueMonitor, MonitorStatus};
use crate::services::mailer::Mailer;
use sqlx::SqlitePool;
use std::sync::Arc;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tracing::{debug, error, info};

/// When does a status change produce an alert email?
///
/// `SkipInitialUp` (the default) treats a monitor's first successful
/// classification as expected and stays quiet for PENDING -> UP; a first
/// DOWN still alerts, as does every later flip in either direction.
/// `AllTransitions` alerts on every change, PENDING -> UP included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AlertPolicy {
    AllTransitions,
    #[default]
    SkipInitialUp,
}

impl std::str::FromStr for AlertPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" | "all-transitions" => Ok(AlertPolicy::AllTransitions),
            "skip-initial-up" => Ok(AlertPolicy::SkipInitialUp),
            other => Err(format!("unknown alert policy '{other}'")),
        }
    }
}

pub fn should_alert(previous: MonitorStatus, new: MonitorStatus, policy: AlertPolicy) -> bool {
    if previous == new {
        return false;
    }
    match policy {
        AlertPolicy::AllTransitions => true,
        AlertPolicy::SkipInitialUp => {
            !(previous == MonitorStatus::Pending && new == MonitorStatus::Up)
        }
    }
}

/// What one invocation of the detector did; the scheduler folds these into
/// its per-cycle counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionOutcome {
    Unchanged,
    Changed {
        alerted: bool,
        alert_failed: bool,
        status_updated: bool,
    },
}

/// Compares a fresh check result against the monitor's stored status and,
/// on a change, sends at most one alert and converges the stored field.
pub struct TransitionNotifier {
    pool: SqlitePool,
    mailer: Arc<dyn Mailer>,
    policy: AlertPolicy,
}

impl TransitionNotifier {
    pub fn new(pool: SqlitePool, mailer: Arc<dyn Mailer>, policy: AlertPolicy) -> Self {
        Self {
            pool,
            mailer,
            policy,
        }
    }

    /// Handle one completed check. The comparison baseline is the
    /// denormalized `status` field captured in the due-monitor snapshot,
    /// not the previous check row. Alert dispatch failing never blocks the
    /// status update; a missing owner email is a no-op.
    pub async fn handle(
        &self,
        monitor: &DueMonitor,
        new_status: MonitorStatus,
        checked_at: OffsetDateTime,
    ) -> TransitionOutcome {
        if monitor.status == new_status {
            return TransitionOutcome::Unchanged;
        }

        info!(
            "Monitor {} ({}) transitioned {} -> {}",
            monitor.id, monitor.url, monitor.status, new_status
        );

        let mut alerted = false;
        let mut alert_failed = false;

        if should_alert(monitor.status, new_status, self.policy) {
            let users = UserRepository::new(&self.pool);
            match users.get_email_by_id(monitor.user_id).await {
                Ok(Some(email)) if !email.is_empty() => {
                    let subject = format!("[Alert] Monitor {}: {}", new_status, monitor.url);
                    let timestamp = checked_at
                        .format(&Rfc3339)
                        .unwrap_or_else(|_| checked_at.to_string());
                    let body = format!(
                        "Monitor Alert\n\nURL: {}\nStatus: {}\nTime: {}\n\nPlease check your dashboard.\n",
                        monitor.url, new_status, timestamp
                    );

                    match self.mailer.send(&email, &subject, &body).await {
                        Ok(()) => alerted = true,
                        Err(e) => {
                            error!("Failed to send alert for monitor {}: {}", monitor.id, e);
                            alert_failed = true;
                        }
                    }
                }
                Ok(_) => {
                    debug!(
                        "Monitor {} owner has no email address, skipping alert",
                        monitor.id
                    );
                }
                Err(e) => {
                    error!(
                        "Could not resolve owner email for monitor {}: {}",
                        monitor.id, e
                    );
                    alert_failed = true;
                }
            }
        }

        let monitors = MonitorRepository::new(&self.pool);
        let status_updated = match monitors.set_status(monitor.id, new_status).await {
            Ok(()) => true,
            Err(e) => {
                error!("Failed to update status for monitor {}: {}", monitor.id, e);
                false
            }
        };

        TransitionOutcome::Changed {
            alerted,
            alert_failed,
            status_updated,
        }
    }
}

use crate::db::{CheckRepository, MonitorRepository};
use crate::models::{DueMonitor, MonitorStatus};
use crate::services::mailer::Mailer;
use crate::services::probe::probe_url;
use crate::services::transition::{AlertPolicy, TransitionNotifier, TransitionOutcome};
use futures::future::join_all;
use reqwest::Client;
use sqlx::SqlitePool;
use std::sync::Arc;
use std::time::Duration;
use time::OffsetDateTime;
use tokio::sync::{watch, Semaphore};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// Fixed cadence of the scheduling loop, independent of per-monitor
/// intervals; per-monitor cadence is approximated by the due query.
pub const TICK_INTERVAL: Duration = Duration::from_secs(60);

/// How long shutdown waits for an in-flight cycle before abandoning it.
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

pub const DEFAULT_MAX_CONCURRENT_PROBES: usize = 16;

/// What one scheduling cycle did. Failures that the loop swallows by design
/// (failed inserts, failed alert sends) are counted here so they stay
/// observable instead of vanishing into the log stream.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CycleStats {
    pub due: usize,
    pub up: usize,
    pub down: usize,
    pub recorded: usize,
    pub record_failures: usize,
    pub transitions: usize,
    pub alerts_sent: usize,
    pub alert_failures: usize,
    pub status_update_failures: usize,
    pub selector_failed: bool,
}

struct CheckReport {
    status: MonitorStatus,
    recorded: bool,
    transition: Option<TransitionOutcome>,
}

impl CycleStats {
    fn absorb(&mut self, report: CheckReport) {
        match report.status {
            MonitorStatus::Up => self.up += 1,
            MonitorStatus::Down => self.down += 1,
            MonitorStatus::Pending => {}
        }
        if report.recorded {
            self.recorded += 1;
        } else {
            self.record_failures += 1;
        }
        if let Some(TransitionOutcome::Changed {
            alerted,
            alert_failed,
            status_updated,
        }) = report.transition
        {
            self.transitions += 1;
            if alerted {
                self.alerts_sent += 1;
            }
            if alert_failed {
                self.alert_failures += 1;
            }
            if !status_updated {
                self.status_update_failures += 1;
            }
        }
    }
}

/// Drives the whole pipeline: every tick it asks the due-monitor query for
/// work, probes the due set concurrently (capped by a semaphore), records
/// each result and runs transition detection per monitor. One monitor's
/// failure never stalls the others; a tick-level failure is logged and the
/// next tick retries naturally.
///
/// Assumes it is the only scheduler running against its store; nothing
/// enforces that.
pub struct Scheduler {
    pool: SqlitePool,
    client: Client,
    notifier: TransitionNotifier,
    max_concurrent_probes: usize,
}

impl Scheduler {
    pub fn new(
        pool: SqlitePool,
        mailer: Arc<dyn Mailer>,
        policy: AlertPolicy,
        max_concurrent_probes: usize,
    ) -> Self {
        let notifier = TransitionNotifier::new(pool.clone(), mailer, policy);
        Self {
            pool,
            client: Client::new(),
            notifier,
            max_concurrent_probes,
        }
    }

    /// Run one scheduling cycle to completion: select, fan out, settle.
    pub async fn run_cycle(&self) -> CycleStats {
        let now = OffsetDateTime::now_utc();
        let monitors = MonitorRepository::new(&self.pool);

        let due = match monitors.get_due_monitors(now).await {
            Ok(due) => due,
            Err(e) => {
                error!("Due-monitor query failed, skipping cycle: {}", e);
                return CycleStats {
                    selector_failed: true,
                    ..CycleStats::default()
                };
            }
        };

        let mut stats = CycleStats {
            due: due.len(),
            ..CycleStats::default()
        };
        if due.is_empty() {
            return stats;
        }

        info!("Found {} monitors due for check", due.len());

        let semaphore = Arc::new(Semaphore::new(self.max_concurrent_probes));
        let reports = join_all(due.iter().map(|monitor| {
            let semaphore = Arc::clone(&semaphore);
            async move {
                let _permit = semaphore.acquire().await.ok();
                self.check_one(monitor).await
            }
        }))
        .await;

        for report in reports {
            stats.absorb(report);
        }

        info!(
            "Cycle done: {} due, {} up, {} down, {} recorded, {} transitions, {} alerts",
            stats.due, stats.up, stats.down, stats.recorded, stats.transitions, stats.alerts_sent
        );

        stats
    }

    /// The per-monitor pipeline: probe, record, detect transition. Every
    /// failure is contained here. When the insert fails, the transition for
    /// this cycle is dropped with it; the next cycle re-probes.
    async fn check_one(&self, monitor: &DueMonitor) -> CheckReport {
        let outcome = probe_url(&self.client, &monitor.url).await;
        let checked_at = OffsetDateTime::now_utc();

        let checks = CheckRepository::new(&self.pool);
        let recorded = match checks
            .insert_check(
                monitor.id,
                outcome.status,
                outcome.response_time_ms as i64,
                Some(outcome.http_status_code as i64),
            )
            .await
        {
            Ok(_) => true,
            Err(e) => {
                error!("Failed to record check for monitor {}: {}", monitor.id, e);
                false
            }
        };

        let transition = if recorded {
            Some(self.notifier.handle(monitor, outcome.status, checked_at).await)
        } else {
            None
        };

        CheckReport {
            status: outcome.status,
            recorded,
            transition,
        }
    }

    /// Start periodic scheduling: one cycle immediately, then every
    /// `TICK_INTERVAL` until the returned handle is shut down.
    pub fn start(self) -> SchedulerHandle {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(TICK_INTERVAL);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = shutdown_rx.changed() => {
                        info!("Scheduler stopping");
                        break;
                    }
                    _ = ticker.tick() => {
                        self.run_cycle().await;
                    }
                }
            }
        });

        SchedulerHandle { shutdown_tx, task }
    }
}

/// Lifecycle handle for a running scheduler.
pub struct SchedulerHandle {
    shutdown_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl SchedulerHandle {
    /// Signal the loop to stop and wait up to `SHUTDOWN_GRACE` for an
    /// in-flight cycle to settle. After the grace period the cycle is
    /// abandoned; unfinished persistence is lost, not rolled back.
    pub async fn shutdown(mut self) {
        let _ = self.shutdown_tx.send(true);

        if tokio::time::timeout(SHUTDOWN_GRACE, &mut self.task)
            .await
            .is_err()
        {
            warn!("In-flight cycle did not settle within grace period, aborting");
            self.task.abort();
        }
    }
}

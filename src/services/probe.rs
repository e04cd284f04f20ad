use crate::models::MonitorStatus;
use reqwest::Client;
use std::time::{Duration, Instant};

/// Hard cap on how long a single probe may take, connect included.
pub const PROBE_TIMEOUT: Duration = Duration::from_millis(5000);

/// Outcome of one probe. `http_status_code` is 0 when no response was
/// received (connection refused, DNS failure, timeout).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeOutcome {
    pub status: MonitorStatus,
    pub http_status_code: u16,
    pub response_time_ms: u64,
}

fn classify(status: reqwest::StatusCode) -> MonitorStatus {
    if status.is_success() {
        MonitorStatus::Up
    } else {
        MonitorStatus::Down
    }
}

/// Issue exactly one GET against `url` and classify the result. Probe-level
/// failures never escape this function; they degrade to a DOWN outcome.
/// Elapsed wall-clock time is measured for failures too. No retries; the URL
/// was validated on the creation path and is not re-checked here.
pub async fn probe_url(client: &Client, url: &str) -> ProbeOutcome {
    let started = Instant::now();

    match client.get(url).timeout(PROBE_TIMEOUT).send().await {
        Ok(response) => {
            let elapsed = started.elapsed().as_millis() as u64;
            let code = response.status();
            tracing::debug!("Probe {} responded {} in {}ms", url, code, elapsed);

            ProbeOutcome {
                status: classify(code),
                http_status_code: code.as_u16(),
                response_time_ms: elapsed,
            }
        }
        Err(e) => {
            let elapsed = started.elapsed().as_millis() as u64;
            tracing::debug!("Probe {} failed after {}ms: {}", url, elapsed, e);

            // A rejected response mid-redirect still carries a status code;
            // anything else means no response was received at all.
            let code = e.status().map(|s| s.as_u16()).unwrap_or(0);

            ProbeOutcome {
                status: MonitorStatus::Down,
                http_status_code: code,
                response_time_ms: elapsed,
            }
        }
    }
}

#![allow(dead_code)]

use async_trait::async_trait;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use std::sync::Mutex;
use time::OffsetDateTime;
use upwatch::db::{MonitorRepository, UserRepository};
use upwatch::error::MailError;
use upwatch::models::{DueMonitor, Monitor};
use upwatch::services::mailer::Mailer;

pub async fn test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory pool");
    upwatch::MIGRATOR.run(&pool).await.expect("migrations");
    pool
}

pub async fn seed_user(pool: &SqlitePool, email: &str) -> i64 {
    UserRepository::new(pool)
        .create_user("Test User", email)
        .await
        .expect("seed user")
}

pub async fn seed_monitor(pool: &SqlitePool, user_id: i64, url: &str, interval: i64) -> Monitor {
    MonitorRepository::new(pool)
        .create(user_id, url, interval)
        .await
        .expect("seed monitor")
}

/// A due-query-shaped snapshot of a monitor's current row, for driving the
/// transition notifier directly.
pub async fn snapshot(pool: &SqlitePool, monitor_id: i64, user_id: i64) -> DueMonitor {
    let monitor = MonitorRepository::new(pool)
        .get_by_id(monitor_id, user_id)
        .await
        .expect("fetch monitor")
        .expect("monitor exists");
    DueMonitor {
        id: monitor.id,
        user_id: monitor.user_id,
        url: monitor.url,
        check_interval_minutes: monitor.check_interval_minutes,
        status: monitor.status,
        last_checked_at: None,
    }
}

pub async fn set_check_time(pool: &SqlitePool, check_id: i64, at: OffsetDateTime) {
    sqlx::query("UPDATE monitor_checks SET checked_at = ? WHERE id = ?")
        .bind(at)
        .bind(check_id)
        .execute(pool)
        .await
        .expect("backdate check");
}

#[derive(Debug, Clone)]
pub struct SentMail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Records every send instead of talking to a provider.
#[derive(Default)]
pub struct FakeMailer {
    pub sent: Mutex<Vec<SentMail>>,
}

impl FakeMailer {
    pub fn sent(&self) -> Vec<SentMail> {
        self.sent.lock().expect("mailer lock").clone()
    }
}

#[async_trait]
impl Mailer for FakeMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), MailError> {
        self.sent.lock().expect("mailer lock").push(SentMail {
            to: to.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
        });
        Ok(())
    }
}

/// Fails every send, simulating a provider outage.
pub struct FailingMailer;

#[async_trait]
impl Mailer for FailingMailer {
    async fn send(&self, _to: &str, _subject: &str, _body: &str) -> Result<(), MailError> {
        Err(MailError::Api {
            status: 503,
            body: "simulated outage".to_string(),
        })
    }
}

/// Serve a fixed status code on a loopback port; returns the base URL.
pub async fn serve_status(status: axum::http::StatusCode) -> String {
    let app = axum::Router::new().route("/", axum::routing::get(move || async move { status }));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind loopback");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });
    format!("http://{addr}/")
}

/// A loopback server that accepts connections and reads the request but
/// never writes a response, so the probe's own timeout has to fire.
pub async fn hanging_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind loopback");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                break;
            };
            tokio::spawn(async move {
                use tokio::io::AsyncReadExt;
                let mut buf = [0u8; 1024];
                while let Ok(n) = socket.read(&mut buf).await {
                    if n == 0 {
                        break;
                    }
                }
            });
        }
    });
    format!("http://{addr}/")
}

/// A loopback URL nothing is listening on.
pub async fn unreachable_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind loopback");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);
    format!("http://{addr}/")
}

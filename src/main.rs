use dotenvy::dotenv;
use sqlx::sqlite::SqlitePoolOptions;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use upwatch::config::Config;
use upwatch::error::UpwatchError;
use upwatch::services::mailer::{Mailer, SendGridMailer};
use upwatch::services::scheduler::Scheduler;

#[tokio::main]
async fn main() -> Result<(), UpwatchError> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(true)
        .compact()
        .init();

    let config = Config::from_env()?;

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;

    upwatch::MIGRATOR.run(&pool).await?;
    tracing::info!("Migrations applied. DB is ready.");

    let mailer: Arc<dyn Mailer> = Arc::new(SendGridMailer::new(
        config.sendgrid_api_key.clone(),
        config.alert_from_email.clone(),
    ));

    let scheduler = Scheduler::new(
        pool.clone(),
        mailer,
        config.alert_policy,
        config.max_concurrent_probes,
    );
    let handle = scheduler.start();
    tracing::info!("upwatch scheduler started");

    tokio::signal::ctrl_c().await?;
    tracing::info!("Received shutdown signal, draining in-flight checks...");

    handle.shutdown().await;
    pool.close().await;

    Ok(())
}

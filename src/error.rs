use thiserror::Error;

#[derive(Debug, Error)]
pub enum UpwatchError {
    #[error("missing required environment variable {0}")]
    MissingEnv(&'static str),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("invalid monitor url '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("check interval must be at least 1 minute, got {0}")]
    InvalidInterval(i64),

    #[error(transparent)]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Failure to hand an alert to the mail provider. Callers at the scheduling
/// boundary log and count these; they never abort a cycle.
#[derive(Debug, Error)]
pub enum MailError {
    #[error("mail provider request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("mail provider returned {status}: {body}")]
    Api { status: u16, body: String },
}

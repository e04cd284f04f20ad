use crate::error::UpwatchError;
use crate::services::scheduler::DEFAULT_MAX_CONCURRENT_PROBES;
use crate::services::transition::AlertPolicy;
use std::env;

/// Runtime configuration, collected from the environment once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub sendgrid_api_key: String,
    pub alert_from_email: String,
    pub max_concurrent_probes: usize,
    pub alert_policy: AlertPolicy,
}

fn require(name: &'static str) -> Result<String, UpwatchError> {
    env::var(name).map_err(|_| UpwatchError::MissingEnv(name))
}

impl Config {
    pub fn from_env() -> Result<Self, UpwatchError> {
        let max_concurrent_probes = match env::var("UPWATCH_MAX_CONCURRENT_PROBES") {
            Ok(v) => v.parse().map_err(|_| {
                UpwatchError::Config(format!(
                    "UPWATCH_MAX_CONCURRENT_PROBES must be a positive integer, got '{v}'"
                ))
            })?,
            Err(_) => DEFAULT_MAX_CONCURRENT_PROBES,
        };
        if max_concurrent_probes == 0 {
            return Err(UpwatchError::Config(
                "UPWATCH_MAX_CONCURRENT_PROBES must be at least 1".to_string(),
            ));
        }

        let alert_policy = match env::var("UPWATCH_ALERT_POLICY") {
            Ok(v) => v.parse().map_err(UpwatchError::Config)?,
            Err(_) => AlertPolicy::default(),
        };

        Ok(Self {
            database_url: require("DATABASE_URL")?,
            sendgrid_api_key: require("SENDGRID_API_KEY")?,
            alert_from_email: require("ALERT_FROM_EMAIL")?,
            max_concurrent_probes,
            alert_policy,
        })
    }
}

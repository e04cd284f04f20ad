use crate::error::MailError;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use tracing::info;

const SENDGRID_API_URL: &str = "https://api.sendgrid.com/v3/mail/send";

/// Best-effort notification channel. Production uses SendGrid; tests inject
/// recording fakes.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), MailError>;
}

#[derive(Clone)]
pub struct SendGridMailer {
    api_key: String,
    from_email: String,
    client: Client,
}

impl SendGridMailer {
    pub fn new(api_key: String, from_email: String) -> Self {
        Self {
            api_key,
            from_email,
            client: Client::new(),
        }
    }
}

#[async_trait]
impl Mailer for SendGridMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), MailError> {
        let payload = json!({
            "personalizations": [{
                "to": [{ "email": to }]
            }],
            "from": { "email": self.from_email },
            "subject": subject,
            "content": [{
                "type": "text/plain",
                "value": body
            }]
        });

        let response = self
            .client
            .post(SENDGRID_API_URL)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await?;

        if response.status().is_success() {
            info!("Alert email sent to {} with status {}", to, response.status());
            Ok(())
        } else {
            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "No response body".to_string());
            Err(MailError::Api { status, body })
        }
    }
}

//! HTTP mail API client for workflow emails

use reqwest::Client as HttpClient;
use serde_json::json;

use crate::config::MailerConfig;
use crate::error::{ExitflowError, Result};

pub struct MailerClient {
    base_url: String,
    api_key: String,
    sender: String,
    http_client: HttpClient,
}

impl MailerClient {
    pub fn new(config: MailerConfig) -> Self {
        let http_client = HttpClient::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: config.base_url,
            api_key: config.api_key,
            sender: config.sender,
            http_client,
        }
    }

    /// Send one plain-text email through the mail API.
    pub async fn send(&self, to: &str, subject: &str, body: &str) -> Result<()> {
        let url = format!("{}/messages", self.base_url.trim_end_matches('/'));

        let payload = json!({
            "from": self.sender,
            "to": to,
            "subject": subject,
            "text": body,
        });

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ExitflowError::ServiceUnavailable(format!(
                "Mail API error: {}",
                error_text
            )));
        }

        log::info!("Sent workflow email to {}: {}", to, subject);
        Ok(())
    }
}

use crate::config::EmailConfig;
use crate::error::{AppError, AppResult};
use reqwest::Client;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct SendEmailRequest<'a> {
    pub from: &'a str,
    pub to: Vec<&'a str>,
    pub subject: &'a str,
    pub text: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct SendEmailResponse {
    pub id: String,
}

#[derive(Clone)]
pub struct EmailService {
    client: Client,
    config: EmailConfig,
}

impl EmailService {
    pub fn new(config: EmailConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    pub fn is_configured(&self) -> bool {
        !self.config.api_key.is_empty() && !self.config.from_address.is_empty()
    }

    pub async fn send(&self, to: &str, subject: &str, text: &str) -> AppResult<String> {
        if !self.is_configured() {
            return Err(AppError::ConfigError(
                "Email delivery is not configured".to_string(),
            ));
        }

        let url = format!("{}/emails", self.config.base_url.trim_end_matches('/'));
        let request = SendEmailRequest {
            from: &self.config.from_address,
            to: vec![to],
            subject,
            text,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await?;

        if response.status().is_success() {
            let sent: SendEmailResponse = response.json().await?;
            log::info!("Email sent to {}: {}", to, sent.id);
            Ok(sent.id)
        } else {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            log::error!("Email to {} failed: {}", to, error_text);
            Err(AppError::ExternalApiError(format!(
                "Email sending failed: {}",
                error_text
            )))
        }
    }
}

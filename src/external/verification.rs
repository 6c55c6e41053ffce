use crate::config::VerificationConfig;
use crate::error::{AppError, AppResult};
use reqwest::Client;
use serde::Serialize;

/// Body accepted by the on-chain payment verification endpoint, which in
/// turn notifies the vendors involved.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PaymentVerificationRequest {
    pub transaction_hash: String,
    pub order_id: String,
    /// base units
    pub expected_amount: String,
    pub from_address: String,
    pub to_address: String,
    pub chain_id: u64,
}

#[derive(Clone)]
pub struct PaymentVerificationClient {
    client: Client,
    config: VerificationConfig,
}

impl PaymentVerificationClient {
    pub fn new(config: VerificationConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    pub async fn verify_payment(&self, request: &PaymentVerificationRequest) -> AppResult<()> {
        if self.config.url.is_empty() {
            return Err(AppError::ConfigError(
                "Payment verification url is not configured".to_string(),
            ));
        }

        let mut builder = self.client.post(&self.config.url).json(request);
        if let Some(key) = &self.config.api_key {
            builder = builder.bearer_auth(key);
        }
        let response = builder.send().await?;

        if response.status().is_success() {
            log::info!(
                "Payment verification triggered for order {} ({})",
                request.order_id,
                request.transaction_hash
            );
            Ok(())
        } else {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            Err(AppError::ExternalApiError(format!(
                "Payment verification returned {status}: {error_text}"
            )))
        }
    }
}

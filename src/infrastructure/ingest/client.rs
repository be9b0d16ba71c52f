//! SignalFx datapoint ingest client.

use crate::config::SignalFxExporterConfig;
use crate::domain::errors::DeliveryError;
use crate::domain::ports::{DataPointSink, DeliveryReceipt};
use crate::domain::types::GaugeBatch;
use crate::infrastructure::ingest::http_client_factory::HttpClientFactory;
use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use tracing::{debug, info, warn};

pub struct SignalFxClient {
    client: Client,
    endpoint: String,
    auth_token: String,
}

impl SignalFxClient {
    pub fn new(config: &SignalFxExporterConfig) -> Result<Self, DeliveryError> {
        Ok(Self {
            client: HttpClientFactory::create_client(config.timeout())?,
            endpoint: config.endpoint.clone(),
            auth_token: config.auth_token.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl DataPointSink for SignalFxClient {
    /// POST the batch once. A non-2xx answer is reported in the receipt, not
    /// raised as an error.
    async fn send(&self, batch: &GaugeBatch) -> Result<DeliveryReceipt, DeliveryError> {
        let body = serde_json::to_vec(batch)?;
        debug!(
            "Posting {} datapoints ({} bytes) to {}",
            batch.len(),
            body.len(),
            self.endpoint
        );

        let response = self
            .client
            .post(&self.endpoint)
            .header(AUTHORIZATION, format!("Splunk {}", self.auth_token))
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(DeliveryError::Request)?;

        let status = response.status();
        println!("Ingest response: {}", status);

        if status.is_success() {
            info!("Ingest accepted {} datapoints ({})", batch.len(), status);
        } else {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            warn!("Ingest answered {}: {}", status, error_text.trim());
        }

        Ok(DeliveryReceipt {
            status: Some(status.as_u16()),
            status_line: status.to_string(),
        })
    }
}

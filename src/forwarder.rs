// Best-effort push of completed reports to a central aggregator

use std::time::Duration;

use crate::config::ForwarderConfig;
use crate::models::Report;

#[derive(Clone)]
pub struct Forwarder {
    client: reqwest::Client,
    endpoint: String,
    api_token: String,
}

impl Forwarder {
    pub fn new(config: &ForwarderConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;
        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            api_token: config.api_token.clone(),
        })
    }

    /// Upload one report. Failures are logged and swallowed; delivery is
    /// not part of the scan contract.
    pub async fn forward(&self, report: &Report) {
        let url = format!("{}/api/report", self.endpoint);
        let result = self
            .client
            .post(&url)
            .bearer_auth(&self.api_token)
            .json(report)
            .send()
            .await;
        match result {
            Ok(response) if response.status().is_success() => {
                tracing::debug!(operation = "forward_report", "report forwarded");
            }
            Ok(response) => {
                tracing::warn!(
                    operation = "forward_report",
                    status = %response.status(),
                    "aggregator rejected report"
                );
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    operation = "forward_report",
                    "failed to forward report"
                );
            }
        }
    }
}

//! Ingestion endpoint configuration (`exporters.signalfx`).

use serde::Deserialize;
use std::fmt;
use std::time::Duration;

pub const DEFAULT_INGEST_URL: &str = "https://ingest.us1.signalfx.com/v2/datapoint";

#[derive(Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SignalFxExporterConfig {
    pub endpoint: String,
    pub auth_token: String,
    /// Request timeout; the HTTP client default applies when absent
    pub timeout_ms: Option<u64>,
}

impl Default for SignalFxExporterConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_INGEST_URL.to_string(),
            auth_token: String::new(),
            timeout_ms: None,
        }
    }
}

impl SignalFxExporterConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}

impl fmt::Debug for SignalFxExporterConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignalFxExporterConfig")
            .field("endpoint", &self.endpoint)
            .field("auth_token", &"<redacted>")
            .field("timeout_ms", &self.timeout_ms)
            .finish()
    }
}

//! Configuration module for the gauge relay.
//!
//! The relay is configured by a single YAML document shaped like a collector
//! config: one `smartagent/sql` receiver describing the warehouse connection
//! and queries, and one `signalfx` exporter describing the ingest endpoint.
//! Secrets can be supplied through environment variables (or a `.env` file)
//! instead of the document itself.

mod exporter_config;
mod receiver_config;

pub use exporter_config::{DEFAULT_INGEST_URL, SignalFxExporterConfig};
pub use receiver_config::{ConnectionParams, MetricSpec, QuerySpec, SqlReceiverConfig, ValueMode};

use crate::domain::errors::ConfigError;
use serde::Deserialize;
use std::env;
use std::path::Path;
use tracing::{debug, info};

/// Default location of the configuration document
pub const DEFAULT_CONFIG_PATH: &str = "config.yaml";

pub const ENV_AUTH_TOKEN: &str = "GAUGE_RELAY_AUTH_TOKEN";
pub const ENV_ENDPOINT: &str = "GAUGE_RELAY_ENDPOINT";
pub const ENV_DB_PASSWORD: &str = "GAUGE_RELAY_DB_PASSWORD";

/// Root configuration document.
///
/// Loaded once at startup and never mutated after [`Config::load`] returns.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Config {
    pub receivers: Receivers,
    #[serde(default)]
    pub exporters: Exporters,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Receivers {
    #[serde(rename = "smartagent/sql")]
    pub sql: SqlReceiverConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Exporters {
    #[serde(default)]
    pub signalfx: SignalFxExporterConfig,
}

impl Config {
    /// Parse configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Parse configuration from a YAML file without applying overrides.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml(&content)
    }

    /// Read the file, apply environment overrides and validate.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::from_file(path)?;
        config.apply_env_overrides();
        config.validate()?;

        info!(
            "Configuration loaded from {}: driver={}, queries={}, endpoint={}",
            path.display(),
            config.receivers.sql.db_driver,
            config.receivers.sql.queries.len(),
            config.exporters.signalfx.endpoint
        );
        Ok(config)
    }

    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| env::var(key).ok());
    }

    /// Apply overrides from any key lookup; empty values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.is_empty());

        if let Some(token) = get(ENV_AUTH_TOKEN) {
            debug!("Auth token taken from {}", ENV_AUTH_TOKEN);
            self.exporters.signalfx.auth_token = token;
        }
        if let Some(endpoint) = get(ENV_ENDPOINT) {
            debug!("Ingest endpoint taken from {}", ENV_ENDPOINT);
            self.exporters.signalfx.endpoint = endpoint;
        }
        if let Some(password) = get(ENV_DB_PASSWORD) {
            debug!("Database password taken from {}", ENV_DB_PASSWORD);
            self.receivers.sql.params.password = password;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_receiver()?;
        self.validate_exporter()
    }

    pub fn validate_exporter(&self) -> Result<(), ConfigError> {
        let exporter = &self.exporters.signalfx;

        let endpoint = url::Url::parse(&exporter.endpoint).map_err(|e| {
            invalid(format!(
                "exporters.signalfx.endpoint '{}' is not a valid URL: {}",
                exporter.endpoint, e
            ))
        })?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(invalid(format!(
                "exporters.signalfx.endpoint must use http or https, got '{}'",
                endpoint.scheme()
            )));
        }
        if exporter.auth_token.is_empty() {
            return Err(invalid(format!(
                "exporters.signalfx.authToken is empty (set it in the config or {})",
                ENV_AUTH_TOKEN
            )));
        }
        Ok(())
    }

    pub fn validate_receiver(&self) -> Result<(), ConfigError> {
        let receiver = &self.receivers.sql;
        if receiver.db_driver.trim().is_empty() {
            return Err(invalid("dbDriver is empty".to_string()));
        }
        for (index, query) in receiver.queries.iter().enumerate() {
            if query.query.trim().is_empty() {
                return Err(invalid(format!("queries[{}].query is empty", index)));
            }
            for metric in &query.metrics {
                if metric.metric_name.trim().is_empty() {
                    return Err(invalid(format!(
                        "queries[{}] has a metric with an empty metricName",
                        index
                    )));
                }
                if metric.value_column.trim().is_empty() {
                    return Err(invalid(format!(
                        "queries[{}] metric {} has an empty valueColumn",
                        index, metric.metric_name
                    )));
                }
            }
        }
        Ok(())
    }
}

fn invalid(reason: String) -> ConfigError {
    ConfigError::Invalid { reason }
}

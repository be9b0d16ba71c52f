//! SQL receiver configuration (`receivers.smartagent/sql`).
//!
//! Connection parameters, the ordered query list and the per-query metric
//! extraction rules.

use serde::Deserialize;
use std::fmt;

/// How the value column of a metric is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueMode {
    /// Numeric strings plus native integer and float columns
    #[default]
    Numeric,
    /// Only string columns, parsed as f64
    Text,
}

impl ValueMode {
    pub fn expected(&self) -> &'static str {
        match self {
            ValueMode::Numeric => "number or numeric string",
            ValueMode::Text => "string",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SqlReceiverConfig {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    /// Poll interval, kept for scheduled deployments; a one-shot run ignores it
    #[serde(default)]
    pub interval_seconds: u64,
    pub db_driver: String,
    #[serde(default)]
    pub value_mode: ValueMode,
    #[serde(default)]
    pub params: ConnectionParams,
    #[serde(default)]
    pub queries: Vec<QuerySpec>,
}

#[derive(Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConnectionParams {
    pub account: String,
    pub database: String,
    pub warehouse: String,
    pub user: String,
    pub password: String,
    /// Used verbatim instead of the assembled URL when non-empty
    pub connection_string: String,
}

impl fmt::Debug for ConnectionParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionParams")
            .field("account", &self.account)
            .field("database", &self.database)
            .field("warehouse", &self.warehouse)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field(
                "connection_string",
                &if self.connection_string.is_empty() {
                    ""
                } else {
                    "<redacted>"
                },
            )
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuerySpec {
    pub query: String,
    #[serde(default)]
    pub metrics: Vec<MetricSpec>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricSpec {
    pub metric_name: String,
    pub value_column: String,
    #[serde(default)]
    pub dimension_columns: Vec<String>,
}

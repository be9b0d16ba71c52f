use crate::domain::errors::{DeliveryError, QueryError};
use crate::domain::types::{GaugeBatch, ResultRow};
use async_trait::async_trait;

/// Outcome of handing one batch to a sink
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReceipt {
    /// HTTP status code, `None` when the sink does not speak HTTP
    pub status: Option<u16>,
    /// Human readable status line, e.g. `200 OK`
    pub status_line: String,
}

impl DeliveryReceipt {
    pub fn is_success(&self) -> bool {
        self.status.is_none_or(|code| (200..300).contains(&code))
    }
}

#[async_trait]
pub trait QuerySource: Send {
    /// Run `sql` and materialise every row in cursor order.
    async fn fetch_rows(&mut self, sql: &str) -> Result<Vec<ResultRow>, QueryError>;
}

#[async_trait]
pub trait DataPointSink: Send + Sync {
    async fn send(&self, batch: &GaugeBatch) -> Result<DeliveryReceipt, DeliveryError>;
}

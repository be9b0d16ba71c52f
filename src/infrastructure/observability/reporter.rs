//! End-of-run reporter for the relay
//!
//! Prints one structured JSON line to stdout once all queries are processed.
//! Log shippers can pick it up by its `RUN_SUMMARY:` prefix.

use crate::domain::types::{QueryOutcome, RunSummary};
use crate::infrastructure::observability::metrics::Metrics;
use serde::Serialize;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Summary snapshot for JSON output
#[derive(Serialize)]
pub struct RunSnapshot<'a> {
    pub timestamp: String,
    pub version: &'static str,
    pub duration_ms: u64,
    pub queries_total: usize,
    pub queries_failed: usize,
    pub datapoints_total: usize,
    pub queries: &'a [QueryOutcome],
}

pub struct RunReporter {
    metrics: Metrics,
    start_time: Instant,
}

impl RunReporter {
    pub fn new(metrics: Metrics) -> Self {
        Self {
            metrics,
            start_time: Instant::now(),
        }
    }

    pub fn snapshot<'a>(&self, summary: &'a RunSummary) -> RunSnapshot<'a> {
        RunSnapshot {
            timestamp: chrono::Utc::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION"),
            duration_ms: self.start_time.elapsed().as_millis() as u64,
            queries_total: summary.queries.len(),
            queries_failed: summary.failures(),
            datapoints_total: summary.datapoints(),
            queries: &summary.queries,
        }
    }

    pub fn report(&self, summary: &RunSummary) {
        let snapshot = self.snapshot(summary);

        match serde_json::to_string(&snapshot) {
            Ok(json) => println!("RUN_SUMMARY:{}", json),
            Err(e) => warn!("Failed to serialize run summary: {}", e),
        }
        info!(
            "Run finished in {}ms | Queries: {} ({} failed) | Datapoints: {}",
            snapshot.duration_ms,
            snapshot.queries_total,
            snapshot.queries_failed,
            snapshot.datapoints_total
        );
        debug!("Metrics:\n{}", self.metrics.render());
    }
}

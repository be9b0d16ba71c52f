//! Query → map → send orchestration.
//!
//! Queries are processed strictly one after another, in configuration order.
//! Each query's rows are mapped and delivered as one batch before the next
//! query starts; nothing is carried over between queries.

use crate::application::mapper::MetricMapper;
use crate::config::{QuerySpec, ValueMode};
use crate::domain::errors::RelayError;
use crate::domain::ports::{DataPointSink, QuerySource};
use crate::domain::types::{GaugeBatch, QueryOutcome, RunSummary};
use crate::infrastructure::observability::{LatencyGuard, Metrics};
use thiserror::Error;
use tracing::{error, info, warn};

/// What to do when one query cannot be executed, mapped or delivered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorPolicy {
    /// Stop at the first failure and return it
    #[default]
    FailFast,
    /// Record the failure in the summary and move on to the next query
    ContinueOnError,
}

/// First failure of a fail-fast run
#[derive(Debug, Error)]
#[error("query {query} failed: {source}")]
pub struct QueryFailure {
    /// 1-based position in the configuration
    pub query: usize,
    #[source]
    pub source: RelayError,
}

pub struct Relay<Q, S> {
    source: Q,
    sink: S,
    mapper: MetricMapper,
    policy: ErrorPolicy,
    metrics: Metrics,
}

impl<Q: QuerySource, S: DataPointSink> Relay<Q, S> {
    pub fn new(source: Q, sink: S, metrics: Metrics) -> Self {
        Self {
            source,
            sink,
            mapper: MetricMapper::default(),
            policy: ErrorPolicy::default(),
            metrics,
        }
    }

    pub fn with_policy(mut self, policy: ErrorPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_value_mode(mut self, mode: ValueMode) -> Self {
        self.mapper = MetricMapper::new(mode);
        self
    }

    pub fn into_parts(self) -> (Q, S) {
        (self.source, self.sink)
    }

    /// Execute one query/send cycle per configured query.
    pub async fn run(&mut self, queries: &[QuerySpec]) -> Result<RunSummary, QueryFailure> {
        let mut summary = RunSummary::default();

        for (index, spec) in queries.iter().enumerate() {
            let mut outcome = QueryOutcome {
                query: index + 1,
                ..Default::default()
            };
            info!(
                "Query {}/{}: {} metric(s)",
                outcome.query,
                queries.len(),
                spec.metrics.len()
            );

            match self.run_query(spec, &mut outcome).await {
                Ok(()) => self.metrics.inc_queries("ok"),
                Err(e) => {
                    self.metrics.inc_queries("failed");
                    error!("Query {} failed at {} stage: {}", outcome.query, e.stage(), e);

                    match self.policy {
                        ErrorPolicy::FailFast => {
                            return Err(QueryFailure {
                                query: outcome.query,
                                source: e,
                            });
                        }
                        ErrorPolicy::ContinueOnError => {
                            warn!("Continuing with next query");
                            outcome.error = Some(e.to_string());
                        }
                    }
                }
            }
            summary.queries.push(outcome);
        }

        Ok(summary)
    }

    async fn run_query(
        &mut self,
        spec: &QuerySpec,
        outcome: &mut QueryOutcome,
    ) -> Result<(), RelayError> {
        let rows = {
            let _timer = LatencyGuard::new(self.metrics.query_duration_seconds.clone(), "query");
            self.source.fetch_rows(&spec.query).await?
        };
        outcome.rows = rows.len();
        self.metrics.rows_total.inc_by(rows.len() as u64);

        let batch = GaugeBatch::new(self.mapper.map_rows(&rows, &spec.metrics)?);
        // rows are no longer needed once mapped
        drop(rows);
        outcome.datapoints = batch.len();

        let receipt = {
            let _timer = LatencyGuard::new(self.metrics.ingest_duration_seconds.clone(), "ingest");
            self.sink.send(&batch).await?
        };
        outcome.response_status = receipt.status;
        self.metrics.datapoints_total.inc_by(batch.len() as u64);
        self.metrics.observe_response(receipt.status);

        if !receipt.is_success() {
            warn!(
                "Query {}: ingest did not accept the batch ({})",
                outcome.query, receipt.status_line
            );
        }
        Ok(())
    }
}

//! Prometheus metrics describing a relay run
//!
//! All metrics use the `gauge_relay_` prefix.

use prometheus::{
    Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
};
use std::sync::Arc;

const LATENCY_BUCKETS: &[f64] = &[0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0];

/// Prometheus metrics for the relay
#[derive(Clone)]
pub struct Metrics {
    registry: Arc<Registry>,
    /// Queries processed, by outcome (ok / failed)
    pub queries_total: IntCounterVec,
    /// Result rows read from the warehouse
    pub rows_total: IntCounter,
    /// Data points handed to the sink
    pub datapoints_total: IntCounter,
    /// Ingest responses by status class (2xx, 4xx, 5xx, none)
    pub ingest_responses_total: IntCounterVec,
    /// Time spent executing and reading one query
    pub query_duration_seconds: Histogram,
    /// Time spent delivering one batch
    pub ingest_duration_seconds: Histogram,
}

impl Metrics {
    /// Create a new Metrics instance with all counters and histograms registered
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let queries_total = IntCounterVec::new(
            Opts::new("gauge_relay_queries_total", "Queries processed by outcome"),
            &["outcome"],
        )?;
        registry.register(Box::new(queries_total.clone()))?;

        let rows_total = IntCounter::with_opts(Opts::new(
            "gauge_relay_rows_total",
            "Result rows read from the warehouse",
        ))?;
        registry.register(Box::new(rows_total.clone()))?;

        let datapoints_total = IntCounter::with_opts(Opts::new(
            "gauge_relay_datapoints_total",
            "Gauge datapoints delivered to the sink",
        ))?;
        registry.register(Box::new(datapoints_total.clone()))?;

        let ingest_responses_total = IntCounterVec::new(
            Opts::new(
                "gauge_relay_ingest_responses_total",
                "Ingest responses by HTTP status class",
            ),
            &["class"],
        )?;
        registry.register(Box::new(ingest_responses_total.clone()))?;

        let query_duration_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "gauge_relay_query_duration_seconds",
                "Query execution and row read time in seconds",
            )
            .buckets(LATENCY_BUCKETS.to_vec()),
        )?;
        registry.register(Box::new(query_duration_seconds.clone()))?;

        let ingest_duration_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "gauge_relay_ingest_duration_seconds",
                "Batch delivery time in seconds",
            )
            .buckets(LATENCY_BUCKETS.to_vec()),
        )?;
        registry.register(Box::new(ingest_duration_seconds.clone()))?;

        Ok(Self {
            registry: Arc::new(registry),
            queries_total,
            rows_total,
            datapoints_total,
            ingest_responses_total,
            query_duration_seconds,
            ingest_duration_seconds,
        })
    }

    /// Render all metrics in Prometheus text format
    pub fn render(&self) -> String {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        encoder
            .encode_to_string(&metric_families)
            .unwrap_or_default()
    }

    pub fn inc_queries(&self, outcome: &str) {
        self.queries_total.with_label_values(&[outcome]).inc();
    }

    /// Count an ingest response; `None` means the sink had no HTTP status.
    pub fn observe_response(&self, status: Option<u16>) {
        let class = match status {
            Some(code) => format!("{}xx", code / 100),
            None => "none".to_string(),
        };
        self.ingest_responses_total
            .with_label_values(&[class.as_str()])
            .inc();
    }
}

//! Push-based observability for the relay
//!
//! Nothing listens for requests. Counters and latency histograms are kept in a
//! private prometheus registry and emitted once, at the end of the run, next to
//! a `RUN_SUMMARY:` JSON line on stdout.

pub mod latency_tracker;
pub mod metrics;
pub mod reporter;

pub use latency_tracker::LatencyGuard;
pub use metrics::Metrics;
pub use reporter::RunReporter;

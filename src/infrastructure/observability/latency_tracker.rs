//! Scoped timing of relay stages.
//!
//! A guard is created when a stage starts (warehouse query, ingest POST) and
//! records into its histogram when it goes out of scope, whether the stage
//! returned normally or bailed out early with `?`.

use prometheus::Histogram;
use std::time::Instant;
use tracing::debug;

pub struct LatencyGuard {
    stage: &'static str,
    start: Instant,
    histogram: Histogram,
}

impl LatencyGuard {
    pub fn new(histogram: Histogram, stage: &'static str) -> Self {
        Self {
            stage,
            start: Instant::now(),
            histogram,
        }
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }
}

impl Drop for LatencyGuard {
    fn drop(&mut self) {
        let secs = self.elapsed_secs();
        self.histogram.observe(secs);
        debug!("{} stage took {:.3}s", self.stage, secs);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prometheus::HistogramOpts;

    fn histogram() -> Histogram {
        Histogram::with_opts(HistogramOpts::new("test_stage_seconds", "test")).unwrap()
    }

    #[test]
    fn test_observes_once_when_dropped() {
        let histogram = histogram();

        {
            let guard = LatencyGuard::new(histogram.clone(), "query");
            std::thread::sleep(std::time::Duration::from_millis(10));
            assert!(guard.elapsed_secs() >= 0.01);
            assert_eq!(histogram.get_sample_count(), 0);
        }

        assert!(histogram.get_sample_sum() >= 0.01);
        assert_eq!(histogram.get_sample_count(), 1);
    }

    #[test]
    fn test_observes_on_early_return() {
        fn failing_stage(histogram: &Histogram) -> Result<(), &'static str> {
            let _timer = LatencyGuard::new(histogram.clone(), "ingest");
            let response: Result<(), &'static str> = Err("refused");
            response?;
            Ok(())
        }

        let histogram = histogram();
        assert!(failing_stage(&histogram).is_err());
        assert_eq!(histogram.get_sample_count(), 1);
    }
}

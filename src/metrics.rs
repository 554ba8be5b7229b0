use metrics::{Counter, Histogram};
use std::time::Duration;

pub struct Metrics {
    pub pages_fetched: Counter,
    pub render_failures: Counter,
    pub records_extracted: Counter,
    pub empty_results: Counter,
    pub exports_produced: Counter,
    pub fetch_duration: Histogram,
}

impl Metrics {
    /// Creates detached handles. These stay no-ops until a recorder is
    /// installed process-wide (e.g. via a `metrics` exporter crate);
    /// instrumentation call sites do not change either way.
    pub fn new() -> Self {
        Self {
            pages_fetched: Counter::noop(),
            render_failures: Counter::noop(),
            records_extracted: Counter::noop(),
            empty_results: Counter::noop(),
            exports_produced: Counter::noop(),
            fetch_duration: Histogram::noop(),
        }
    }

    pub fn record_fetch(&self, duration: Duration, record_count: usize) {
        self.pages_fetched.increment(1);
        self.records_extracted.increment(record_count as u64);
        if record_count == 0 {
            self.empty_results.increment(1);
        }
        self.fetch_duration.record(duration.as_secs_f64());
    }

    pub fn record_render_failure(&self) {
        self.render_failures.increment(1);
    }

    pub fn record_export(&self) {
        self.exports_produced.increment(1);
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

use std::collections::HashMap;
use std::time::Instant;

/// Side channel for long-running corpus operations.
///
/// A run is one stage (e.g. "Processing files") made of items (one archive,
/// one identity), each of which has its own unit-level progress. Keeps the
/// use cases independent of any terminal or GUI progress display.
pub trait ProgressReporter: Send {
    fn begin_stage(&mut self, name: &str, total: usize);

    fn stage_progress(&mut self, current: usize, total: usize);

    fn begin_item(&mut self, label: &str, total: usize);

    fn item_progress(&mut self, current: usize, total: usize);

    fn end_item(&mut self);

    /// Record how long a named step took.
    fn timing(&mut self, step: &str, duration_ms: f64);

    fn info(&mut self, message: &str);

    /// Emit an end-of-run summary. Default: no-op.
    fn summary(&self) {}
}

/// Reporter that discards all events. Used by tests.
pub struct NullProgressReporter;

impl ProgressReporter for NullProgressReporter {
    fn begin_stage(&mut self, _name: &str, _total: usize) {}
    fn stage_progress(&mut self, _current: usize, _total: usize) {}
    fn begin_item(&mut self, _label: &str, _total: usize) {}
    fn item_progress(&mut self, _current: usize, _total: usize) {}
    fn end_item(&mut self) {}
    fn timing(&mut self, _step: &str, _duration_ms: f64) {}
    fn info(&mut self, _message: &str) {}
}

/// Reporter that writes through the `log` facade.
///
/// Item-level progress is throttled to every `throttle` units so large
/// recordings do not flood the log.
pub struct LogProgressReporter {
    throttle: usize,
    stage: String,
    item: String,
    timings: HashMap<String, Vec<f64>>,
    start_time: Instant,
    items_finished: usize,
}

impl LogProgressReporter {
    pub fn new(throttle: usize) -> Self {
        Self {
            throttle: throttle.max(1),
            stage: String::new(),
            item: String::new(),
            timings: HashMap::new(),
            start_time: Instant::now(),
            items_finished: 0,
        }
    }

    /// Returns the formatted summary string, or `None` if nothing was timed.
    pub fn summary_string(&self) -> Option<String> {
        if self.timings.is_empty() {
            return None;
        }

        let elapsed_ms = self.start_time.elapsed().as_secs_f64() * 1000.0;
        let mut lines = vec![format!(
            "{} summary ({} items, {:.1}s total):",
            if self.stage.is_empty() { "Run" } else { self.stage.as_str() },
            self.items_finished,
            elapsed_ms / 1000.0
        )];

        let mut steps: Vec<_> = self.timings.keys().collect();
        steps.sort();
        for step in steps {
            let durations = &self.timings[step];
            let total_ms: f64 = durations.iter().sum();
            let avg_ms = total_ms / durations.len().max(1) as f64;
            lines.push(format!(
                "  {step:12}: avg {avg_ms:8.1}ms  total {total_ms:9.0}ms  ({} calls)",
                durations.len()
            ));
        }
        Some(lines.join("\n"))
    }

    pub fn timings_for(&self, step: &str) -> Option<&[f64]> {
        self.timings.get(step).map(|v| v.as_slice())
    }
}

impl Default for LogProgressReporter {
    fn default() -> Self {
        Self::new(50)
    }
}

impl ProgressReporter for LogProgressReporter {
    fn begin_stage(&mut self, name: &str, total: usize) {
        self.stage = name.to_string();
        log::info!("{name}: {total} items");
    }

    fn stage_progress(&mut self, current: usize, total: usize) {
        if total > 0 {
            let pct = current as f64 / total as f64 * 100.0;
            log::info!("{}: {current}/{total} ({pct:.1}%)", self.stage);
        }
    }

    fn begin_item(&mut self, label: &str, total: usize) {
        self.item = label.to_string();
        log::debug!("{label}: {total} units");
    }

    fn item_progress(&mut self, current: usize, total: usize) {
        if total > 0 && (current % self.throttle == 0 || current == total) {
            log::debug!("{}: {current}/{total}", self.item);
        }
    }

    fn end_item(&mut self) {
        self.items_finished += 1;
        self.item.clear();
    }

    fn timing(&mut self, step: &str, duration_ms: f64) {
        self.timings
            .entry(step.to_string())
            .or_default()
            .push(duration_ms);
    }

    fn info(&mut self, message: &str) {
        log::info!("{message}");
    }

    fn summary(&self) {
        if let Some(text) = self.summary_string() {
            log::info!("\n\n{text}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_reporter_all_methods_are_noop() {
        let mut reporter = NullProgressReporter;
        reporter.begin_stage("files", 2);
        reporter.begin_item("alice", 3);
        reporter.item_progress(1, 3);
        reporter.end_item();
        reporter.stage_progress(1, 2);
        reporter.timing("archive", 5.0);
        reporter.info("hello");
        reporter.summary();
    }

    #[test]
    fn test_timing_records_values() {
        let mut reporter = LogProgressReporter::new(10);
        reporter.timing("archive", 20.0);
        reporter.timing("archive", 30.0);
        reporter.timing("identity", 5.0);

        let archive = reporter.timings_for("archive").unwrap();
        assert_eq!(archive, &[20.0, 30.0]);
        assert_eq!(reporter.timings_for("identity").unwrap().len(), 1);
        assert!(reporter.timings_for("missing").is_none());
    }

    #[test]
    fn test_summary_names_stage_and_steps() {
        let mut reporter = LogProgressReporter::new(10);
        reporter.begin_stage("Processing files", 2);
        reporter.begin_item("alice", 1);
        reporter.end_item();
        reporter.timing("archive", 12.0);

        let summary = reporter.summary_string().unwrap();
        assert!(summary.contains("Processing files summary (1 items"));
        assert!(summary.contains("archive"));
    }

    #[test]
    fn test_empty_summary_returns_none() {
        assert!(LogProgressReporter::new(10).summary_string().is_none());
    }

    #[test]
    fn test_end_item_counts_and_clears_label() {
        let mut reporter = LogProgressReporter::new(10);
        reporter.begin_item("bob", 4);
        for i in 1..=4 {
            reporter.item_progress(i, 4);
        }
        reporter.end_item();
        assert_eq!(reporter.items_finished, 1);
        assert!(reporter.item.is_empty());
    }

    #[test]
    fn test_throttle_never_zero() {
        assert_eq!(LogProgressReporter::new(0).throttle, 1);
        assert_eq!(LogProgressReporter::default().throttle, 50);
    }
}

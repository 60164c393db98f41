use std::collections::HashMap;

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

use facecorpus_core::pipeline::progress_reporter::ProgressReporter;

const STAGE_TEMPLATE: &str = "{msg:<20} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len}";
const ITEM_TEMPLATE: &str = "  {msg:<25} [{bar:40.green/white}] {pos}/{len}";

/// Terminal progress: an overall bar per stage with a nested bar per item.
pub struct TerminalReporter {
    multi: MultiProgress,
    stage_style: ProgressStyle,
    item_style: ProgressStyle,
    stage: Option<ProgressBar>,
    item: Option<ProgressBar>,
    timings: HashMap<String, (f64, usize)>,
}

impl TerminalReporter {
    pub fn new() -> Result<Self, Box<dyn std::error::Error>> {
        Ok(Self {
            multi: MultiProgress::new(),
            stage_style: ProgressStyle::with_template(STAGE_TEMPLATE)?.progress_chars("#>-"),
            item_style: ProgressStyle::with_template(ITEM_TEMPLATE)?.progress_chars("#>-"),
            stage: None,
            item: None,
            timings: HashMap::new(),
        })
    }

    fn finish_stage(&mut self) {
        if let Some(item) = self.item.take() {
            item.finish_and_clear();
        }
        if let Some(stage) = self.stage.take() {
            stage.finish();
        }
    }
}

impl ProgressReporter for TerminalReporter {
    fn begin_stage(&mut self, name: &str, total: usize) {
        self.finish_stage();
        let bar = self.multi.add(ProgressBar::new(total as u64));
        bar.set_style(self.stage_style.clone());
        bar.set_message(name.to_string());
        self.stage = Some(bar);
    }

    fn stage_progress(&mut self, current: usize, _total: usize) {
        if let Some(bar) = &self.stage {
            bar.set_position(current as u64);
        }
    }

    fn begin_item(&mut self, label: &str, total: usize) {
        let bar = match self.item.take() {
            Some(bar) => bar,
            None => {
                let bar = self.multi.add(ProgressBar::new(0));
                bar.set_style(self.item_style.clone());
                bar
            }
        };
        bar.reset();
        bar.set_length(total as u64);
        bar.set_message(label.to_string());
        self.item = Some(bar);
    }

    fn item_progress(&mut self, current: usize, _total: usize) {
        if let Some(bar) = &self.item {
            bar.set_position(current as u64);
        }
    }

    fn end_item(&mut self) {}

    fn timing(&mut self, step: &str, duration_ms: f64) {
        let entry = self.timings.entry(step.to_string()).or_default();
        entry.0 += duration_ms;
        entry.1 += 1;
    }

    fn info(&mut self, message: &str) {
        self.multi.suspend(|| log::info!("{message}"));
    }

    fn summary(&self) {
        let mut steps: Vec<_> = self.timings.iter().collect();
        steps.sort_by(|a, b| a.0.cmp(b.0));
        for (step, (total_ms, calls)) in steps {
            let avg_ms = total_ms / (*calls).max(1) as f64;
            log::info!("{step}: avg {avg_ms:.1}ms over {calls} calls");
        }
    }
}

impl Drop for TerminalReporter {
    fn drop(&mut self) {
        self.finish_stage();
    }
}

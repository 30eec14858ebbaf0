//! Terminal progress for export runs

use indicatif::{ProgressBar, ProgressStyle};
use mhdb::export::ProgressReporter;

const TEMPLATE: &str = "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}";

/// Progress bar whose length grows as each entity class is loaded
pub struct BarReporter {
    bar: ProgressBar,
}

impl BarReporter {
    pub fn new() -> Self {
        let bar = ProgressBar::new(0);
        match ProgressStyle::default_bar().template(TEMPLATE) {
            Ok(style) => bar.set_style(style.progress_chars("#>-")),
            Err(e) => tracing::warn!("Invalid progress template: {}", e),
        }
        Self { bar }
    }
}

impl ProgressReporter for BarReporter {
    fn append(&mut self, steps: u64) {
        self.bar.inc_length(steps);
    }

    fn advance(&mut self) {
        self.bar.inc(1);
    }

    fn finish(&mut self) {
        self.bar.finish_with_message("done");
    }
}

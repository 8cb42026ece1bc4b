use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use scan_intake_core::{ScanRecord, ScanReporter};
use std::sync::atomic::{AtomicUsize, Ordering};

/// CLI reporter: one coloured line per outcome above a spinner that keeps a
/// running tally of the session.
pub struct CliReporter {
    bar: ProgressBar,
    accepted: AtomicUsize,
    duplicates: AtomicUsize,
    rejected: AtomicUsize,
}

impl CliReporter {
    pub fn new() -> Self {
        let bar = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
            bar.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
        }
        bar.enable_steady_tick(std::time::Duration::from_millis(80));
        let reporter = Self {
            bar,
            accepted: AtomicUsize::new(0),
            duplicates: AtomicUsize::new(0),
            rejected: AtomicUsize::new(0),
        };
        reporter.refresh();
        reporter
    }

    fn refresh(&self) {
        self.bar.set_message(format!(
            "Scanning... {} accepted, {} duplicates, {} ignored",
            self.accepted.load(Ordering::Relaxed),
            self.duplicates.load(Ordering::Relaxed),
            self.rejected.load(Ordering::Relaxed),
        ));
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl ScanReporter for CliReporter {
    fn on_accepted(&self, record: &ScanRecord) {
        self.accepted.fetch_add(1, Ordering::Relaxed);
        let checksum = if record.checksum_valid {
            "✓".green()
        } else {
            "✗ checksum".red()
        };
        self.bar.println(format!(
            "  {} {:<7} {} ({}) {}",
            "+".green(),
            record.barcode_type.to_string().cyan(),
            record.text,
            record.vendor,
            checksum
        ));
        self.refresh();
    }

    fn on_duplicate(&self, text: &str) {
        self.duplicates.fetch_add(1, Ordering::Relaxed);
        self.bar
            .println(format!("  {} duplicate {}", "!".yellow(), text.yellow()));
        self.refresh();
    }

    fn on_rejected(&self, _text: &str) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
        self.refresh();
    }

    fn on_cleared(&self, removed: usize) {
        self.bar
            .println(format!("  {} cleared {} records", "-".red(), removed));
        self.refresh();
    }
}

use crate::record::ScanRecord;

/// Trait for reporting intake outcomes as they happen.
///
/// CLI implements with coloured output and a spinner; other hosts hook in
/// sound or vibration feedback. All methods have default no-op implementations.
pub trait ScanReporter: Send + Sync {
    fn on_accepted(&self, _record: &ScanRecord) {}
    fn on_duplicate(&self, _text: &str) {}
    fn on_rejected(&self, _text: &str) {}
    fn on_cleared(&self, _removed: usize) {}
}

/// No-op reporter for silent operation.
pub struct SilentReporter;

impl ScanReporter for SilentReporter {}

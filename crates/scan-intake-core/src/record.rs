use crate::classify::{BarcodeType, Classification};
use crate::session::SessionContext;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

/// Bounding box of a detection within the camera frame, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// One detection event as handed over by the decoder adapter.
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    pub text: String,
    /// Decoder-reported symbology, e.g. `EAN_13` or `CODE_128`.
    pub format: String,
    pub region: Option<Region>,
    /// Epoch milliseconds when the decoder saw the code, if it reports one.
    pub timestamp: Option<i64>,
}

impl Detection {
    pub fn new(text: impl Into<String>, format: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            format: format.into(),
            region: None,
            timestamp: None,
        }
    }

    /// Parse a `text[,format]` input line. Splits on the first comma only;
    /// `default_format` applies when the line has none or the format is blank.
    pub fn parse_line(line: &str, default_format: &str) -> Self {
        match line.split_once(',') {
            Some((text, format)) if !format.trim().is_empty() => Self::new(text, format.trim()),
            Some((text, _)) => Self::new(text, default_format),
            None => Self::new(line, default_format),
        }
    }

    pub fn with_region(mut self, region: Region) -> Self {
        self.region = Some(region);
        self
    }

    pub fn with_timestamp(mut self, timestamp: i64) -> Self {
        self.timestamp = Some(timestamp);
        self
    }
}

/// An accepted scan. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanRecord {
    pub id: String,
    /// Trimmed decoded value.
    pub text: String,
    #[serde(rename = "type")]
    pub barcode_type: BarcodeType,
    pub vendor: String,
    pub checksum_valid: bool,
    pub user: String,
    pub session_id: String,
    /// Epoch milliseconds.
    pub timestamp: i64,
    pub format: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<Region>,
}

/// Source of record ids. Ids must never repeat within a process.
pub trait IdSource: Send + Sync {
    fn next_id(&self) -> String;
}

/// Random v4 UUIDs.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidSource;

impl IdSource for UuidSource {
    fn next_id(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

/// Deterministic ids (`<prefix>-1`, `<prefix>-2`, ...) for tests and replays.
#[derive(Debug)]
pub struct SequentialIds {
    prefix: String,
    next: AtomicU64,
}

impl SequentialIds {
    pub fn new(prefix: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
            next: AtomicU64::new(1),
        }
    }
}

impl IdSource for SequentialIds {
    fn next_id(&self) -> String {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        format!("{}-{}", self.prefix, n)
    }
}

/// Wall clock in epoch milliseconds.
pub trait Clock: Send + Sync {
    fn now_millis(&self) -> i64;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// Clock pinned to a fixed instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub i64);

impl Clock for FixedClock {
    fn now_millis(&self) -> i64 {
        self.0
    }
}

/// Builds scan records from a positive classification.
pub struct RecordFactory {
    ids: Box<dyn IdSource>,
}

impl RecordFactory {
    pub fn new(ids: Box<dyn IdSource>) -> Self {
        Self { ids }
    }

    /// Callers only pass classifications with `is_valid` set, after the
    /// duplicate check has come back negative.
    pub fn create(
        &self,
        classification: &Classification,
        detection: &Detection,
        context: &SessionContext,
        now: i64,
    ) -> ScanRecord {
        debug_assert!(classification.is_valid, "record created from invalid classification");

        ScanRecord {
            id: self.ids.next_id(),
            text: detection.text.trim().to_string(),
            barcode_type: classification.barcode_type,
            vendor: classification.vendor.to_string(),
            checksum_valid: classification.checksum_valid,
            user: context.user.clone(),
            session_id: context.session_id.clone(),
            timestamp: now,
            format: detection.format.clone(),
            region: detection.region,
        }
    }
}

impl Default for RecordFactory {
    fn default() -> Self {
        Self::new(Box::new(UuidSource))
    }
}

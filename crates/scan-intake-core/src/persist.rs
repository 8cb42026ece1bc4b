//! Boundary between the in-memory log and whatever persisted it.
//!
//! Persisted data is untrusted: every field is read as optional and a record
//! missing any required field is skipped with `Error::MalformedRecord`
//! instead of failing the whole load.

use crate::classify::BarcodeType;
use crate::error::{Error, Result};
use crate::record::{Region, ScanRecord};
use crate::scan_log::ScanLog;
use serde::Deserialize;
use serde_json::Value;
use tracing::{info, warn};

/// A scan record as read back from storage, before validation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredRecord {
    pub id: Option<String>,
    pub text: Option<String>,
    #[serde(rename = "type")]
    pub barcode_type: Option<String>,
    pub vendor: Option<String>,
    pub checksum_valid: Option<bool>,
    pub user: Option<String>,
    pub session_id: Option<String>,
    pub timestamp: Option<i64>,
    pub format: Option<String>,
    pub region: Option<Region>,
}

fn required<T>(value: Option<T>, index: usize, field: &'static str) -> Result<T> {
    value.ok_or(Error::MalformedRecord { index, field })
}

impl StoredRecord {
    /// Validate into a `ScanRecord`; `index` is the position in the source batch.
    pub fn into_record(self, index: usize) -> Result<ScanRecord> {
        let barcode_type = required(self.barcode_type, index, "type")?
            .parse::<BarcodeType>()
            .map_err(|_| Error::MalformedRecord {
                index,
                field: "type",
            })?;

        Ok(ScanRecord {
            id: required(self.id, index, "id")?,
            text: required(self.text, index, "text")?,
            barcode_type,
            vendor: required(self.vendor, index, "vendor")?,
            checksum_valid: required(self.checksum_valid, index, "checksumValid")?,
            user: required(self.user, index, "user")?,
            session_id: required(self.session_id, index, "sessionId")?,
            timestamp: required(self.timestamp, index, "timestamp")?,
            format: required(self.format, index, "format")?,
            region: self.region,
        })
    }
}

/// Records restored from storage plus the per-record failures that were skipped.
#[derive(Debug, Default)]
pub struct LoadReport {
    pub log: ScanLog,
    pub skipped: Vec<Error>,
}

/// Rebuild a log from stored rows, skipping malformed ones and repeated ids.
pub fn rehydrate<I>(items: I) -> LoadReport
where
    I: IntoIterator<Item = Result<StoredRecord>>,
{
    let mut report = LoadReport::default();

    for (index, item) in items.into_iter().enumerate() {
        let outcome = item
            .and_then(|stored| stored.into_record(index))
            .and_then(|record| report.log.append(record));
        if let Err(e) = outcome {
            warn!("Skipping persisted record: {}", e);
            report.skipped.push(e);
        }
    }

    info!(
        "Restored {} scan records ({} skipped)",
        report.log.len(),
        report.skipped.len()
    );
    report
}

/// Serialize records to a JSON array, field names matching the persisted form.
pub fn records_to_json(records: &[ScanRecord]) -> Result<String> {
    Ok(serde_json::to_string_pretty(records)?)
}

/// Parse a JSON array of records. A document that is not an array is an
/// error; individual bad entries are skipped.
pub fn records_from_json(json: &str) -> Result<LoadReport> {
    let values: Vec<Value> = serde_json::from_str(json)?;
    let items = values.into_iter().enumerate().map(|(index, value)| {
        serde_json::from_value::<StoredRecord>(value).map_err(|_| Error::MalformedRecord {
            index,
            field: "record",
        })
    });
    Ok(rehydrate(items))
}

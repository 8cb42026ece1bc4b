use crate::error::Result;
use crate::record::ScanRecord;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use std::io::Write;
use tracing::{debug, warn};

pub const CSV_HEADER: [&str; 7] = [
    "Timestamp",
    "Type",
    "Value",
    "Vendor",
    "User",
    "Session ID",
    "Checksum Valid",
];

/// Epoch milliseconds as ISO-8601 UTC with millisecond precision.
/// Out-of-range values render empty and are logged.
pub fn iso_timestamp(millis: i64) -> String {
    match DateTime::<Utc>::from_timestamp_millis(millis) {
        Some(dt) => dt.to_rfc3339_opts(SecondsFormat::Millis, true),
        None => {
            warn!("Timestamp {} is out of range; exported as blank", millis);
            String::new()
        }
    }
}

/// Write records as CSV, one row per record, header first.
pub fn write_csv<W: Write>(records: &[ScanRecord], writer: W) -> Result<usize> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(CSV_HEADER)?;
    for record in records {
        wtr.write_record([
            iso_timestamp(record.timestamp).as_str(),
            record.barcode_type.as_str(),
            record.text.as_str(),
            record.vendor.as_str(),
            record.user.as_str(),
            record.session_id.as_str(),
            if record.checksum_valid { "Yes" } else { "No" },
        ])?;
    }
    wtr.flush()?;
    debug!("Exported {} records as CSV", records.len());
    Ok(records.len())
}

/// Row shape pushed to the spreadsheet sync endpoint.
///
/// Device identifiers land in `imei_meid`, retail codes in `upc`; the other
/// column is left empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncRow {
    pub timestamp: String,
    pub imei_meid: String,
    pub upc: String,
    pub vendor: String,
    pub user: String,
    pub session_id: String,
    pub barcode_type: String,
}

pub fn to_sync_row(record: &ScanRecord) -> SyncRow {
    let routed = |matches: bool| {
        if matches {
            record.text.clone()
        } else {
            String::new()
        }
    };

    SyncRow {
        timestamp: iso_timestamp(record.timestamp),
        imei_meid: routed(record.barcode_type.is_device_id()),
        upc: routed(record.barcode_type.is_product_code()),
        vendor: record.vendor.clone(),
        user: record.user.clone(),
        session_id: record.session_id.clone(),
        barcode_type: record.barcode_type.to_string(),
    }
}

pub fn to_sync_json(records: &[ScanRecord]) -> Result<String> {
    let rows: Vec<SyncRow> = records.iter().map(to_sync_row).collect();
    Ok(serde_json::to_string_pretty(&rows)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::BarcodeType;

    fn record(text: &str, barcode_type: BarcodeType, vendor: &str) -> ScanRecord {
        ScanRecord {
            id: "r1".to_string(),
            text: text.to_string(),
            barcode_type,
            vendor: vendor.to_string(),
            checksum_valid: true,
            user: "alice".to_string(),
            session_id: "SESS-1".to_string(),
            timestamp: 1_700_000_000_000,
            format: "CODE_128".to_string(),
            region: None,
        }
    }

    #[test]
    fn test_iso_timestamp() {
        assert_eq!(iso_timestamp(0), "1970-01-01T00:00:00.000Z");
        assert_eq!(iso_timestamp(1_700_000_000_123), "2023-11-14T22:13:20.123Z");
        assert_eq!(iso_timestamp(i64::MAX), "");
        assert_eq!(iso_timestamp(i64::MIN), "");
    }

    #[test]
    fn test_sync_routing() {
        let imei = to_sync_row(&record("356938035643809", BarcodeType::Imei, "Samsung"));
        assert_eq!(imei.imei_meid, "356938035643809");
        assert_eq!(imei.upc, "");
        assert_eq!(imei.barcode_type, "IMEI");

        let meid = to_sync_row(&record("a0000012345678", BarcodeType::Meid, "Unknown"));
        assert_eq!(meid.imei_meid, "a0000012345678");
        assert_eq!(meid.upc, "");

        for (text, t) in [
            ("036000291452", BarcodeType::UpcA),
            ("01234565", BarcodeType::UpcE),
            ("4006381333931", BarcodeType::Ean13),
        ] {
            let row = to_sync_row(&record(text, t, "Product"));
            assert_eq!(row.imei_meid, "");
            assert_eq!(row.upc, text);
        }
    }

    #[test]
    fn test_sync_json_field_names() {
        let json = to_sync_json(&[record("036000291452", BarcodeType::UpcA, "Product")]).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let row = &value[0];
        assert_eq!(row["timestamp"], "2023-11-14T22:13:20.000Z");
        assert_eq!(row["upc"], "036000291452");
        assert_eq!(row["imei_meid"], "");
        assert_eq!(row["session_id"], "SESS-1");
        assert_eq!(row["barcode_type"], "UPC-A");
    }

    #[test]
    fn test_write_csv() {
        let mut buf = Vec::new();
        let mut bad = record("356938035643800", BarcodeType::Imei, "Samsung");
        bad.checksum_valid = false;
        let count = write_csv(
            &[record("036000291452", BarcodeType::UpcA, "Product"), bad],
            &mut buf,
        )
        .unwrap();
        assert_eq!(count, 2);

        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines[0],
            "Timestamp,Type,Value,Vendor,User,Session ID,Checksum Valid"
        );
        assert_eq!(
            lines[1],
            "2023-11-14T22:13:20.000Z,UPC-A,036000291452,Product,alice,SESS-1,Yes"
        );
        assert_eq!(
            lines[2],
            "2023-11-14T22:13:20.000Z,IMEI,356938035643800,Samsung,alice,SESS-1,No"
        );
    }
}

use scan_intake_core::storage::Database;
use scan_intake_core::{BarcodeType, DuplicateHandling, Error, Region, ScanRecord};
use tempfile::tempdir;

fn make_test_record(id: &str, text: &str, barcode_type: BarcodeType, timestamp: i64) -> ScanRecord {
    ScanRecord {
        id: id.to_string(),
        text: text.to_string(),
        barcode_type,
        vendor: "Product".to_string(),
        checksum_valid: true,
        user: "tester".to_string(),
        session_id: "SESS-1700000000000-abcdef".to_string(),
        timestamp,
        format: "EAN_13".to_string(),
        region: None,
    }
}

#[test]
fn test_insert_and_load_records() {
    let db = Database::open_in_memory().unwrap();
    let mut with_region = make_test_record("b", "4006381333931", BarcodeType::Ean13, 2);
    with_region.region = Some(Region {
        x: 12.5,
        y: 40.0,
        width: 220.0,
        height: 64.0,
    });
    let records = vec![
        make_test_record("a", "036000291452", BarcodeType::UpcA, 1),
        with_region,
    ];
    for record in &records {
        db.insert_record(record).unwrap();
    }

    let report = db.load_records().unwrap();
    assert!(report.skipped.is_empty());
    assert_eq!(report.log.records(), records.as_slice());
}

#[test]
fn test_save_records_replaces_contents() {
    let db = Database::open_in_memory().unwrap();
    db.insert_record(&make_test_record("old", "01234565", BarcodeType::UpcE, 1))
        .unwrap();

    let records = vec![
        make_test_record("x", "036000291452", BarcodeType::UpcA, 10),
        make_test_record("y", "4006381333931", BarcodeType::Ean13, 11),
    ];
    assert_eq!(db.save_records(&records).unwrap(), 2);

    let report = db.load_records().unwrap();
    assert_eq!(report.log.records(), records.as_slice());
}

#[test]
fn test_insert_rejects_duplicate_id() {
    let db = Database::open_in_memory().unwrap();
    let record = make_test_record("a", "036000291452", BarcodeType::UpcA, 1);
    db.insert_record(&record).unwrap();
    assert!(db.insert_record(&record).is_err());
}

#[test]
fn test_delete_and_clear() {
    let db = Database::open_in_memory().unwrap();
    db.insert_record(&make_test_record("a", "036000291452", BarcodeType::UpcA, 1))
        .unwrap();
    db.insert_record(&make_test_record("b", "4006381333931", BarcodeType::Ean13, 2))
        .unwrap();

    assert!(db.delete_record("a").unwrap());
    assert!(!db.delete_record("a").unwrap());
    assert_eq!(db.load_records().unwrap().log.len(), 1);

    assert_eq!(db.clear_records().unwrap(), 1);
    assert!(db.load_records().unwrap().log.is_empty());
}

#[test]
fn test_malformed_rows_are_skipped() {
    let db = Database::open_in_memory().unwrap();
    db.insert_record(&make_test_record("good", "036000291452", BarcodeType::UpcA, 1))
        .unwrap();

    // row missing its session id
    db.connection()
        .execute(
            "INSERT INTO scan_record (id, text, barcode_type, vendor, checksum_valid, user, \
             timestamp, format) VALUES ('no-session', '01234565', 'UPC-E', 'Product', 1, 'u', 2, 'UPC_E')",
            [],
        )
        .unwrap();
    // row with an unknown type
    db.connection()
        .execute(
            "INSERT INTO scan_record (id, text, barcode_type, vendor, checksum_valid, user, \
             session_id, timestamp, format) \
             VALUES ('bad-type', 'hello', 'QR', 'Unknown', 0, 'u', 'S', 3, 'QR_CODE')",
            [],
        )
        .unwrap();
    // timestamp stored as text
    db.connection()
        .execute(
            "INSERT INTO scan_record (id, text, barcode_type, vendor, checksum_valid, user, \
             session_id, timestamp, format) \
             VALUES ('bad-ts', '4006381333931', 'EAN-13', 'Product', 1, 'u', 'S', 'yesterday', 'EAN_13')",
            [],
        )
        .unwrap();

    let report = db.load_records().unwrap();
    assert_eq!(report.log.len(), 1);
    assert_eq!(report.log.records()[0].id, "good");
    assert_eq!(report.skipped.len(), 3);
    assert!(matches!(
        report.skipped[0],
        Error::MalformedRecord {
            index: 1,
            field: "sessionId"
        }
    ));
    assert!(matches!(
        report.skipped[1],
        Error::MalformedRecord {
            index: 2,
            field: "type"
        }
    ));
    assert!(matches!(
        report.skipped[2],
        Error::MalformedRecord {
            index: 3,
            field: "timestamp"
        }
    ));
}

#[test]
fn test_load_session_and_list_sessions() {
    let db = Database::open_in_memory().unwrap();
    let mut a = make_test_record("a", "036000291452", BarcodeType::UpcA, 100);
    a.session_id = "SESS-A".to_string();
    let mut b = make_test_record("b", "4006381333931", BarcodeType::Ean13, 200);
    b.session_id = "SESS-B".to_string();
    b.checksum_valid = false;
    let mut c = make_test_record("c", "01234565", BarcodeType::UpcE, 300);
    c.session_id = "SESS-B".to_string();
    db.save_records(&[a, b, c]).unwrap();

    let session_b = db.load_session("SESS-B").unwrap();
    assert_eq!(session_b.log.len(), 2);

    let sessions = db.list_sessions().unwrap();
    assert_eq!(sessions.len(), 2);
    assert_eq!(sessions[0].session_id, "SESS-B");
    assert_eq!(sessions[0].record_count, 2);
    assert_eq!(sessions[0].valid_count, 1);
    assert_eq!(sessions[0].first_scan, 200);
    assert_eq!(sessions[0].last_scan, 300);
    assert_eq!(sessions[1].session_id, "SESS-A");

    assert_eq!(db.clear_session("SESS-B").unwrap(), 2);
    assert_eq!(db.load_records().unwrap().log.len(), 1);
}

#[test]
fn test_duplicate_handling_setting() {
    let db = Database::open_in_memory().unwrap();
    assert_eq!(db.get_duplicate_handling().unwrap(), None);

    db.set_duplicate_handling(DuplicateHandling::Allow).unwrap();
    assert_eq!(
        db.get_duplicate_handling().unwrap(),
        Some(DuplicateHandling::Allow)
    );

    db.set_duplicate_handling(DuplicateHandling::Block).unwrap();
    assert_eq!(
        db.get_duplicate_handling().unwrap(),
        Some(DuplicateHandling::Block)
    );

    db.set_setting("duplicate_handling", "sometimes").unwrap();
    assert_eq!(db.get_duplicate_handling().unwrap(), None);
}

#[test]
fn test_records_survive_reopen() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("intake.db");
    let path = path.to_str().unwrap();

    {
        let db = Database::open(path).unwrap();
        db.insert_record(&make_test_record("a", "036000291452", BarcodeType::UpcA, 1))
            .unwrap();
        db.set_duplicate_handling(DuplicateHandling::Allow).unwrap();
    }

    let db = Database::open(path).unwrap();
    assert_eq!(db.load_records().unwrap().log.len(), 1);
    assert_eq!(
        db.get_duplicate_handling().unwrap(),
        Some(DuplicateHandling::Allow)
    );
}

#[test]
fn test_truncate_all() {
    let db = Database::open_in_memory().unwrap();
    db.insert_record(&make_test_record("a", "036000291452", BarcodeType::UpcA, 1))
        .unwrap();
    db.set_duplicate_handling(DuplicateHandling::Allow).unwrap();

    db.truncate_all().unwrap();
    assert!(db.load_records().unwrap().log.is_empty());
    assert_eq!(db.get_duplicate_handling().unwrap(), None);
}

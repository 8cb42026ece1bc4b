use super::models::SessionSummary;
use super::sqlite::Database;
use crate::dedupe::DuplicateHandling;
use crate::error::Error;
use crate::persist::{self, LoadReport, StoredRecord};
use crate::record::{Region, ScanRecord};
use rusqlite::types::FromSql;
use rusqlite::{params, Result, Row, Transaction};
use tracing::{debug, warn};

const DUPLICATE_HANDLING_KEY: &str = "duplicate_handling";

const RECORD_COLUMNS: &str = "id, text, barcode_type, vendor, checksum_valid, user, session_id, \
                              timestamp, format, region_x, region_y, region_width, region_height";

fn insert_in(tx: &Transaction<'_>, record: &ScanRecord) -> Result<usize> {
    let mut stmt = tx.prepare_cached(
        "INSERT INTO scan_record \
         (id, text, barcode_type, vendor, checksum_valid, user, session_id, \
          timestamp, format, region_x, region_y, region_width, region_height) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
    )?;
    let region = record.region;
    stmt.execute(params![
        record.id,
        record.text,
        record.barcode_type.as_str(),
        record.vendor,
        record.checksum_valid,
        record.user,
        record.session_id,
        record.timestamp,
        record.format,
        region.map(|r| r.x),
        region.map(|r| r.y),
        region.map(|r| r.width),
        region.map(|r| r.height),
    ])
}

/// Read one nullable column. Type mismatches mark the row malformed; other
/// failures are real database errors.
fn column<T: FromSql>(
    row: &Row<'_>,
    idx: usize,
    index: usize,
    field: &'static str,
) -> Result<Option<T>, Error> {
    match row.get::<_, Option<T>>(idx) {
        Ok(value) => Ok(value),
        Err(rusqlite::Error::InvalidColumnType(..))
        | Err(rusqlite::Error::FromSqlConversionFailure(..))
        | Err(rusqlite::Error::IntegralValueOutOfRange(..)) => {
            Err(Error::MalformedRecord { index, field })
        }
        Err(e) => Err(Error::Database(e)),
    }
}

fn stored_from_row(row: &Row<'_>, index: usize) -> Result<StoredRecord, Error> {
    let x: Option<f64> = column(row, 9, index, "region")?;
    let y: Option<f64> = column(row, 10, index, "region")?;
    let width: Option<f64> = column(row, 11, index, "region")?;
    let height: Option<f64> = column(row, 12, index, "region")?;
    let region = match (x, y, width, height) {
        (Some(x), Some(y), Some(width), Some(height)) => Some(Region {
            x,
            y,
            width,
            height,
        }),
        _ => None,
    };

    Ok(StoredRecord {
        id: column(row, 0, index, "id")?,
        text: column(row, 1, index, "text")?,
        barcode_type: column(row, 2, index, "type")?,
        vendor: column(row, 3, index, "vendor")?,
        checksum_valid: column(row, 4, index, "checksumValid")?,
        user: column(row, 5, index, "user")?,
        session_id: column(row, 6, index, "sessionId")?,
        timestamp: column(row, 7, index, "timestamp")?,
        format: column(row, 8, index, "format")?,
        region,
    })
}

impl Database {
    // ── Scan Records ─────────────────────────────────────────────

    pub fn insert_record(&self, record: &ScanRecord) -> Result<()> {
        let tx = self.connection().unchecked_transaction()?;
        insert_in(&tx, record)?;
        tx.commit()?;
        debug!("Stored record {} ({})", record.id, record.text);
        Ok(())
    }

    /// Replace every stored record with `records`, in one transaction.
    pub fn save_records(&self, records: &[ScanRecord]) -> Result<usize> {
        let tx = self.connection().unchecked_transaction()?;
        tx.execute("DELETE FROM scan_record", [])?;
        let mut count = 0;
        for record in records {
            count += insert_in(&tx, record)?;
        }
        tx.commit()?;
        debug!("Saved {} scan records", count);
        Ok(count)
    }

    pub fn delete_record(&self, id: &str) -> Result<bool> {
        let removed = self
            .connection()
            .execute("DELETE FROM scan_record WHERE id = ?1", params![id])?;
        Ok(removed > 0)
    }

    pub fn clear_records(&self) -> Result<usize> {
        let removed = self.connection().execute("DELETE FROM scan_record", [])?;
        debug!("Cleared {} stored records", removed);
        Ok(removed)
    }

    pub fn clear_session(&self, session_id: &str) -> Result<usize> {
        self.connection().execute(
            "DELETE FROM scan_record WHERE session_id = ?1",
            params![session_id],
        )
    }

    /// Load every stored record in insertion order. Incomplete rows are
    /// skipped and listed in the report.
    pub fn load_records(&self) -> Result<LoadReport, Error> {
        self.load_where("", params![])
    }

    pub fn load_session(&self, session_id: &str) -> Result<LoadReport, Error> {
        self.load_where("WHERE session_id = ?1", params![session_id])
    }

    fn load_where(&self, filter: &str, args: &[&dyn rusqlite::ToSql]) -> Result<LoadReport, Error> {
        let sql = format!(
            "SELECT {} FROM scan_record {} ORDER BY seq",
            RECORD_COLUMNS, filter
        );
        let mut stmt = self.connection().prepare(&sql)?;
        let mut rows = stmt.query(args)?;

        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            let index = items.len();
            let item = match stored_from_row(row, index) {
                Err(Error::Database(e)) => return Err(Error::Database(e)),
                other => other,
            };
            items.push(item);
        }
        Ok(persist::rehydrate(items))
    }

    pub fn list_sessions(&self) -> Result<Vec<SessionSummary>> {
        let mut stmt = self.connection().prepare(
            "SELECT session_id, MAX(user), COUNT(*), \
                    COALESCE(SUM(checksum_valid), 0), MIN(timestamp), MAX(timestamp) \
             FROM scan_record \
             WHERE session_id IS NOT NULL AND user IS NOT NULL AND timestamp IS NOT NULL \
             GROUP BY session_id \
             ORDER BY MAX(timestamp) DESC",
        )?;
        let sessions = stmt
            .query_map([], |row| {
                Ok(SessionSummary {
                    session_id: row.get(0)?,
                    user: row.get(1)?,
                    record_count: row.get(2)?,
                    valid_count: row.get(3)?,
                    first_scan: row.get(4)?,
                    last_scan: row.get(5)?,
                })
            })?
            .collect::<Result<Vec<_>>>()?;
        Ok(sessions)
    }

    // ── Settings ─────────────────────────────────────────────────

    pub fn get_setting(&self, key: &str) -> Result<Option<String>> {
        match self.connection().query_row(
            "SELECT value FROM setting WHERE key = ?1",
            params![key],
            |row| row.get(0),
        ) {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub fn set_setting(&self, key: &str, value: &str) -> Result<()> {
        self.connection().execute(
            "INSERT INTO setting (key, value) VALUES (?1, ?2) \
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }

    /// Saved duplicate policy, if any. An unreadable value is ignored.
    pub fn get_duplicate_handling(&self) -> Result<Option<DuplicateHandling>> {
        Ok(self
            .get_setting(DUPLICATE_HANDLING_KEY)?
            .and_then(|value| match value.parse() {
                Ok(policy) => Some(policy),
                Err(e) => {
                    warn!("Ignoring saved setting: {}", e);
                    None
                }
            }))
    }

    pub fn set_duplicate_handling(&self, policy: DuplicateHandling) -> Result<()> {
        self.set_setting(DUPLICATE_HANDLING_KEY, policy.as_str())
    }
}

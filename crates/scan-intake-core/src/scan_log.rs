use crate::error::{Error, Result};
use crate::record::ScanRecord;
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

/// Ordered log of accepted scans for one session, in detection order.
///
/// Ids are unique within the log. Text is not: whether repeated codes may
/// coexist is decided by the duplicate policy before `append`.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ScanLog {
    records: Vec<ScanRecord>,
    ids: HashSet<String>,
}

impl ScanLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, record: ScanRecord) -> Result<()> {
        if self.ids.contains(&record.id) {
            return Err(Error::DuplicateId(record.id));
        }
        self.ids.insert(record.id.clone());
        self.records.push(record);
        Ok(())
    }

    /// Number of records whose check digit verified.
    pub fn valid_count(&self) -> usize {
        self.records.iter().filter(|r| r.checksum_valid).count()
    }

    /// Up to `n` records, newest timestamp first. Records sharing a
    /// timestamp come back latest-inserted first.
    pub fn recent(&self, n: usize) -> Vec<ScanRecord> {
        let mut sorted: Vec<&ScanRecord> = self.records.iter().rev().collect();
        sorted.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        sorted.into_iter().take(n).cloned().collect()
    }

    pub fn delete_by_id(&mut self, id: &str) -> bool {
        if !self.ids.remove(id) {
            return false;
        }
        self.records.retain(|r| r.id != id);
        true
    }

    pub fn clear(&mut self) {
        self.records.clear();
        self.ids.clear();
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[ScanRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ScanRecord> {
        self.records.iter()
    }
}

impl<'a> IntoIterator for &'a ScanLog {
    type Item = &'a ScanRecord;
    type IntoIter = std::slice::Iter<'a, ScanRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// A `ScanLog` behind a single mutex, for hosts that feed detections from
/// more than one thread.
///
/// Readers never observe a half-appended record. Two threads racing on the
/// same code may both pass their duplicate check before either appends; the
/// later append wins and both records are kept.
#[derive(Debug, Clone, Default)]
pub struct SharedScanLog {
    inner: Arc<Mutex<ScanLog>>,
}

impl SharedScanLog {
    pub fn new(log: ScanLog) -> Self {
        Self {
            inner: Arc::new(Mutex::new(log)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ScanLog> {
        // Every mutation leaves the log consistent, so a poisoned lock is still usable.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Run `f` against the log while holding the lock.
    pub fn read<R>(&self, f: impl FnOnce(&ScanLog) -> R) -> R {
        f(&self.lock())
    }

    pub fn append(&self, record: ScanRecord) -> Result<()> {
        let mut log = self.lock();
        log.append(record)?;
        debug!("Scan log now holds {} records", log.len());
        Ok(())
    }

    pub fn delete_by_id(&self, id: &str) -> bool {
        self.lock().delete_by_id(id)
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn valid_count(&self) -> usize {
        self.lock().valid_count()
    }

    pub fn recent(&self, n: usize) -> Vec<ScanRecord> {
        self.lock().recent(n)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Copy of every record in detection order.
    pub fn snapshot(&self) -> Vec<ScanRecord> {
        self.lock().records().to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::BarcodeType;

    fn record(id: &str, text: &str, timestamp: i64, checksum_valid: bool) -> ScanRecord {
        ScanRecord {
            id: id.to_string(),
            text: text.to_string(),
            barcode_type: BarcodeType::Imei,
            vendor: "Samsung".to_string(),
            checksum_valid,
            user: "tester".to_string(),
            session_id: "SESS-1".to_string(),
            timestamp,
            format: "CODE_128".to_string(),
            region: None,
        }
    }

    #[test]
    fn test_append_rejects_duplicate_id() {
        let mut log = ScanLog::new();
        log.append(record("a", "356938035643809", 1, true)).unwrap();
        let err = log.append(record("a", "490154203237518", 2, true)).unwrap_err();
        assert!(matches!(err, Error::DuplicateId(ref id) if id == "a"));
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_same_text_different_ids_coexist() {
        let mut log = ScanLog::new();
        log.append(record("a", "356938035643809", 1, true)).unwrap();
        log.append(record("b", "356938035643809", 2, true)).unwrap();
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn test_recent_orders_by_timestamp() {
        let mut log = ScanLog::new();
        log.append(record("a", "1", 100, true)).unwrap();
        log.append(record("b", "2", 300, true)).unwrap();
        log.append(record("c", "3", 200, true)).unwrap();
        log.append(record("d", "4", 300, true)).unwrap();

        let ids: Vec<String> = log.recent(3).into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["d", "b", "c"]);
        assert_eq!(log.recent(10).len(), 4);
        assert!(log.recent(0).is_empty());
    }

    #[test]
    fn test_valid_count_and_delete() {
        let mut log = ScanLog::new();
        log.append(record("a", "1", 1, true)).unwrap();
        log.append(record("b", "2", 2, false)).unwrap();
        log.append(record("c", "3", 3, true)).unwrap();
        assert_eq!(log.valid_count(), 2);

        assert!(log.delete_by_id("a"));
        assert!(!log.delete_by_id("a"));
        assert_eq!(log.valid_count(), 1);
        assert!(!log.contains_id("a"));

        // a deleted id may be appended again
        log.append(record("a", "1", 4, true)).unwrap();
        assert_eq!(log.len(), 3);
    }

    #[test]
    fn test_clear() {
        let mut log = ScanLog::new();
        log.append(record("a", "1", 1, true)).unwrap();
        log.clear();
        assert!(log.is_empty());
        assert_eq!(log.valid_count(), 0);
        log.append(record("a", "1", 1, true)).unwrap();
    }

    #[test]
    fn test_shared_log_across_threads() {
        let shared = SharedScanLog::default();
        let handles: Vec<_> = (0..4)
            .map(|t| {
                let shared = shared.clone();
                std::thread::spawn(move || {
                    for i in 0..25 {
                        let id = format!("t{}-{}", t, i);
                        shared.append(record(&id, &id, i, true)).unwrap();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(shared.len(), 100);
        assert_eq!(shared.read(|log| log.valid_count()), 100);
    }
}

use crate::classify::{self, BarcodeType};
use crate::dedupe::{self, DuplicateHandling};
use crate::error::Error;
use crate::progress::ScanReporter;
use crate::record::{Clock, Detection, IdSource, RecordFactory, ScanRecord, SystemClock};
use crate::scan_log::{ScanLog, SharedScanLog};
use crate::session::{SessionContext, SessionCounters};
use std::sync::Mutex;
use tracing::{debug, info, warn};

/// What happened to one detection.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Accepted(ScanRecord),
    /// Already in the log under the `block` policy; dropped.
    Duplicate { text: String, barcode_type: BarcodeType },
    /// Text matched no known identifier shape; dropped.
    Rejected { text: String },
}

pub struct IntakeEngine {
    context: SessionContext,
    policy: DuplicateHandling,
    log: SharedScanLog,
    counters: Mutex<SessionCounters>,
    factory: RecordFactory,
    clock: Box<dyn Clock>,
}

impl IntakeEngine {
    pub fn new(context: SessionContext, policy: DuplicateHandling) -> Self {
        Self {
            context,
            policy,
            log: SharedScanLog::default(),
            counters: Mutex::new(SessionCounters::default()),
            factory: RecordFactory::default(),
            clock: Box::new(SystemClock),
        }
    }

    /// Start from previously persisted records.
    pub fn with_log(mut self, log: ScanLog) -> Self {
        self.log = SharedScanLog::new(log);
        self
    }

    pub fn with_id_source(mut self, ids: Box<dyn IdSource>) -> Self {
        self.factory = RecordFactory::new(ids);
        self
    }

    pub fn with_clock(mut self, clock: Box<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn context(&self) -> &SessionContext {
        &self.context
    }

    pub fn policy(&self) -> DuplicateHandling {
        self.policy
    }

    pub fn set_policy(&mut self, policy: DuplicateHandling) {
        info!("Duplicate handling set to '{}'", policy);
        self.policy = policy;
    }

    pub fn log(&self) -> &SharedScanLog {
        &self.log
    }

    pub fn counters(&self) -> SessionCounters {
        *self.counters.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn bump(&self, f: impl FnOnce(&mut SessionCounters)) {
        let mut counters = self.counters.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut *counters);
    }

    /// Run one detection through classify → duplicate check → create → append.
    ///
    /// Only the append can fail, and only if the id source repeats itself.
    pub fn process(
        &self,
        detection: &Detection,
        reporter: &dyn ScanReporter,
    ) -> Result<Outcome, Error> {
        let classification = classify::classify(&detection.text);
        let text = detection.text.trim();

        if !classification.is_valid {
            debug!("Ignoring unrecognised code {:?}", text);
            self.bump(|c| c.rejected += 1);
            reporter.on_rejected(text);
            return Ok(Outcome::Rejected {
                text: text.to_string(),
            });
        }

        let policy = self.policy;
        let duplicate = self
            .log
            .read(|log| dedupe::is_duplicate(text, log, policy));
        if duplicate {
            warn!("Duplicate {} scan ignored: {}", classification.barcode_type, text);
            self.bump(|c| c.duplicates += 1);
            reporter.on_duplicate(text);
            return Ok(Outcome::Duplicate {
                text: text.to_string(),
                barcode_type: classification.barcode_type,
            });
        }

        let now = detection
            .timestamp
            .unwrap_or_else(|| self.clock.now_millis());
        let record = self
            .factory
            .create(&classification, detection, &self.context, now);
        self.log.append(record.clone())?;
        self.bump(|c| c.accepted += 1);

        debug!(
            "Accepted {} {} (vendor: {}, checksum valid: {})",
            record.barcode_type, record.text, record.vendor, record.checksum_valid
        );
        reporter.on_accepted(&record);
        Ok(Outcome::Accepted(record))
    }

    pub fn delete(&self, id: &str) -> bool {
        let removed = self.log.delete_by_id(id);
        if removed {
            debug!("Deleted record {}", id);
        }
        removed
    }

    /// Empty the log and zero the counters. Returns the number of records removed.
    pub fn reset(&self, reporter: &dyn ScanReporter) -> usize {
        let removed = self.log.len();
        self.log.clear();
        self.bump(SessionCounters::reset);
        info!(
            "Cleared {} records from session {}",
            removed, self.context.session_id
        );
        reporter.on_cleared(removed);
        removed
    }
}

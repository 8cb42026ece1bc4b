pub mod classify;
pub mod config;
pub mod dedupe;
pub mod engine;
pub mod error;
pub mod export;
pub mod persist;
pub mod progress;
pub mod record;
pub mod scan_log;
pub mod session;
pub mod storage;

pub use classify::{classify, BarcodeType, Classification};
pub use crate::config::AppConfig;
pub use dedupe::{is_duplicate, DuplicateHandling};
pub use engine::{IntakeEngine, Outcome};
pub use error::Error;
pub use progress::{ScanReporter, SilentReporter};
pub use record::{Detection, Region, ScanRecord};
pub use scan_log::{ScanLog, SharedScanLog};
pub use session::{SessionContext, SessionCounters};

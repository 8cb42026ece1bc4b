/// Per-session roll-up of stored scan records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    pub session_id: String,
    pub user: String,
    pub record_count: i64,
    pub valid_count: i64,
    /// Epoch milliseconds of the earliest and latest scan.
    pub first_scan: i64,
    pub last_scan: i64,
}

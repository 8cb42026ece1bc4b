use crate::record::ScanRecord;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Session policy for repeated scans of the same code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicateHandling {
    #[default]
    Block,
    Allow,
}

impl DuplicateHandling {
    pub fn as_str(&self) -> &'static str {
        match self {
            DuplicateHandling::Block => "block",
            DuplicateHandling::Allow => "allow",
        }
    }
}

impl fmt::Display for DuplicateHandling {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for DuplicateHandling {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "block" => Ok(DuplicateHandling::Block),
            "allow" => Ok(DuplicateHandling::Allow),
            other => Err(format!(
                "invalid duplicate handling '{}', expected 'block' or 'allow'",
                other
            )),
        }
    }
}

/// Whether `text` has already been recorded under the given policy.
///
/// Comparison is exact and case-sensitive against each record's stored text.
pub fn is_duplicate<'a, I>(text: &str, records: I, policy: DuplicateHandling) -> bool
where
    I: IntoIterator<Item = &'a ScanRecord>,
{
    match policy {
        DuplicateHandling::Allow => false,
        DuplicateHandling::Block => records.into_iter().any(|r| r.text == text),
    }
}

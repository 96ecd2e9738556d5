//! Human-facing document numbers (`PO-2026-0007`).

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

/// Business document number: `PREFIX-YYYY-NNNN`.
///
/// The sequence is allocated by the store; this type only formats it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentNumber(String);

impl DocumentNumber {
    pub fn format(prefix: &str, at: DateTime<Utc>, sequence: u64) -> Self {
        Self(format!("{prefix}-{:04}-{sequence:04}", at.year()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for DocumentNumber {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn formats_prefix_year_and_padded_sequence() {
        let at = Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap();
        assert_eq!(DocumentNumber::format("PO", at, 7).as_str(), "PO-2026-0007");
        assert_eq!(DocumentNumber::format("AP", at, 12345).as_str(), "AP-2026-12345");
    }
}

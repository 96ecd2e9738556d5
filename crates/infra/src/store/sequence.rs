use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Datelike, Utc};
use tradeerp_core::DocumentNumber;

/// Document number sequences, one counter per prefix and year.
///
/// Like database sequences these are not transactional: a number taken by a
/// rolled-back transaction is not reused.
#[derive(Debug, Default)]
pub struct Sequences {
    counters: Mutex<HashMap<(&'static str, i32), u64>>,
}

impl Sequences {
    pub fn next(&self, prefix: &'static str, at: DateTime<Utc>) -> DocumentNumber {
        let mut counters = self.counters.lock().unwrap_or_else(PoisonError::into_inner);
        let counter = counters.entry((prefix, at.year())).or_insert(0);
        *counter += 1;
        DocumentNumber::format(prefix, at, *counter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn counters_are_per_prefix_and_year() {
        let seq = Sequences::default();
        let y26 = Utc.with_ymd_and_hms(2026, 5, 1, 0, 0, 0).unwrap();
        let y27 = Utc.with_ymd_and_hms(2027, 1, 1, 0, 0, 0).unwrap();

        assert_eq!(seq.next("PO", y26).as_str(), "PO-2026-0001");
        assert_eq!(seq.next("PO", y26).as_str(), "PO-2026-0002");
        assert_eq!(seq.next("AP", y26).as_str(), "AP-2026-0001");
        assert_eq!(seq.next("PO", y27).as_str(), "PO-2027-0001");
    }
}

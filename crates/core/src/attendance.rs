//! Attendance aggregation.
//!
//! Totals are derived on demand from the full response collection and never
//! persisted.

use serde::{Deserialize, Serialize};

use crate::record::RsvpRecord;

/// A guest's attendance answer, as read from the free-form `isComing` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attendance {
    Yes,
    No,
    /// Absent or any answer other than exactly `"yes"` / `"no"`.
    Undecided,
}

impl Attendance {
    pub fn from_answer(answer: Option<&str>) -> Self {
        match answer {
            Some("yes") => Attendance::Yes,
            Some("no") => Attendance::No,
            _ => Attendance::Undecided,
        }
    }
}

/// Yes/no attendance counts.
///
/// `yes + no` never exceeds the number of records it was computed from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceTotals {
    pub yes: u64,
    pub no: u64,
}

impl AttendanceTotals {
    /// Reduce a collection to its totals. Total over any input, including empty.
    pub fn compute(records: &[RsvpRecord]) -> Self {
        records
            .iter()
            .fold(Self::default(), |mut totals, record| {
                match record.attendance() {
                    Attendance::Yes => totals.yes += 1,
                    Attendance::No => totals.no += 1,
                    Attendance::Undecided => {}
                }
                totals
            })
    }

    pub fn answered(&self) -> u64 {
        self.yes + self.no
    }
}

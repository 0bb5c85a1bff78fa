use std::collections::BTreeSet;
use std::str::FromStr;

use chrono::Datelike;

use crate::model::attendance::{AttendanceRecord, LeaveStatus};

/// Leave type selector of the attendance list: everything, or one type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(LeaveStatus),
}

impl StatusFilter {
    pub fn matches(&self, status: LeaveStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(wanted) => *wanted == status,
        }
    }
}

impl FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("all") {
            return Ok(StatusFilter::All);
        }
        s.parse::<LeaveStatus>()
            .map(StatusFilter::Only)
            .map_err(|_| format!("Unknown leave type `{s}`"))
    }
}

impl std::fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StatusFilter::All => f.write_str("all"),
            StatusFilter::Only(status) => write!(f, "{status}"),
        }
    }
}

pub fn filter_records<'a>(
    records: &'a [AttendanceRecord],
    year: i32,
    status: StatusFilter,
) -> impl Iterator<Item = &'a AttendanceRecord> + 'a {
    records
        .iter()
        .filter(move |r| r.date.year() == year && status.matches(r.status))
}

/// Years that have at least one record, newest first.
pub fn years_present(records: &[AttendanceRecord]) -> Vec<i32> {
    records
        .iter()
        .map(|r| r.date.year())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .rev()
        .collect()
}

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

use crate::error::LeaveError;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumString,
    Display,
    ToSchema,
)]
pub enum LeaveStatus {
    Medical,
    Casual,
    Annual,
    Compensatory,
}

/// Attendance row as persisted. `date` and `status` stay textual so that a
/// malformed row surfaces as a validation error instead of a driver error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct AttendanceRow {
    pub id: u64,
    pub user_id: String,
    pub date: String,
    pub status: String,
    pub is_weekend_work: bool,
    pub leave_form_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttendanceRecord {
    pub id: u64,
    pub user_id: String,
    pub date: NaiveDate,
    pub status: LeaveStatus,
    pub is_weekend_work: bool,
    pub leave_form_url: Option<String>,
}

impl AttendanceRecord {
    /// True when this record earns a compensatory day rather than spending one.
    pub fn earns_compensatory(&self) -> bool {
        self.status == LeaveStatus::Compensatory && self.is_weekend_work
    }
}

impl TryFrom<&AttendanceRow> for AttendanceRecord {
    type Error = LeaveError;

    fn try_from(row: &AttendanceRow) -> Result<Self, Self::Error> {
        let date = NaiveDate::parse_from_str(row.date.trim(), DATE_FORMAT).map_err(|e| {
            LeaveError::validation(row.id, format!("unparseable date `{}`: {}", row.date, e))
        })?;

        let status = row
            .status
            .parse::<LeaveStatus>()
            .map_err(|_| LeaveError::validation(row.id, format!("unknown status `{}`", row.status)))?;

        Ok(AttendanceRecord {
            id: row.id,
            user_id: row.user_id.clone(),
            date,
            status,
            is_weekend_work: row.is_weekend_work,
            leave_form_url: row.leave_form_url.clone(),
        })
    }
}

/// One day to be written by natural key (user, date).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAttendance {
    pub date: NaiveDate,
    pub status: LeaveStatus,
    pub is_weekend_work: bool,
    pub leave_form_url: Option<String>,
}

impl NewAttendance {
    /// Weekend work only counts for compensatory days; it is cleared otherwise.
    pub fn new(
        date: NaiveDate,
        status: LeaveStatus,
        worked: bool,
        leave_form_url: Option<String>,
    ) -> Self {
        NewAttendance {
            date,
            status,
            is_weekend_work: status == LeaveStatus::Compensatory && worked,
            leave_form_url: leave_form_url.filter(|u| !u.trim().is_empty()),
        }
    }
}

/// Edit of an existing record. The date is immutable; a `None` form
/// reference keeps whatever was stored before.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttendanceUpdate {
    pub status: LeaveStatus,
    pub is_weekend_work: bool,
    pub leave_form_url: Option<String>,
}

impl AttendanceUpdate {
    pub fn new(status: LeaveStatus, worked: bool, leave_form_url: Option<String>) -> Self {
        AttendanceUpdate {
            status,
            is_weekend_work: status == LeaveStatus::Compensatory && worked,
            leave_form_url: leave_form_url.filter(|u| !u.trim().is_empty()),
        }
    }
}

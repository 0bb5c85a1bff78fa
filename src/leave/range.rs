use chrono::NaiveDate;

use crate::error::LeaveError;

/// Longest span a single log submission may cover.
pub const MAX_RANGE_DAYS: i64 = 366;

/// Every calendar day from `from` to `to`, both inclusive. A missing `to`
/// logs the single day `from`.
pub fn expand_range(from: NaiveDate, to: Option<NaiveDate>) -> Result<Vec<NaiveDate>, LeaveError> {
    let to = to.unwrap_or(from);

    if to < from {
        return Err(LeaveError::InvalidRange(format!(
            "end date {to} is before start date {from}"
        )));
    }

    let span = (to - from).num_days() + 1;
    if span > MAX_RANGE_DAYS {
        return Err(LeaveError::InvalidRange(format!(
            "{span} days exceeds the limit of {MAX_RANGE_DAYS}"
        )));
    }

    Ok(from.iter_days().take_while(|day| *day <= to).collect())
}

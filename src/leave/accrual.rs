//! Leave balance accrual.
//!
//! Yearly categories (medical, casual, annual) count usage inside the target
//! year only. The compensatory balance is a running lifetime figure and
//! ignores the target year entirely.

use std::cmp::Ordering;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::LeaveError;
use crate::model::attendance::{AttendanceRecord, AttendanceRow, LeaveStatus};
use crate::model::leave_balance::{LeaveBalanceConfig, LeaveQuota};

const MONTHS_PER_YEAR: i64 = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AnnualBalance {
    #[schema(example = 6)]
    pub accrued_to_date: i64,
    #[schema(example = 2)]
    pub carry_forward: i64,
    #[schema(example = 8)]
    pub total_available: i64,
    #[schema(example = 8)]
    pub remaining: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CompensatoryBalance {
    #[schema(example = 2)]
    pub earned: i64,
    #[schema(example = 1)]
    pub spent: i64,
    #[schema(example = 1)]
    pub balance: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct BalanceSnapshot {
    #[schema(example = 2025)]
    pub target_year: i32,
    #[schema(example = 8)]
    pub medical_remaining: i64,
    #[schema(example = 6)]
    pub casual_remaining: i64,
    pub annual: AnnualBalance,
    pub compensatory: CompensatoryBalance,
}

/// Annual days accrued for `target_year` as of `today`: a full year for past
/// years, nothing for future ones, and one day per month up to and including
/// the current month otherwise.
pub fn accrued_months(target_year: i32, today: NaiveDate) -> i64 {
    match target_year.cmp(&today.year()) {
        Ordering::Less => MONTHS_PER_YEAR,
        Ordering::Greater => 0,
        Ordering::Equal => i64::from(today.month0()) + 1,
    }
}

/// Validates the raw inputs and computes the snapshot. Fails on the first
/// invalid record or config field; nothing partial is returned.
pub fn compute_balances(
    rows: &[AttendanceRow],
    config: &LeaveBalanceConfig,
    target_year: i32,
    today: NaiveDate,
) -> Result<BalanceSnapshot, LeaveError> {
    let records = rows
        .iter()
        .map(AttendanceRecord::try_from)
        .collect::<Result<Vec<_>, _>>()?;
    let quota = LeaveQuota::try_from(config)?;

    Ok(balances_for(&records, &quota, target_year, today))
}

#[derive(Debug, Default)]
struct YearUsage {
    medical: i64,
    casual: i64,
    annual: i64,
}

pub fn balances_for(
    records: &[AttendanceRecord],
    quota: &LeaveQuota,
    target_year: i32,
    today: NaiveDate,
) -> BalanceSnapshot {
    let mut used = YearUsage::default();
    let mut earned = 0;
    let mut spent = 0;

    for record in records {
        if record.status == LeaveStatus::Compensatory {
            if record.earns_compensatory() {
                earned += 1;
            } else {
                spent += 1;
            }
            continue;
        }

        if record.date.year() != target_year {
            continue;
        }

        match record.status {
            LeaveStatus::Medical => used.medical += 1,
            LeaveStatus::Casual => used.casual += 1,
            LeaveStatus::Annual => used.annual += 1,
            LeaveStatus::Compensatory => {}
        }
    }

    let accrued = accrued_months(target_year, today);
    let total_available = accrued + quota.annual_carry_forward;

    BalanceSnapshot {
        target_year,
        medical_remaining: quota.medical_total - used.medical,
        casual_remaining: quota.casual_total - used.casual,
        annual: AnnualBalance {
            accrued_to_date: accrued,
            carry_forward: quota.annual_carry_forward,
            total_available,
            remaining: total_available - used.annual,
        },
        compensatory: CompensatoryBalance {
            earned,
            spent,
            balance: earned - spent,
        },
    }
}

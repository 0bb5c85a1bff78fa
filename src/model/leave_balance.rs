use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::error::LeaveError;

/// Per-user quota settings as stored. Any total may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct LeaveBalanceConfig {
    pub user_id: String,
    #[schema(example = 8, nullable = true)]
    pub casual_total: Option<i32>,
    #[schema(example = 8, nullable = true)]
    pub medical_total: Option<i32>,
    #[schema(example = 12, nullable = true)]
    pub annual_total: Option<i32>,
    #[schema(example = 2, nullable = true)]
    pub annual_carry_forward: Option<i32>,
}

/// Fallback totals used when a user has no stored settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaDefaults {
    pub casual_total: i32,
    pub medical_total: i32,
    pub annual_total: i32,
    pub annual_carry_forward: i32,
}

impl Default for QuotaDefaults {
    fn default() -> Self {
        QuotaDefaults {
            casual_total: 8,
            medical_total: 8,
            annual_total: 12,
            annual_carry_forward: 0,
        }
    }
}

impl LeaveBalanceConfig {
    /// Fills every absent total from `defaults`, field by field.
    pub fn or_defaults(self, defaults: &QuotaDefaults) -> Self {
        LeaveBalanceConfig {
            casual_total: self.casual_total.or(Some(defaults.casual_total)),
            medical_total: self.medical_total.or(Some(defaults.medical_total)),
            annual_total: self.annual_total.or(Some(defaults.annual_total)),
            annual_carry_forward: self
                .annual_carry_forward
                .or(Some(defaults.annual_carry_forward)),
            user_id: self.user_id,
        }
    }

    /// Keeps the stored value of every total this submission leaves absent.
    pub fn or_stored(self, stored: Option<LeaveBalanceConfig>) -> Self {
        let Some(stored) = stored else {
            return self;
        };

        LeaveBalanceConfig {
            casual_total: self.casual_total.or(stored.casual_total),
            medical_total: self.medical_total.or(stored.medical_total),
            annual_total: self.annual_total.or(stored.annual_total),
            annual_carry_forward: self.annual_carry_forward.or(stored.annual_carry_forward),
            user_id: self.user_id,
        }
    }

    /// Builds settings from a submitted JSON object. Totals may be numbers or
    /// numeric strings; missing, null and empty values are left absent.
    pub fn from_json(user_id: impl Into<String>, payload: &Value) -> Result<Self, LeaveError> {
        let obj = payload
            .as_object()
            .ok_or_else(|| LeaveError::invalid_config("payload", "must be a JSON object"))?;

        let field = |name: &'static str| parse_total(name, obj.get(name));

        Ok(LeaveBalanceConfig {
            user_id: user_id.into(),
            casual_total: field("casual_total")?,
            medical_total: field("medical_total")?,
            annual_total: field("annual_total")?,
            annual_carry_forward: field("annual_carry_forward")?,
        })
    }
}

fn parse_total(field: &'static str, value: Option<&Value>) -> Result<Option<i32>, LeaveError> {
    let parsed = match value {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Number(n)) => match n.as_i64() {
            Some(i) => i,
            None => match n.as_f64() {
                Some(f) if f.fract() == 0.0 && f.abs() <= i32::MAX as f64 => f as i64,
                _ => return Err(LeaveError::invalid_config(field, format!("`{n}` is not a whole number"))),
            },
        },
        Some(Value::String(s)) if s.trim().is_empty() => return Ok(None),
        Some(Value::String(s)) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| LeaveError::invalid_config(field, format!("`{s}` is not numeric")))?,
        Some(other) => {
            return Err(LeaveError::invalid_config(
                field,
                format!("`{other}` is not numeric"),
            ));
        }
    };

    if parsed < 0 {
        return Err(LeaveError::invalid_config(field, "must not be negative"));
    }

    i32::try_from(parsed)
        .map(Some)
        .map_err(|_| LeaveError::invalid_config(field, "is out of range"))
}

/// Validated totals the accrual works from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeaveQuota {
    pub casual_total: i64,
    pub medical_total: i64,
    pub annual_carry_forward: i64,
}

impl TryFrom<&LeaveBalanceConfig> for LeaveQuota {
    type Error = LeaveError;

    fn try_from(config: &LeaveBalanceConfig) -> Result<Self, Self::Error> {
        fn required(field: &'static str, value: Option<i32>) -> Result<i64, LeaveError> {
            match value {
                None => Err(LeaveError::invalid_config(field, "is missing")),
                Some(v) if v < 0 => Err(LeaveError::invalid_config(field, "must not be negative")),
                Some(v) => Ok(i64::from(v)),
            }
        }

        Ok(LeaveQuota {
            casual_total: required("casual_total", config.casual_total)?,
            medical_total: required("medical_total", config.medical_total)?,
            annual_carry_forward: required("annual_carry_forward", config.annual_carry_forward)?,
        })
    }
}

use std::env;
use std::str::FromStr;

use anyhow::{Context, Result, anyhow, bail};

use crate::model::leave_balance::QuotaDefaults;

#[derive(Clone, Debug)]
pub struct Config {
    pub server_addr: String,
    /// Without a database URL the service runs on the in-memory store.
    pub database_url: Option<String>,
    pub jwt_secret: String,
    pub jwt_audience: String,

    // Rate limiting
    pub rate_protected_per_min: u32,

    pub api_prefix: String,

    // Logging
    pub log_dir: String,
    pub log_level: String,

    /// Base URL of the storage service holding uploaded leave forms.
    pub storage_public_url: Option<String>,

    pub quota_defaults: QuotaDefaults,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| anyhow!("{key} must be set"))
        };
        let optional = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let rate_protected_per_min = parse_or(&lookup, "RATE_PROTECTED_PER_MIN", 1000u32)?;
        if rate_protected_per_min == 0 {
            bail!("RATE_PROTECTED_PER_MIN must be at least 1");
        }

        let fallback = QuotaDefaults::default();
        let quota_defaults = QuotaDefaults {
            casual_total: parse_or(&lookup, "DEFAULT_CASUAL_TOTAL", fallback.casual_total)?,
            medical_total: parse_or(&lookup, "DEFAULT_MEDICAL_TOTAL", fallback.medical_total)?,
            annual_total: parse_or(&lookup, "DEFAULT_ANNUAL_TOTAL", fallback.annual_total)?,
            annual_carry_forward: parse_or(
                &lookup,
                "DEFAULT_ANNUAL_CF",
                fallback.annual_carry_forward,
            )?,
        };

        Ok(Self {
            server_addr: required("SERVER_ADDR")?,
            database_url: optional("DATABASE_URL"),
            jwt_secret: required("JWT_SECRET")?,
            jwt_audience: optional("JWT_AUDIENCE").unwrap_or_else(|| "authenticated".to_string()),
            rate_protected_per_min,
            api_prefix: optional("API_PREFIX").unwrap_or_else(|| "/api".to_string()),
            log_dir: optional("LOG_DIR").unwrap_or_else(|| "logs".to_string()),
            log_level: optional("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            storage_public_url: optional("STORAGE_PUBLIC_URL"),
            quota_defaults,
        })
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key).filter(|v| !v.trim().is_empty()) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} has an invalid value `{raw}`")),
        None => Ok(default),
    }
}

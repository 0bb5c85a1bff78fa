use crate::{
    auth::auth::AuthUser,
    config::Config,
    error::ApiError,
    leave::accrual::{BalanceSnapshot, compute_balances},
    model::leave_balance::{LeaveBalanceConfig, QuotaDefaults},
    store::AttendanceStore,
};
use actix_web::{HttpResponse, web};
use chrono::{Datelike, Local};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{debug, info, instrument};
use utoipa::{IntoParams, ToSchema};

#[derive(Serialize, Deserialize, ToSchema)]
pub struct LeaveBalanceResponse {
    #[schema(example = 8)]
    pub casual_total: i32,
    #[schema(example = 8)]
    pub medical_total: i32,
    #[schema(example = 12)]
    pub annual_total: i32,
    #[schema(example = 0)]
    pub annual_carry_forward: i32,
    /// True when nothing is stored and the fallback quota is shown
    pub is_default: bool,
}

impl LeaveBalanceResponse {
    /// Stored totals, each absent one taken from `defaults`.
    fn resolve(stored: Option<LeaveBalanceConfig>, defaults: &QuotaDefaults) -> Self {
        let is_default = stored.is_none();
        let LeaveBalanceConfig {
            casual_total,
            medical_total,
            annual_total,
            annual_carry_forward,
            ..
        } = stored.unwrap_or_default();

        LeaveBalanceResponse {
            casual_total: casual_total.unwrap_or(defaults.casual_total),
            medical_total: medical_total.unwrap_or(defaults.medical_total),
            annual_total: annual_total.unwrap_or(defaults.annual_total),
            annual_carry_forward: annual_carry_forward.unwrap_or(defaults.annual_carry_forward),
            is_default,
        }
    }
}

#[derive(Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct SummaryQuery {
    /// Year to evaluate; defaults to the current year
    #[schema(example = 2025)]
    pub year: Option<i32>,
}

/// Get the yearly quota settings of the current user
#[utoipa::path(
    get,
    path = "/api/leave-balance",
    responses(
        (status = 200, description = "Stored settings, or the fallback quota", body = LeaveBalanceResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave Balance"
)]
#[instrument(name = "leave_balance_get", skip_all, fields(user_id = %auth.user_id))]
pub async fn get_leave_balance(
    auth: AuthUser,
    store: web::Data<dyn AttendanceStore>,
    config: web::Data<Config>,
) -> Result<HttpResponse, ApiError> {
    let stored = store.fetch_leave_balance_config(auth.user_id).await?;
    debug!(is_default = stored.is_none(), "Fetched leave balance settings");

    Ok(HttpResponse::Ok().json(LeaveBalanceResponse::resolve(stored, &config.quota_defaults)))
}

/// Save the yearly quota settings
#[utoipa::path(
    put,
    path = "/api/leave-balance",
    request_body(
        content = Object,
        description = "Totals as numbers or numeric strings; omitted totals keep their stored value",
        content_type = "application/json",
        example = json!({
            "casual_total": 8,
            "medical_total": 8,
            "annual_total": 12,
            "annual_carry_forward": "2"
        })
    ),
    responses(
        (status = 200, description = "Saved", body = Object, example = json!({
            "message": "Saved"
        })),
        (status = 400, description = "Non-numeric or negative total"),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave Balance"
)]
#[instrument(name = "leave_balance_save", skip_all, fields(user_id = %auth.user_id))]
pub async fn save_leave_balance(
    auth: AuthUser,
    store: web::Data<dyn AttendanceStore>,
    body: web::Json<Value>,
) -> Result<HttpResponse, ApiError> {
    let submitted = LeaveBalanceConfig::from_json(auth.user_id.to_string(), &body)?;
    let stored = store.fetch_leave_balance_config(auth.user_id).await?;
    let settings = submitted.or_stored(stored);
    debug!(?settings, "Saving leave balance settings");

    store.upsert_leave_balance(settings).await?;

    info!("Leave balance settings saved");
    Ok(HttpResponse::Ok().json(json!({ "message": "Saved" })))
}

/// Remaining balance per leave category for a year
#[utoipa::path(
    get,
    path = "/api/leave-balance/summary",
    params(SummaryQuery),
    responses(
        (status = 200, description = "Balance snapshot", body = BalanceSnapshot),
        (status = 400, description = "A stored record or setting is invalid", body = Object, example = json!({
            "error": "invalid attendance record 12: unknown status `Sick`",
            "status": 400
        })),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave Balance"
)]
#[instrument(name = "leave_balance_summary", skip_all, fields(user_id = %auth.user_id))]
pub async fn leave_summary(
    auth: AuthUser,
    store: web::Data<dyn AttendanceStore>,
    config: web::Data<Config>,
    query: web::Query<SummaryQuery>,
) -> Result<HttpResponse, ApiError> {
    let today = Local::now().date_naive();
    let target_year = query.year.unwrap_or_else(|| today.year());

    let (rows, stored) = futures::try_join!(
        store.fetch_attendance_records(auth.user_id),
        store.fetch_leave_balance_config(auth.user_id),
    )?;

    let settings = stored
        .unwrap_or_else(|| LeaveBalanceConfig {
            user_id: auth.user_id.to_string(),
            ..Default::default()
        })
        .or_defaults(&config.quota_defaults);

    let snapshot = compute_balances(&rows, &settings, target_year, today)?;
    debug!(target_year, records = rows.len(), "Computed leave balance");

    Ok(HttpResponse::Ok().json(snapshot))
}

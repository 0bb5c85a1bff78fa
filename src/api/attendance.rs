use crate::{
    auth::auth::AuthUser,
    config::Config,
    error::ApiError,
    leave::{
        filter::{StatusFilter, filter_records, years_present},
        range::expand_range,
    },
    model::attendance::{AttendanceRecord, AttendanceUpdate, LeaveStatus, NewAttendance},
    store::AttendanceStore,
    utils::storage::leave_form_link,
};
use actix_web::{HttpResponse, web};
use chrono::{Datelike, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info, instrument};
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct AttendanceQuery {
    /// Calendar year to list; defaults to the current year
    #[schema(example = 2025)]
    pub year: Option<i32>,
    /// `all` or one leave type
    #[schema(example = "Casual")]
    pub status: Option<String>,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct AttendanceResponse {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = "2025-03-10", format = "date", value_type = String)]
    pub date: NaiveDate,
    pub status: LeaveStatus,
    pub is_weekend_work: bool,
    /// Stored storage-bucket reference of the uploaded form
    #[schema(example = "0b7f3c1e-6f1a-4c55-9d3e-2f7c1b2a9e10/1741600000000_form.png", nullable = true)]
    pub leave_form_url: Option<String>,
    /// Public URL of the uploaded form, when it can be resolved
    #[schema(nullable = true)]
    pub leave_form_link: Option<String>,
}

impl AttendanceResponse {
    fn from_record(record: &AttendanceRecord, storage_public_url: Option<&str>) -> Self {
        AttendanceResponse {
            id: record.id,
            date: record.date,
            status: record.status,
            is_weekend_work: record.is_weekend_work,
            leave_form_url: record.leave_form_url.clone(),
            leave_form_link: record
                .leave_form_url
                .as_deref()
                .and_then(|r| leave_form_link(storage_public_url, r)),
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct AttendanceListResponse {
    pub data: Vec<AttendanceResponse>,
    #[schema(example = 2025)]
    pub year: i32,
    #[schema(example = "all")]
    pub status: String,
    #[schema(example = 1)]
    pub total: usize,
    /// Years with at least one record, newest first
    #[schema(example = json!([2025, 2024]))]
    pub available_years: Vec<i32>,
}

#[derive(Deserialize, ToSchema)]
pub struct LogAttendance {
    #[schema(example = "2025-03-10", format = "date", value_type = String)]
    pub from: NaiveDate,
    /// Inclusive end of the range; omit to log a single day
    #[schema(example = "2025-03-12", format = "date", value_type = Option<String>)]
    pub to: Option<NaiveDate>,
    #[schema(example = "Casual")]
    pub status: String,
    /// Only kept for compensatory days
    #[serde(default)]
    pub is_weekend_work: bool,
    pub leave_form_url: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateAttendance {
    #[schema(example = "Compensatory")]
    pub status: String,
    #[serde(default)]
    pub is_weekend_work: bool,
    /// Omit to keep the current form
    pub leave_form_url: Option<String>,
}

fn parse_status(raw: &str) -> Result<LeaveStatus, ApiError> {
    raw.trim().parse::<LeaveStatus>().map_err(|_| {
        ApiError::BadRequest(format!(
            "Invalid leave type `{raw}`. Allowed: Medical, Casual, Annual, Compensatory"
        ))
    })
}

/// List attendance records of the current user
#[utoipa::path(
    get,
    path = "/api/attendance",
    params(AttendanceQuery),
    responses(
        (status = 200, description = "Records for the year, newest first", body = AttendanceListResponse),
        (status = 400, description = "Unknown leave type or invalid stored record"),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
#[instrument(name = "attendance_list", skip_all, fields(user_id = %auth.user_id))]
pub async fn list_attendance(
    auth: AuthUser,
    store: web::Data<dyn AttendanceStore>,
    config: web::Data<Config>,
    query: web::Query<AttendanceQuery>,
) -> Result<HttpResponse, ApiError> {
    let year = query.year.unwrap_or_else(|| Local::now().year());
    let status = query
        .status
        .as_deref()
        .unwrap_or("all")
        .parse::<StatusFilter>()
        .map_err(ApiError::BadRequest)?;

    let rows = store.fetch_attendance_records(auth.user_id).await?;
    let records = rows
        .iter()
        .map(AttendanceRecord::try_from)
        .collect::<Result<Vec<_>, _>>()?;

    let storage = config.storage_public_url.as_deref();
    let data: Vec<_> = filter_records(&records, year, status)
        .map(|r| AttendanceResponse::from_record(r, storage))
        .collect();

    debug!(year, %status, total = data.len(), "Listing attendance");

    Ok(HttpResponse::Ok().json(AttendanceListResponse {
        total: data.len(),
        data,
        year,
        status: status.to_string(),
        available_years: years_present(&records),
    }))
}

/// Log one day or an inclusive range of days
#[utoipa::path(
    post,
    path = "/api/attendance",
    request_body(
        content = LogAttendance,
        description = "Date range and leave type",
        content_type = "application/json"
    ),
    responses(
        (status = 201, description = "Days logged", body = Object, example = json!({
            "message": "Logged 3 days",
            "logged": 3
        })),
        (status = 400, description = "Invalid range or leave type"),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
#[instrument(name = "attendance_log", skip_all, fields(user_id = %auth.user_id))]
pub async fn log_attendance(
    auth: AuthUser,
    store: web::Data<dyn AttendanceStore>,
    payload: web::Json<LogAttendance>,
) -> Result<HttpResponse, ApiError> {
    let payload = payload.into_inner();
    let status = parse_status(&payload.status)?;
    let days = expand_range(payload.from, payload.to)?;

    let entries = days
        .into_iter()
        .map(|date| {
            NewAttendance::new(
                date,
                status,
                payload.is_weekend_work,
                payload.leave_form_url.clone(),
            )
        })
        .collect();

    let logged = store.upsert_attendance(auth.user_id, entries).await?;
    info!(logged, %status, "Attendance logged");

    Ok(HttpResponse::Created().json(json!({
        "message": format!("Logged {logged} days"),
        "logged": logged
    })))
}

/// Edit the leave type, weekend-work flag or form of a record
#[utoipa::path(
    put,
    path = "/api/attendance/{id}",
    params(
        ("id" = u64, Path, description = "ID of the attendance record")
    ),
    request_body = UpdateAttendance,
    responses(
        (status = 200, description = "Record updated", body = Object, example = json!({
            "message": "Updated"
        })),
        (status = 400, description = "Invalid leave type"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Record not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
#[instrument(name = "attendance_update", skip_all, fields(user_id = %auth.user_id, id = *path))]
pub async fn update_attendance(
    auth: AuthUser,
    store: web::Data<dyn AttendanceStore>,
    path: web::Path<u64>,
    payload: web::Json<UpdateAttendance>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let payload = payload.into_inner();
    let status = parse_status(&payload.status)?;

    let update = AttendanceUpdate::new(status, payload.is_weekend_work, payload.leave_form_url);
    if !store.update_attendance(auth.user_id, id, update).await? {
        return Err(ApiError::NotFound("Attendance record not found"));
    }

    info!(%status, "Attendance updated");
    Ok(HttpResponse::Ok().json(json!({ "message": "Updated" })))
}

/// Delete a record
#[utoipa::path(
    delete,
    path = "/api/attendance/{id}",
    params(
        ("id" = u64, Path, description = "ID of the attendance record")
    ),
    responses(
        (status = 200, description = "Successfully deleted", body = Object, example = json!({
            "message": "Successfully deleted"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Record not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
#[instrument(name = "attendance_delete", skip_all, fields(user_id = %auth.user_id, id = *path))]
pub async fn delete_attendance(
    auth: AuthUser,
    store: web::Data<dyn AttendanceStore>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();

    if !store.delete_attendance(auth.user_id, id).await? {
        return Err(ApiError::NotFound("Attendance record not found"));
    }

    info!("Attendance deleted");
    Ok(HttpResponse::Ok().json(json!({ "message": "Successfully deleted" })))
}

use crate::api::attendance::{
    AttendanceListResponse, AttendanceQuery, AttendanceResponse, LogAttendance, UpdateAttendance,
};
use crate::api::leave_balance::{LeaveBalanceResponse, SummaryQuery};
use crate::leave::accrual::{AnnualBalance, BalanceSnapshot, CompensatoryBalance};
use crate::model::attendance::LeaveStatus;
use crate::model::leave_balance::LeaveBalanceConfig;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Omni Hub Leave API",
        version = "1.0.0",
        description = r#"
## Omni Hub attendance & leave

Backend of the Omni Hub attendance screen.

### Key Features
- **Attendance log**
  - Log a single day or a date range, edit, delete and list by year / leave type
- **Leave settings**
  - Yearly casual and medical quota, annual carry-forward
- **Balance summary**
  - Remaining medical, casual and annual leave for a year, plus the lifetime compensatory balance

### Security
Every `/api` endpoint expects the auth provider's access token as a **Bearer** token.
"#,
    ),
    paths(
        crate::api::attendance::list_attendance,
        crate::api::attendance::log_attendance,
        crate::api::attendance::update_attendance,
        crate::api::attendance::delete_attendance,

        crate::api::leave_balance::get_leave_balance,
        crate::api::leave_balance::save_leave_balance,
        crate::api::leave_balance::leave_summary
    ),
    components(
        schemas(
            LeaveStatus,
            AttendanceQuery,
            AttendanceResponse,
            AttendanceListResponse,
            LogAttendance,
            UpdateAttendance,
            LeaveBalanceConfig,
            LeaveBalanceResponse,
            SummaryQuery,
            BalanceSnapshot,
            AnnualBalance,
            CompensatoryBalance
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Attendance", description = "Attendance and leave log APIs"),
        (name = "Leave Balance", description = "Quota settings and balance summary APIs"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

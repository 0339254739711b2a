use crate::api::attendance::{
    AttendanceTotal, BulkAttendancePreviewResponse, BulkAttendanceRequest, ElCredit,
    ElCreditRequest, RegularizationWindow,
};
use crate::api::leave_calculation::{CalculateLeave, CalculationResponse};
use crate::api::leave_form::{LeaveFormResponse, OpenLeaveForm, SelectDates, SelectPortion};
use crate::api::short_leave::{ShortLeaveDuration, ShortLeaveWindow};
use crate::errors::RejectionBody;
use crate::model::day_portion::{DayPortion, PortionRole};
use crate::model::form_state::FormStateView;
use crate::utils::leave_calculator::{CalculationBreakdown, DayRow};
use utoipa::Modify;
use utoipa::OpenApi;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "HRM Leave API",
        version = "1.0.0",
        description = r#"
## Leave day calculation

Counts how many days a leave request charges against the employee's balance.

### 🔹 Key Features
- **Leave calculation**
  - Working days between two dates, minus Sundays and holidays for casual leave
  - Half-day portions on the first and last day
  - Balance check, with leave without pay allowed to go negative
- **Leave forms**
  - Server-side form state that recalculates on every date or portion change
- **Attendance helpers**
  - Short leave and regularization durations, bulk attendance preview, earned leave credit

### 🔐 Security
Every endpoint requires a **JWT Bearer** access token.
Bulk attendance and earned leave credit are limited to **Admin** and **HR**.

### 📦 Response Format
- JSON responses
- Refused requests return `422` with `message` and `kind`

---
Built with **Rust**, **Actix Web**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::leave_calculation::calculate_leave,

        crate::api::leave_form::open_form,
        crate::api::leave_form::get_form,
        crate::api::leave_form::select_dates,
        crate::api::leave_form::select_portion,
        crate::api::leave_form::close_form,

        crate::api::short_leave::short_leave_duration,

        crate::api::attendance::regularization,
        crate::api::attendance::bulk_preview,
        crate::api::attendance::el_credit
    ),
    components(
        schemas(
            CalculateLeave,
            CalculationResponse,
            CalculationBreakdown,
            DayRow,
            DayPortion,
            PortionRole,
            RejectionBody,
            OpenLeaveForm,
            SelectDates,
            SelectPortion,
            LeaveFormResponse,
            FormStateView,
            ShortLeaveWindow,
            ShortLeaveDuration,
            RegularizationWindow,
            BulkAttendanceRequest,
            BulkAttendancePreviewResponse,
            AttendanceTotal,
            ElCreditRequest,
            ElCredit
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Leave", description = "Leave calculation and leave form APIs"),
        (name = "Short Leave", description = "Short leave APIs"),
        (name = "Attendance", description = "Attendance helper APIs"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
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
}

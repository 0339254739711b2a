use crate::auth::auth::AuthUser;
use crate::utils::attendance_calc::{
    BulkAttendanceForm, earned_leave_credit, parse_datetime, parse_time, regularization_duration,
};
use actix_web::{HttpResponse, Responder, web};
use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct RegularizationWindow {
    #[schema(example = "2024-06-03T09:10")]
    pub from_date: String,
    #[schema(example = "2024-06-03T18:05")]
    pub to_date: String,
}

/// Regularization span as `H:M`.
#[utoipa::path(
    post,
    path = "/api/v1/attendance/regularization/duration",
    request_body = RegularizationWindow,
    responses(
        (status = 200, description = "Duration of the regularized window", body = Object, example = json!({
            "duration": "8:55"
        })),
        (status = 400, description = "Unparseable or reversed datetimes"),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn regularization(
    _auth: AuthUser,
    payload: web::Json<RegularizationWindow>,
) -> impl Responder {
    let (Some(from), Some(to)) = (
        parse_datetime(&payload.from_date),
        parse_datetime(&payload.to_date),
    ) else {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "message": "Dates must be given as YYYY-MM-DDTHH:MM"
        }));
    };

    match regularization_duration(from, to) {
        Some(duration) => HttpResponse::Ok().json(serde_json::json!({ "duration": duration })),
        None => HttpResponse::BadRequest().json(serde_json::json!({
            "message": "From date must not be after to date"
        })),
    }
}

#[derive(Deserialize, ToSchema)]
pub struct BulkAttendanceRequest {
    #[schema(example = "2024-06-03", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2024-06-03", format = "date", value_type = String)]
    pub end_date: NaiveDate,
    #[schema(example = "09:00")]
    pub start_time: String,
    #[schema(example = "17:30")]
    pub end_time: String,
    #[serde(default)]
    pub select_all: bool,
    #[serde(default)]
    pub employee_ids: Vec<u64>,
    /// active employees behind "Select All"
    #[serde(default)]
    pub total_active_employees: u64,
}

#[derive(Serialize, ToSchema)]
pub struct BulkAttendancePreviewResponse {
    #[schema(value_type = f64, example = 8.5)]
    #[serde(with = "rust_decimal::serde::float")]
    pub duration_hours: Decimal,
    pub employee_count: u64,
    pub sample_employee_ids: Vec<u64>,
    /// number of selected employees not listed in the sample
    pub more_employees: u64,
    pub confirmation: String,
}

fn bad_request_errors(errors: Vec<String>) -> HttpResponse {
    HttpResponse::BadRequest().json(serde_json::json!({ "errors": errors }))
}

/// Checks a bulk attendance entry and builds its confirmation. Nothing is
/// written.
#[utoipa::path(
    post,
    path = "/api/v1/attendance/bulk/preview",
    request_body = BulkAttendanceRequest,
    responses(
        (status = 200, description = "Preview of the bulk entry", body = BulkAttendancePreviewResponse),
        (status = 400, description = "Validation errors", body = Object, example = json!({
            "errors": ["End date must be after start date."]
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn bulk_preview(
    auth: AuthUser,
    payload: web::Json<BulkAttendanceRequest>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;
    let payload = payload.into_inner();

    let mut errors = Vec::new();
    let start_time = parse_time_field(&payload.start_time, "Start time", &mut errors);
    let end_time = parse_time_field(&payload.end_time, "End time", &mut errors);
    let (Some(start_time), Some(end_time)) = (start_time, end_time) else {
        return Ok(bad_request_errors(errors));
    };

    let form = BulkAttendanceForm {
        start_date: payload.start_date,
        end_date: payload.end_date,
        start_time,
        end_time,
        select_all: payload.select_all,
        employee_ids: payload.employee_ids,
        total_active_employees: payload.total_active_employees,
    };

    match form.preview() {
        Ok(preview) => Ok(HttpResponse::Ok().json(BulkAttendancePreviewResponse {
            duration_hours: preview.duration_hours,
            employee_count: preview.employee_count,
            sample_employee_ids: preview.sample_employee_ids,
            more_employees: preview.more_employees,
            confirmation: preview.confirmation,
        })),
        Err(errors) => Ok(bad_request_errors(errors)),
    }
}

fn parse_time_field(
    raw: &str,
    label: &str,
    errors: &mut Vec<String>,
) -> Option<NaiveTime> {
    let parsed = parse_time(raw);
    if parsed.is_none() {
        errors.push(format!("{label} must be given as HH:MM."));
    }
    parsed
}

#[derive(Deserialize, ToSchema)]
pub struct AttendanceTotal {
    #[schema(example = "EMP-0042")]
    pub emp_code: String,
    /// days attended in the period
    #[schema(value_type = f64, example = 26.0)]
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
}

#[derive(Deserialize, ToSchema)]
pub struct ElCreditRequest {
    #[schema(example = 30)]
    pub total_days: u32,
    pub records: Vec<AttendanceTotal>,
}

#[derive(Serialize, ToSchema)]
pub struct ElCredit {
    #[schema(example = "EMP-0042")]
    pub emp_code: String,
    #[schema(value_type = f64, example = 6.5)]
    #[serde(with = "rust_decimal::serde::float")]
    pub credit: Decimal,
}

/// Earned leave owed to each employee for the period.
#[utoipa::path(
    post,
    path = "/api/v1/attendance/el-credit",
    request_body = ElCreditRequest,
    responses(
        (status = 200, description = "Credit per employee", body = [ElCredit]),
        (status = 400, description = "Empty period", body = Object, example = json!({
            "message": "total_days must be greater than zero"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn el_credit(
    auth: AuthUser,
    payload: web::Json<ElCreditRequest>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;
    let payload = payload.into_inner();

    let total_days = payload.total_days;

    let credits: Option<Vec<ElCredit>> = (total_days > 0)
        .then(|| {
            payload
                .records
                .into_iter()
                .map(|record| {
                    earned_leave_credit(record.total, total_days).map(|credit| ElCredit {
                        emp_code: record.emp_code,
                        credit,
                    })
                })
                .collect()
        })
        .flatten();
    let Some(credits) = credits else {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "total_days must be greater than zero"
        })));
    };

    info!(user_id = auth.user_id, employees = credits.len(), "EL credit computed");
    Ok(HttpResponse::Ok().json(credits))
}

#[cfg(test)]
mod tests {
    use crate::model::holiday::HolidayCalendar;
    use crate::test_support::{bearer, hr_bearer, test_app};
    use actix_web::{http::StatusCode, test};
    use serde_json::{Value, json};

    #[actix_web::test]
    async fn regularization_is_unpadded() {
        let app = test_app!(HolidayCalendar::new());
        let req = test::TestRequest::post()
            .uri("/api/v1/attendance/regularization/duration")
            .insert_header(bearer())
            .set_json(json!({ "from_date": "2024-06-03T09:10", "to_date": "2024-06-03T18:05" }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["duration"], json!("8:55"));

        let req = test::TestRequest::post()
            .uri("/api/v1/attendance/regularization/duration")
            .insert_header(bearer())
            .set_json(json!({ "from_date": "2024-06-04T09:00", "to_date": "2024-06-03T18:00" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn bulk_preview_samples_four_ids() {
        let app = test_app!(HolidayCalendar::new());
        let req = test::TestRequest::post()
            .uri("/api/v1/attendance/bulk/preview")
            .insert_header(hr_bearer())
            .set_json(json!({
                "start_date": "2024-06-03",
                "end_date": "2024-06-03",
                "start_time": "09:00",
                "end_time": "17:30",
                "employee_ids": [1, 2, 3, 4, 5, 6]
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["duration_hours"], json!(8.5));
        assert_eq!(body["employee_count"], json!(6));
        assert_eq!(body["sample_employee_ids"], json!([1, 2, 3, 4]));
        assert_eq!(body["more_employees"], json!(2));
    }

    #[actix_web::test]
    async fn bulk_preview_lists_every_problem() {
        let app = test_app!(HolidayCalendar::new());
        let req = test::TestRequest::post()
            .uri("/api/v1/attendance/bulk/preview")
            .insert_header(hr_bearer())
            .set_json(json!({
                "start_date": "2024-06-05",
                "end_date": "2024-06-03",
                "start_time": "09:00",
                "end_time": "17:30"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["errors"].as_array().unwrap().len(), 2);
    }

    #[actix_web::test]
    async fn attendance_tools_are_hr_only() {
        let app = test_app!(HolidayCalendar::new());
        let req = test::TestRequest::post()
            .uri("/api/v1/attendance/el-credit")
            .insert_header(bearer())
            .set_json(json!({ "total_days": 30, "records": [] }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn el_credit_per_employee() {
        let app = test_app!(HolidayCalendar::new());
        let req = test::TestRequest::post()
            .uri("/api/v1/attendance/el-credit")
            .insert_header(hr_bearer())
            .set_json(json!({
                "total_days": 30,
                "records": [
                    { "emp_code": "EMP-1", "total": 30.0 },
                    { "emp_code": "EMP-2", "total": 26.0 }
                ]
            }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body[0]["credit"], json!(7.5));
        assert_eq!(body[1]["credit"], json!(6.5));

        let req = test::TestRequest::post()
            .uri("/api/v1/attendance/el-credit")
            .insert_header(hr_bearer())
            .set_json(json!({
                "total_days": 0,
                "records": [{ "emp_code": "EMP-1", "total": 3.0 }]
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}

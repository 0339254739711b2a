use crate::auth::auth::AuthUser;
use crate::errors::RejectionBody;
use crate::model::date_range::DateRange;
use crate::model::day_portion::DayPortion;
use crate::model::leave_balance::LeaveBalanceState;
use crate::model::leave_type::LeaveTypeRule;
use crate::utils::holiday_client::{HolidaySource, fetch_or_empty};
use crate::utils::leave_calculator::{
    CalculationBreakdown, DayRow, LeaveRequest, as_of_label, assess, day_rows, validate_portions,
};
use actix_web::{HttpResponse, Responder, web};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct CalculateLeave {
    #[schema(example = "2024-06-03", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2024-06-07", format = "date", value_type = String)]
    pub end_date: NaiveDate,
    /// leave type short code
    #[schema(example = "CL", value_type = String)]
    pub leave_type: LeaveTypeRule,
    #[serde(default)]
    pub start_portion: DayPortion,
    #[serde(default)]
    pub end_portion: DayPortion,
    /// balance of this leave type before the request
    #[schema(example = 12.0, value_type = f64)]
    #[serde(with = "rust_decimal::serde::float")]
    pub allocated_balance: Decimal,
}

#[derive(Serialize, ToSchema)]
pub struct CalculationResponse {
    pub breakdown: CalculationBreakdown,
    #[schema(example = 4.0, value_type = f64)]
    #[serde(with = "rust_decimal::serde::float")]
    pub used_leave: Decimal,
    #[schema(example = 8.0, value_type = f64)]
    #[serde(with = "rust_decimal::serde::float")]
    pub balance_leave: Decimal,
    #[schema(example = "3-Jun-2024")]
    pub as_of: String,
    pub days: Vec<DayRow>,
}

/// One-shot calculation: holidays are fetched for the range, then the
/// request is counted and checked against the balance.
#[utoipa::path(
    post,
    path = "/api/v1/leave/calculate",
    request_body(
        content = CalculateLeave,
        description = "Dates, portions and balance of the leave being applied for",
        content_type = "application/json"
    ),
    responses(
        (status = 200, description = "Chargeable days for the request", body = CalculationResponse),
        (status = 400, description = "Bad request"),
        (status = 401, description = "Unauthorized"),
        (status = 422, description = "Request refused, including ranges longer than 366 days", body = RejectionBody, example = json!({
            "message": "Selected date is either a Sunday or a Holiday. Leave cannot be applied.",
            "kind": "non_working_day"
        }))
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
#[instrument(
    name = "leave_calculate",
    skip(auth, holidays, payload),
    fields(user_id = auth.user_id)
)]
pub async fn calculate_leave(
    auth: AuthUser,
    holidays: web::Data<dyn HolidaySource>,
    payload: web::Json<CalculateLeave>,
) -> actix_web::Result<impl Responder> {
    let payload = payload.into_inner();

    if payload.leave_type.is_blank() {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "leave_type is required"
        })));
    }

    let range = DateRange::new(payload.start_date, payload.end_date)?;
    validate_portions(&range, payload.end_portion)?;

    let calendar = fetch_or_empty(holidays.get_ref(), range).await;

    let request = LeaveRequest {
        range,
        rule: payload.leave_type,
        start_portion: payload.start_portion,
        end_portion: payload.end_portion,
    };
    let mut balance = LeaveBalanceState::new(payload.allocated_balance);
    let breakdown = assess(&request, &calendar, &mut balance)?;

    info!(
        leave_type = request.rule.code(),
        start = %range.start,
        end = %range.end,
        chargeable = %breakdown.chargeable_days,
        "Leave calculated"
    );

    Ok(HttpResponse::Ok().json(CalculationResponse {
        breakdown,
        used_leave: balance.charged(),
        balance_leave: balance.remaining(),
        as_of: as_of_label(range.start),
        days: day_rows(&range, &request.rule, &calendar),
    }))
}

#[cfg(test)]
mod tests {
    use crate::model::holiday::HolidayCalendar;
    use crate::test_support::{bearer, june_holidays, test_app};
    use actix_web::{http::StatusCode, test};
    use serde_json::{Value, json};

    #[actix_web::test]
    async fn requires_a_token() {
        let app = test_app!(HolidayCalendar::new());
        let req = test::TestRequest::post()
            .uri("/api/v1/leave/calculate")
            .set_json(json!({
                "start_date": "2024-06-03",
                "end_date": "2024-06-07",
                "leave_type": "GEN",
                "allocated_balance": 10.0
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn casual_leave_week_with_holiday() {
        let app = test_app!(june_holidays());
        let req = test::TestRequest::post()
            .uri("/api/v1/leave/calculate")
            .insert_header(bearer())
            .set_json(json!({
                "start_date": "2024-06-03",
                "end_date": "2024-06-07",
                "leave_type": "cl",
                "allocated_balance": 10.0
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["breakdown"]["base_days"], json!(4.0));
        assert_eq!(body["used_leave"], json!(4.0));
        assert_eq!(body["balance_leave"], json!(6.0));
        assert_eq!(body["as_of"], json!("3-Jun-2024"));
        assert_eq!(body["days"].as_array().unwrap().len(), 5);
        assert_eq!(body["days"][2]["holiday"], json!("Founders Day"));
        assert_eq!(body["days"][2]["excluded"], json!(true));
    }

    #[actix_web::test]
    async fn weekend_span_with_halves() {
        let app = test_app!(HolidayCalendar::new());
        let req = test::TestRequest::post()
            .uri("/api/v1/leave/calculate")
            .insert_header(bearer())
            .set_json(json!({
                "start_date": "2024-06-01",
                "end_date": "2024-06-03",
                "leave_type": "GEN",
                "start_portion": "3",
                "end_portion": "first_half",
                "allocated_balance": 5.0
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["breakdown"]["base_days"], json!(3.0));
        assert_eq!(body["breakdown"]["adjustment"], json!(-1.0));
        assert_eq!(body["used_leave"], json!(2.0));
    }

    #[actix_web::test]
    async fn sunday_is_refused() {
        let app = test_app!(HolidayCalendar::new());
        let req = test::TestRequest::post()
            .uri("/api/v1/leave/calculate")
            .insert_header(bearer())
            .set_json(json!({
                "start_date": "2024-06-02",
                "end_date": "2024-06-02",
                "leave_type": "GEN",
                "allocated_balance": 5.0
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["kind"], json!("non_working_day"));
    }

    #[actix_web::test]
    async fn overdraw_is_refused_but_lwp_is_not() {
        let app = test_app!(HolidayCalendar::new());
        for (code, status) in [("EL", StatusCode::UNPROCESSABLE_ENTITY), ("LWP", StatusCode::OK)] {
            let req = test::TestRequest::post()
                .uri("/api/v1/leave/calculate")
                .insert_header(bearer())
                .set_json(json!({
                    "start_date": "2024-06-03",
                    "end_date": "2024-06-05",
                    "leave_type": code,
                    "allocated_balance": 1.0
                }))
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), status, "{code}");
        }
    }

    #[actix_web::test]
    async fn reversed_dates_and_blank_type_are_refused() {
        let app = test_app!(HolidayCalendar::new());
        let req = test::TestRequest::post()
            .uri("/api/v1/leave/calculate")
            .insert_header(bearer())
            .set_json(json!({
                "start_date": "2024-06-07",
                "end_date": "2024-06-03",
                "leave_type": "GEN",
                "allocated_balance": 5.0
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["kind"], json!("start_after_end"));

        let req = test::TestRequest::post()
            .uri("/api/v1/leave/calculate")
            .insert_header(bearer())
            .set_json(json!({
                "start_date": "2024-06-03",
                "end_date": "2024-06-03",
                "leave_type": "  ",
                "allocated_balance": 5.0
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn ranges_longer_than_a_year_are_refused() {
        let app = test_app!(HolidayCalendar::new());
        let req = test::TestRequest::post()
            .uri("/api/v1/leave/calculate")
            .insert_header(bearer())
            .set_json(json!({
                "start_date": "0001-01-01",
                "end_date": "9999-12-31",
                "leave_type": "LWP",
                "allocated_balance": 0.0
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["kind"], json!("range_too_long"));
    }
}

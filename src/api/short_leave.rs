use crate::auth::auth::AuthUser;
use crate::utils::attendance_calc::{minutes_to_hhmm, parse_time, short_leave_minutes};
use actix_web::{HttpResponse, Responder, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct ShortLeaveWindow {
    #[schema(example = "10:15")]
    pub from_time: String,
    #[schema(example = "11:45")]
    pub to_time: String,
}

#[derive(Serialize, ToSchema)]
pub struct ShortLeaveDuration {
    #[schema(example = 90)]
    pub minutes: i64,
    #[schema(example = "01:30")]
    pub display: String,
}

/// Length of a short leave within one day.
#[utoipa::path(
    post,
    path = "/api/v1/short-leave/duration",
    request_body = ShortLeaveWindow,
    responses(
        (status = 200, description = "Duration of the short leave", body = ShortLeaveDuration),
        (status = 400, description = "Unparseable times or end not after start", body = Object, example = json!({
            "message": "To time must be after from time"
        })),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Short Leave"
)]
pub async fn short_leave_duration(
    _auth: AuthUser,
    payload: web::Json<ShortLeaveWindow>,
) -> impl Responder {
    let (Some(from), Some(to)) = (parse_time(&payload.from_time), parse_time(&payload.to_time)) else {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "message": "Times must be given as HH:MM"
        }));
    };

    match short_leave_minutes(from, to) {
        Some(minutes) => HttpResponse::Ok().json(ShortLeaveDuration {
            minutes,
            display: minutes_to_hhmm(minutes),
        }),
        None => HttpResponse::BadRequest().json(serde_json::json!({
            "message": "To time must be after from time"
        })),
    }
}

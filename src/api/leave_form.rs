use crate::auth::auth::AuthUser;
use crate::errors::RejectionBody;
use crate::model::date_range::DateRange;
use crate::model::day_portion::{DayPortion, PortionRole};
use crate::model::form_state::{FormCalculationState, FormStateView};
use crate::model::leave_type::LeaveTypeRule;
use crate::utils::form_sessions::{FormSessionStore, SharedForm};
use crate::utils::holiday_client::{HolidaySource, fetch_or_empty};
use actix_web::{HttpResponse, Responder, web};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Deserialize, ToSchema)]
pub struct OpenLeaveForm {
    /// leave type short code
    #[schema(example = "CL", value_type = String)]
    pub leave_type: LeaveTypeRule,
    /// balance of this leave type when the form is opened
    #[schema(example = 12.0, value_type = f64)]
    #[serde(with = "rust_decimal::serde::float")]
    pub allocated_balance: Decimal,
}

#[derive(Deserialize, ToSchema)]
pub struct SelectDates {
    #[schema(example = "2024-06-03", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2024-06-07", format = "date", value_type = String)]
    pub end_date: NaiveDate,
}

#[derive(Deserialize, ToSchema)]
pub struct SelectPortion {
    pub role: PortionRole,
    pub portion: DayPortion,
}

#[derive(Serialize, ToSchema)]
pub struct LeaveFormResponse {
    #[schema(example = "6f1c2d8e-3f4b-4c55-9a3e-2b1d0c9e8f7a", format = "uuid", value_type = String)]
    pub form_id: Uuid,
    pub state: FormStateView,
}

fn form_not_found() -> HttpResponse {
    HttpResponse::NotFound().json(serde_json::json!({
        "message": "Leave form not found or expired"
    }))
}

async fn find_form(
    store: &FormSessionStore,
    form_id: &Uuid,
    auth: &AuthUser,
) -> Result<SharedForm, HttpResponse> {
    store
        .get(form_id, auth.user_id)
        .await
        .ok_or_else(form_not_found)
}

/* =========================
Open a leave form
========================= */
#[utoipa::path(
    post,
    path = "/api/v1/leave/forms",
    request_body = OpenLeaveForm,
    responses(
        (status = 201, description = "Form opened", body = LeaveFormResponse),
        (status = 400, description = "Bad request"),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn open_form(
    auth: AuthUser,
    store: web::Data<FormSessionStore>,
    payload: web::Json<OpenLeaveForm>,
) -> actix_web::Result<impl Responder> {
    let payload = payload.into_inner();
    if payload.leave_type.is_blank() {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "leave_type is required"
        })));
    }

    let state = FormCalculationState::new(payload.leave_type, payload.allocated_balance);
    let view = state.view();
    let (form_id, _) = store.open(auth.user_id, state).await;

    info!(user_id = auth.user_id, form_id = %form_id, leave_type = %view.leave_type, "Leave form opened");

    Ok(HttpResponse::Created().json(LeaveFormResponse {
        form_id,
        state: view,
    }))
}

/* =========================
Current state of a form
========================= */
#[utoipa::path(
    get,
    path = "/api/v1/leave/forms/{form_id}",
    params(
        ("form_id" = String, Path, description = "Id returned when the form was opened")
    ),
    responses(
        (status = 200, description = "Form state", body = LeaveFormResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Form not found or expired")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn get_form(
    auth: AuthUser,
    store: web::Data<FormSessionStore>,
    path: web::Path<Uuid>,
) -> actix_web::Result<impl Responder> {
    let form_id = path.into_inner();
    let form = match find_form(&store, &form_id, &auth).await {
        Ok(form) => form,
        Err(resp) => return Ok(resp),
    };

    let state = form.lock().await.view();
    Ok(HttpResponse::Ok().json(LeaveFormResponse { form_id, state }))
}

/* =========================
Select the date range
========================= */
/// Picks the range, waits for its holidays and recalculates. When a newer
/// range was picked while the lookup was in flight, the lookup result is
/// dropped and the newer state is returned as is.
#[utoipa::path(
    put,
    path = "/api/v1/leave/forms/{form_id}/dates",
    params(
        ("form_id" = String, Path, description = "Id returned when the form was opened")
    ),
    request_body = SelectDates,
    responses(
        (status = 200, description = "Recalculated form state", body = LeaveFormResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Form not found or expired"),
        (status = 422, description = "Start date after end date or range longer than 366 days", body = RejectionBody)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
#[instrument(name = "leave_form_dates", skip(auth, store, holidays, path, payload), fields(user_id = auth.user_id, form_id))]
pub async fn select_dates(
    auth: AuthUser,
    store: web::Data<FormSessionStore>,
    holidays: web::Data<dyn HolidaySource>,
    path: web::Path<Uuid>,
    payload: web::Json<SelectDates>,
) -> actix_web::Result<impl Responder> {
    let form_id = path.into_inner();
    tracing::Span::current().record("form_id", tracing::field::display(&form_id));

    let form = match find_form(&store, &form_id, &auth).await {
        Ok(form) => form,
        Err(resp) => return Ok(resp),
    };

    let range = DateRange::new(payload.start_date, payload.end_date)?;
    let generation = form.lock().await.begin_range(range);

    let calendar = fetch_or_empty(holidays.get_ref(), range).await;

    let mut state = form.lock().await;
    if !state.apply_holidays(generation, calendar) {
        debug!(
            generation,
            current = state.generation(),
            "Dropping holidays for a superseded date range"
        );
    }

    Ok(HttpResponse::Ok().json(LeaveFormResponse {
        form_id,
        state: state.view(),
    }))
}

/* =========================
Select a boundary portion
========================= */
#[utoipa::path(
    put,
    path = "/api/v1/leave/forms/{form_id}/portion",
    params(
        ("form_id" = String, Path, description = "Id returned when the form was opened")
    ),
    request_body = SelectPortion,
    responses(
        (status = 200, description = "Recalculated form state", body = LeaveFormResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Form not found or expired"),
        (status = 422, description = "Portion not selectable", body = RejectionBody)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn select_portion(
    auth: AuthUser,
    store: web::Data<FormSessionStore>,
    path: web::Path<Uuid>,
    payload: web::Json<SelectPortion>,
) -> actix_web::Result<impl Responder> {
    let form_id = path.into_inner();
    let form = match find_form(&store, &form_id, &auth).await {
        Ok(form) => form,
        Err(resp) => return Ok(resp),
    };

    let mut state = form.lock().await;
    state.set_portion(payload.role, payload.portion)?;

    Ok(HttpResponse::Ok().json(LeaveFormResponse {
        form_id,
        state: state.view(),
    }))
}

/* =========================
Discard a form
========================= */
#[utoipa::path(
    delete,
    path = "/api/v1/leave/forms/{form_id}",
    params(
        ("form_id" = String, Path, description = "Id returned when the form was opened")
    ),
    responses(
        (status = 204, description = "Form discarded"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Form not found or expired")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn close_form(
    auth: AuthUser,
    store: web::Data<FormSessionStore>,
    path: web::Path<Uuid>,
) -> impl Responder {
    if store.close(&path.into_inner(), auth.user_id).await {
        HttpResponse::NoContent().finish()
    } else {
        form_not_found()
    }
}

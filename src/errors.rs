use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use derive_more::Display;
use serde::Serialize;
use utoipa::ToSchema;

use crate::model::date_range::MAX_LEAVE_SPAN_DAYS;
use crate::model::day_portion::DayPortion;

/// User-facing reasons a leave calculation is refused.
///
/// None of these are faults: the form stays editable and submission stays
/// disabled until the user picks something valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Rejection {
    #[display(fmt = "Start date cannot be after end date.")]
    StartAfterEnd,
    #[display(fmt = "A leave request cannot span more than {} days.", MAX_LEAVE_SPAN_DAYS)]
    RangeTooLong,
    #[display(fmt = "Selected date is either a Sunday or a Holiday. Leave cannot be applied.")]
    NonWorkingDay,
    #[display(fmt = "Insufficient leave balance for this request.")]
    InsufficientBalance,
    #[display(fmt = "{} is not available for the last day of a multi-day leave.", "_0.label()")]
    PortionUnavailable(DayPortion),
    #[display(fmt = "Select a start and end date first.")]
    NoDateRange,
}

impl std::error::Error for Rejection {}

impl Rejection {
    pub fn kind(&self) -> &'static str {
        match self {
            Rejection::StartAfterEnd => "start_after_end",
            Rejection::RangeTooLong => "range_too_long",
            Rejection::NonWorkingDay => "non_working_day",
            Rejection::InsufficientBalance => "insufficient_balance",
            Rejection::PortionUnavailable(_) => "portion_unavailable",
            Rejection::NoDateRange => "no_date_range",
        }
    }

    pub fn body(&self) -> RejectionBody {
        RejectionBody {
            message: self.to_string(),
            kind: self.kind().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct RejectionBody {
    #[schema(example = "Insufficient leave balance for this request.")]
    pub message: String,
    #[schema(example = "insufficient_balance")]
    pub kind: String,
}

impl ResponseError for Rejection {
    fn status_code(&self) -> StatusCode {
        StatusCode::UNPROCESSABLE_ENTITY
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(self.body())
    }
}

use std::collections::HashMap;

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;
use strum::IntoEnumIterator;
use utoipa::ToSchema;

use crate::errors::Rejection;
use crate::model::date_range::DateRange;
use crate::model::day_portion::DayPortion;
use crate::model::holiday::{HolidayCalendar, is_weekly_off};
use crate::model::leave_balance::LeaveBalanceState;
use crate::model::leave_type::LeaveTypeRule;

/// Adjustments for multi-day requests, keyed by (start portion, end portion).
/// Pairs that are not listed adjust by zero.
static PORTION_ADJUSTMENTS: Lazy<HashMap<(DayPortion, DayPortion), Decimal>> = Lazy::new(|| {
    HashMap::from([
        ((DayPortion::FullDay, DayPortion::FullDay), Decimal::ZERO),
        ((DayPortion::FirstHalf, DayPortion::FirstHalf), dec!(-0.5)),
        ((DayPortion::SecondHalf, DayPortion::FirstHalf), dec!(-1)),
        ((DayPortion::SecondHalf, DayPortion::FullDay), dec!(-0.5)),
        ((DayPortion::FullDay, DayPortion::FirstHalf), dec!(-0.5)),
    ])
});

const END_PORTIONS: [DayPortion; 2] = [DayPortion::FullDay, DayPortion::FirstHalf];
const INTERIOR_PORTIONS: [DayPortion; 1] = [DayPortion::FullDay];

/// One leave request as entered on the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaveRequest {
    pub range: DateRange,
    pub rule: LeaveTypeRule,
    pub start_portion: DayPortion,
    pub end_portion: DayPortion,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct CalculationBreakdown {
    /// days counted before the portion adjustment
    #[schema(value_type = f64, example = 5.0)]
    #[serde(with = "rust_decimal::serde::float")]
    pub base_days: Decimal,
    #[schema(value_type = f64, example = -0.5)]
    #[serde(with = "rust_decimal::serde::float")]
    pub adjustment: Decimal,
    #[schema(value_type = f64, example = 4.5)]
    #[serde(with = "rust_decimal::serde::float")]
    pub chargeable_days: Decimal,
}

/// One line of the per-day table shown under the date pickers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct DayRow {
    #[schema(example = "2024-06-03", format = "date", value_type = String)]
    pub date: NaiveDate,
    #[schema(example = "Mon Jun 03 2024")]
    pub label: String,
    /// portions the user may pick for this day
    pub portions: Vec<DayPortion>,
    pub weekly_off: bool,
    #[schema(example = "Founders Day", nullable = true)]
    pub holiday: Option<String>,
    /// true when the day adds nothing to the base count
    pub excluded: bool,
}

pub fn portion_adjustment(start: DayPortion, end: DayPortion) -> Decimal {
    PORTION_ADJUSTMENTS
        .get(&(start, end))
        .copied()
        .unwrap_or(Decimal::ZERO)
}

/// Days of a multi-day range that count towards the charge.
pub fn base_count(range: &DateRange, rule: &LeaveTypeRule, holidays: &HolidayCalendar) -> Decimal {
    let counted = range
        .days()
        .filter(|day| !(rule.excludes_non_working_days() && holidays.is_non_working(*day)))
        .count();
    Decimal::from(counted)
}

/// The last day of a multi-day range can only be taken in full or as a
/// first half.
pub fn validate_portions(range: &DateRange, end_portion: DayPortion) -> Result<(), Rejection> {
    if !range.is_single_day() && end_portion == DayPortion::SecondHalf {
        return Err(Rejection::PortionUnavailable(end_portion));
    }
    Ok(())
}

/// Chargeable leave days for a request, before any balance check.
pub fn compute(request: &LeaveRequest, holidays: &HolidayCalendar) -> Result<CalculationBreakdown, Rejection> {
    let range = &request.range;

    if range.is_single_day() {
        if holidays.is_non_working(range.start) {
            return Err(Rejection::NonWorkingDay);
        }
        let adjustment = if request.start_portion == DayPortion::FullDay {
            Decimal::ZERO
        } else {
            dec!(-0.5)
        };
        return Ok(CalculationBreakdown {
            base_days: Decimal::ONE,
            adjustment,
            chargeable_days: Decimal::ONE + adjustment,
        });
    }

    let base_days = base_count(range, &request.rule, holidays);
    let adjustment = portion_adjustment(request.start_portion, request.end_portion);
    let chargeable_days = base_days + adjustment;
    if chargeable_days < Decimal::ZERO {
        return Err(Rejection::InsufficientBalance);
    }

    Ok(CalculationBreakdown {
        base_days,
        adjustment,
        chargeable_days,
    })
}

/// `compute` followed by the balance check. The balance is only touched when
/// both succeed.
pub fn assess(
    request: &LeaveRequest,
    holidays: &HolidayCalendar,
    balance: &mut LeaveBalanceState,
) -> Result<CalculationBreakdown, Rejection> {
    let breakdown = compute(request, holidays)?;
    balance.charge(breakdown.chargeable_days, &request.rule)?;
    Ok(breakdown)
}

pub fn day_rows(range: &DateRange, rule: &LeaveTypeRule, holidays: &HolidayCalendar) -> Vec<DayRow> {
    range
        .days()
        .map(|day| {
            let portions = if day == range.start {
                DayPortion::iter().collect()
            } else if day == range.end {
                END_PORTIONS.to_vec()
            } else {
                INTERIOR_PORTIONS.to_vec()
            };
            let weekly_off = rule.excludes_non_working_days() && is_weekly_off(day);
            let holiday = holidays.title(day).map(str::to_owned);
            let excluded = rule.excludes_non_working_days() && holidays.is_non_working(day);

            DayRow {
                date: day,
                label: day.format("%a %b %d %Y").to_string(),
                portions,
                weekly_off,
                holiday,
                excluded,
            }
        })
        .collect()
}

/// `3-Jun-2024`
pub fn as_of_label(day: NaiveDate) -> String {
    day.format("%-d-%b-%Y").to_string()
}

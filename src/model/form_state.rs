use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

use crate::errors::{Rejection, RejectionBody};
use crate::model::date_range::DateRange;
use crate::model::day_portion::{DayPortion, PortionRole};
use crate::model::holiday::HolidayCalendar;
use crate::model::leave_balance::LeaveBalanceState;
use crate::model::leave_type::LeaveTypeRule;
use crate::utils::leave_calculator::{
    self, CalculationBreakdown, DayRow, LeaveRequest, as_of_label, day_rows,
};

/// Everything one open leave form knows about the request being built.
///
/// Mutated only through the methods below; each date change starts a new
/// generation so that a late holiday response for an older range is dropped.
#[derive(Debug, Clone)]
pub struct FormCalculationState {
    rule: LeaveTypeRule,
    balance: LeaveBalanceState,
    range: Option<DateRange>,
    start_portion: DayPortion,
    end_portion: DayPortion,
    holidays: Option<HolidayCalendar>,
    breakdown: Option<CalculationBreakdown>,
    rejection: Option<Rejection>,
    generation: u64,
}

impl FormCalculationState {
    pub fn new(rule: LeaveTypeRule, allocated_balance: Decimal) -> Self {
        Self {
            rule,
            balance: LeaveBalanceState::new(allocated_balance),
            range: None,
            start_portion: DayPortion::FullDay,
            end_portion: DayPortion::FullDay,
            holidays: None,
            breakdown: None,
            rejection: None,
            generation: 0,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn range(&self) -> Option<DateRange> {
        self.range
    }

    /// Selects a new range. Holidays for it are unknown until
    /// [`apply_holidays`](Self::apply_holidays) is called with the returned
    /// generation.
    pub fn begin_range(&mut self, range: DateRange) -> u64 {
        self.generation += 1;
        self.range = Some(range);
        self.start_portion = DayPortion::FullDay;
        self.end_portion = DayPortion::FullDay;
        self.holidays = None;
        self.breakdown = None;
        self.rejection = None;
        self.balance.reset();
        self.generation
    }

    /// Returns false and changes nothing when `generation` is stale.
    pub fn apply_holidays(&mut self, generation: u64, holidays: HolidayCalendar) -> bool {
        if generation != self.generation {
            return false;
        }
        self.holidays = Some(holidays);
        self.recalculate();
        true
    }

    pub fn set_portion(&mut self, role: PortionRole, portion: DayPortion) -> Result<(), Rejection> {
        let range = self.range.ok_or(Rejection::NoDateRange)?;

        if range.is_single_day() {
            // both selectors describe the same day
            self.start_portion = portion;
            self.end_portion = portion;
        } else {
            match role {
                PortionRole::Start => self.start_portion = portion,
                PortionRole::End => {
                    leave_calculator::validate_portions(&range, portion)?;
                    self.end_portion = portion;
                }
            }
        }

        self.recalculate();
        Ok(())
    }

    fn recalculate(&mut self) {
        let (Some(range), Some(holidays)) = (self.range, self.holidays.as_ref()) else {
            return;
        };
        let request = LeaveRequest {
            range,
            rule: self.rule.clone(),
            start_portion: self.start_portion,
            end_portion: self.end_portion,
        };

        match leave_calculator::assess(&request, holidays, &mut self.balance) {
            Ok(breakdown) => {
                self.breakdown = Some(breakdown);
                self.rejection = None;
            }
            Err(rejection) => self.rejection = Some(rejection),
        }
    }

    pub fn submit_enabled(&self) -> bool {
        self.range.is_some()
            && self.holidays.is_some()
            && self.breakdown.is_some()
            && self.rejection.is_none()
            && (!self.rule.blocks_negative_balance() || self.balance.remaining() >= Decimal::ZERO)
    }

    pub fn rejection(&self) -> Option<Rejection> {
        self.rejection
    }

    pub fn used_leave(&self) -> Decimal {
        self.balance.charged()
    }

    pub fn balance_leave(&self) -> Decimal {
        self.balance.remaining()
    }

    pub fn view(&self) -> FormStateView {
        let days = match (self.range, self.holidays.as_ref()) {
            (Some(range), Some(holidays)) => day_rows(&range, &self.rule, holidays),
            _ => Vec::new(),
        };

        FormStateView {
            leave_type: self.rule.code().to_string(),
            allocated_balance: self.balance.allocated(),
            start_date: self.range.map(|r| r.start),
            end_date: self.range.map(|r| r.end),
            start_portion: self.start_portion,
            end_portion: self.end_portion,
            holidays_loaded: self.holidays.is_some(),
            breakdown: self.breakdown,
            used_leave: self.used_leave(),
            balance_leave: self.balance_leave(),
            submit_enabled: self.submit_enabled(),
            as_of: self.range.map(|r| as_of_label(r.start)),
            rejection: self.rejection.map(|r| r.body()),
            days,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FormStateView {
    #[schema(example = "CL")]
    pub leave_type: String,
    #[schema(value_type = f64, example = 12.0)]
    #[serde(with = "rust_decimal::serde::float")]
    pub allocated_balance: Decimal,
    #[schema(example = "2024-06-03", format = "date", value_type = String, nullable = true)]
    pub start_date: Option<NaiveDate>,
    #[schema(example = "2024-06-07", format = "date", value_type = String, nullable = true)]
    pub end_date: Option<NaiveDate>,
    pub start_portion: DayPortion,
    pub end_portion: DayPortion,
    /// false while the holiday lookup for the selected range is in flight
    pub holidays_loaded: bool,
    #[schema(nullable = true)]
    pub breakdown: Option<CalculationBreakdown>,
    /// chargeable days, posted as the used leave field
    #[schema(value_type = f64, example = 4.0)]
    #[serde(with = "rust_decimal::serde::float")]
    pub used_leave: Decimal,
    /// allocated minus used, posted as the balance leave field
    #[schema(value_type = f64, example = 8.0)]
    #[serde(with = "rust_decimal::serde::float")]
    pub balance_leave: Decimal,
    pub submit_enabled: bool,
    #[schema(example = "3-Jun-2024", nullable = true)]
    pub as_of: Option<String>,
    #[schema(nullable = true)]
    pub rejection: Option<RejectionBody>,
    pub days: Vec<DayRow>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn range(start: NaiveDate, end: NaiveDate) -> DateRange {
        DateRange::new(start, end).unwrap()
    }

    fn loaded(code: &str, allocated: Decimal, r: DateRange, holidays: HolidayCalendar) -> FormCalculationState {
        let mut state = FormCalculationState::new(LeaveTypeRule::new(code), allocated);
        let generation = state.begin_range(r);
        assert!(state.apply_holidays(generation, holidays));
        state
    }

    #[test]
    fn fresh_form_cannot_submit() {
        let state = FormCalculationState::new(LeaveTypeRule::new("CL"), dec!(10));
        assert!(!state.submit_enabled());
        let view = state.view();
        assert_eq!(view.used_leave, Decimal::ZERO);
        assert_eq!(view.balance_leave, dec!(10));
        assert!(view.days.is_empty());
        assert!(view.as_of.is_none());
    }

    #[test]
    fn range_is_pending_until_holidays_arrive() {
        let mut state = FormCalculationState::new(LeaveTypeRule::new("CL"), dec!(10));
        let generation = state.begin_range(range(date(2024, 6, 3), date(2024, 6, 7)));
        assert!(!state.submit_enabled());
        assert!(!state.view().holidays_loaded);

        let mut holidays = HolidayCalendar::new();
        holidays.insert(date(2024, 6, 5), "Founders Day");
        assert!(state.apply_holidays(generation, holidays));

        let view = state.view();
        assert!(view.holidays_loaded);
        assert!(view.submit_enabled);
        assert_eq!(view.used_leave, dec!(4));
        assert_eq!(view.balance_leave, dec!(6));
        assert_eq!(view.days.len(), 5);
        assert_eq!(view.as_of.as_deref(), Some("3-Jun-2024"));
    }

    #[test]
    fn stale_holiday_response_is_ignored() {
        let mut state = FormCalculationState::new(LeaveTypeRule::new("CL"), dec!(10));
        let first = state.begin_range(range(date(2024, 6, 3), date(2024, 6, 7)));
        let second = state.begin_range(range(date(2024, 6, 10), date(2024, 6, 11)));

        assert!(!state.apply_holidays(first, HolidayCalendar::new()));
        assert!(!state.view().holidays_loaded);

        assert!(state.apply_holidays(second, HolidayCalendar::new()));
        assert_eq!(state.used_leave(), dec!(2));
    }

    #[test]
    fn single_day_portions_mirror_each_other() {
        let mut state = loaded("SL", dec!(5), DateRange::single(date(2024, 6, 4)), HolidayCalendar::new());
        assert_eq!(state.used_leave(), Decimal::ONE);

        state.set_portion(PortionRole::End, DayPortion::FirstHalf).unwrap();
        let view = state.view();
        assert_eq!(view.start_portion, DayPortion::FirstHalf);
        assert_eq!(view.end_portion, DayPortion::FirstHalf);
        assert_eq!(view.used_leave, dec!(0.5));

        state.set_portion(PortionRole::Start, DayPortion::SecondHalf).unwrap();
        let view = state.view();
        assert_eq!(view.end_portion, DayPortion::SecondHalf);
        assert_eq!(view.used_leave, dec!(0.5));
    }

    #[test]
    fn multi_day_end_cannot_be_second_half() {
        let mut state = loaded(
            "SL",
            dec!(5),
            range(date(2024, 6, 3), date(2024, 6, 4)),
            HolidayCalendar::new(),
        );
        assert_eq!(
            state.set_portion(PortionRole::End, DayPortion::SecondHalf),
            Err(Rejection::PortionUnavailable(DayPortion::SecondHalf))
        );
        assert_eq!(state.view().end_portion, DayPortion::FullDay);
    }

    #[test]
    fn portion_change_can_fit_request_into_balance() {
        let mut state = loaded(
            "EL",
            dec!(1),
            range(date(2024, 6, 3), date(2024, 6, 4)),
            HolidayCalendar::new(),
        );
        assert_eq!(state.rejection(), Some(Rejection::InsufficientBalance));
        assert!(!state.submit_enabled());

        state.set_portion(PortionRole::Start, DayPortion::SecondHalf).unwrap();
        assert_eq!(state.rejection(), Some(Rejection::InsufficientBalance));

        state.set_portion(PortionRole::End, DayPortion::FirstHalf).unwrap();
        assert_eq!(state.rejection(), None);
        assert_eq!(state.used_leave(), Decimal::ONE);
        assert_eq!(state.balance_leave(), Decimal::ZERO);
        assert!(state.submit_enabled());
    }

    #[test]
    fn rejected_change_keeps_last_committed_total() {
        let mut state = loaded(
            "EL",
            dec!(1.5),
            range(date(2024, 6, 3), date(2024, 6, 4)),
            HolidayCalendar::new(),
        );
        state.set_portion(PortionRole::Start, DayPortion::SecondHalf).unwrap();
        assert_eq!(state.used_leave(), dec!(1.5));

        state.set_portion(PortionRole::Start, DayPortion::FullDay).unwrap();
        assert_eq!(state.rejection(), Some(Rejection::InsufficientBalance));
        assert_eq!(state.used_leave(), dec!(1.5));
        assert!(!state.submit_enabled());
    }

    #[test]
    fn lwp_submits_with_negative_balance() {
        let state = loaded(
            "LWP",
            Decimal::ZERO,
            range(date(2024, 6, 3), date(2024, 6, 5)),
            HolidayCalendar::new(),
        );
        assert_eq!(state.balance_leave(), dec!(-3));
        assert!(state.submit_enabled());
    }

    #[test]
    fn sunday_single_day_blocks_submission() {
        let state = loaded("GEN", dec!(5), DateRange::single(date(2024, 6, 2)), HolidayCalendar::new());
        assert_eq!(state.rejection(), Some(Rejection::NonWorkingDay));
        assert!(!state.submit_enabled());
        assert_eq!(state.used_leave(), Decimal::ZERO);
    }

    #[test]
    fn portion_without_range_is_rejected() {
        let mut state = FormCalculationState::new(LeaveTypeRule::new("CL"), dec!(3));
        assert_eq!(
            state.set_portion(PortionRole::Start, DayPortion::FirstHalf),
            Err(Rejection::NoDateRange)
        );
    }

    #[test]
    fn new_range_resets_portions() {
        let mut state = loaded("SL", dec!(5), DateRange::single(date(2024, 6, 4)), HolidayCalendar::new());
        state.set_portion(PortionRole::Start, DayPortion::FirstHalf).unwrap();

        let generation = state.begin_range(range(date(2024, 6, 4), date(2024, 6, 6)));
        state.apply_holidays(generation, HolidayCalendar::new());
        let view = state.view();
        assert_eq!(view.start_portion, DayPortion::FullDay);
        assert_eq!(view.used_leave, dec!(3));
    }
}

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::prelude::*;
use rust_decimal_macros::dec;

/// Hours of earned leave credited for a full period of attendance.
pub const EL_CREDIT_PER_PERIOD: Decimal = dec!(7.5);
/// How many selected employees a bulk preview lists by id.
pub const PREVIEW_SAMPLE_SIZE: usize = 4;

const TIME_FORMATS: [&str; 2] = ["%H:%M:%S", "%H:%M"];
const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

pub fn parse_time(raw: &str) -> Option<NaiveTime> {
    let raw = raw.trim();
    TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(raw, fmt).ok())
}

pub fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
}

/// Minutes between two times of the same day; `None` unless `to` is later.
pub fn short_leave_minutes(from: NaiveTime, to: NaiveTime) -> Option<i64> {
    if to <= from {
        return None;
    }
    Some((to - from).num_minutes())
}

/// `90` -> `01:30`
pub fn minutes_to_hhmm(minutes: i64) -> String {
    let minutes = minutes.abs();
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

/// Regularization requests show their span as unpadded `H:M`.
pub fn regularization_duration(from: NaiveDateTime, to: NaiveDateTime) -> Option<String> {
    if from > to {
        return None;
    }
    let minutes = (to - from).num_minutes();
    Some(format!("{}:{}", minutes / 60, minutes % 60))
}

/// Earned leave credited for `attended` days out of `total_days`, to two
/// decimals. `None` for an empty period.
pub fn earned_leave_credit(attended: Decimal, total_days: u32) -> Option<Decimal> {
    if total_days == 0 {
        return None;
    }
    let credit = attended / Decimal::from(total_days) * EL_CREDIT_PER_PERIOD;
    Some(credit.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
}

/// Raw bulk attendance form input.
#[derive(Debug, Clone)]
pub struct BulkAttendanceForm {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub select_all: bool,
    pub employee_ids: Vec<u64>,
    pub total_active_employees: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BulkAttendancePreview {
    pub duration_hours: Decimal,
    pub employee_count: u64,
    pub sample_employee_ids: Vec<u64>,
    pub more_employees: u64,
    pub confirmation: String,
}

impl BulkAttendanceForm {
    pub fn employee_count(&self) -> u64 {
        if self.select_all {
            self.total_active_employees
        } else {
            self.employee_ids.len() as u64
        }
    }

    /// All problems with the form, in the order they appear on it.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.end_date < self.start_date {
            errors.push("End date must be after start date.".to_string());
        }
        if self.start_date == self.end_date && self.end_time <= self.start_time {
            errors.push("End time must be after start time on the same day.".to_string());
        }
        if !self.select_all && self.employee_ids.is_empty() {
            errors.push(
                "Please select at least one employee or check \"Select All\".".to_string(),
            );
        }
        if errors.is_empty() && self.duration_minutes() <= 0 {
            errors.push("Attendance window must be longer than zero.".to_string());
        }

        errors
    }

    fn duration_minutes(&self) -> i64 {
        let start = self.start_date.and_time(self.start_time);
        let end = self.end_date.and_time(self.end_time);
        (end - start).num_minutes()
    }

    pub fn preview(&self) -> Result<BulkAttendancePreview, Vec<String>> {
        let errors = self.validate();
        if !errors.is_empty() {
            return Err(errors);
        }

        let duration_hours = (Decimal::from(self.duration_minutes()) / dec!(60))
            .round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero);
        let employee_count = self.employee_count();

        let (sample_employee_ids, more_employees) = if self.select_all {
            (Vec::new(), 0)
        } else {
            let sample: Vec<u64> = self
                .employee_ids
                .iter()
                .take(PREVIEW_SAMPLE_SIZE)
                .copied()
                .collect();
            let more = self.employee_ids.len().saturating_sub(PREVIEW_SAMPLE_SIZE) as u64;
            (sample, more)
        };

        let confirmation = format!(
            "Are you sure you want to mark attendance as PRESENT for {count} employee(s) from {start} to {end}?\n\n\
             This action will:\n\
             - Create {count} attendance records\n\
             - Mark them as approved automatically\n\
             - Set them as backend regularized",
            count = employee_count,
            start = self.start_date,
            end = self.end_date,
        );

        Ok(BulkAttendancePreview {
            duration_hours,
            employee_count,
            sample_employee_ids,
            more_employees,
            confirmation,
        })
    }
}

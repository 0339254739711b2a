use chrono::NaiveDate;
use serde::Serialize;

use crate::errors::Rejection;

/// Longest range a single leave request may cover, in days.
pub const MAX_LEAVE_SPAN_DAYS: i64 = 366;

/// Inclusive calendar range of a leave request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, Rejection> {
        if start > end {
            return Err(Rejection::StartAfterEnd);
        }
        let range = Self { start, end };
        if range.len_days() > MAX_LEAVE_SPAN_DAYS {
            return Err(Rejection::RangeTooLong);
        }
        Ok(range)
    }

    pub fn single(day: NaiveDate) -> Self {
        Self {
            start: day,
            end: day,
        }
    }

    pub fn is_single_day(&self) -> bool {
        self.start == self.end
    }

    pub fn len_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// Every calendar day from start to end, both included.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.start.iter_days().take_while(move |day| *day <= self.end)
    }
}

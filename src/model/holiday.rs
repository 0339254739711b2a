use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate, Weekday};
use serde::Serialize;

use crate::model::date_range::DateRange;

/// Canonical key format shared with the holiday endpoint.
pub const HOLIDAY_DATE_FORMAT: &str = "%Y-%m-%d";

/// Holidays known for one query range, keyed by calendar date.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HolidayCalendar {
    entries: BTreeMap<NaiveDate, String>,
}

impl HolidayCalendar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, day: NaiveDate, title: impl Into<String>) {
        self.entries.insert(day, title.into());
    }

    /// Inserts a holiday whose date arrived as text. Returns false when the
    /// text does not hold a `YYYY-MM-DD` date.
    pub fn insert_raw(&mut self, raw_date: &str, title: impl Into<String>) -> bool {
        match normalize_date_key(raw_date) {
            Some(day) => {
                self.insert(day, title);
                true
            }
            None => false,
        }
    }

    pub fn title(&self, day: NaiveDate) -> Option<&str> {
        self.entries.get(&day).map(String::as_str)
    }

    pub fn is_holiday(&self, day: NaiveDate) -> bool {
        self.entries.contains_key(&day)
    }

    /// Sunday or holiday.
    pub fn is_non_working(&self, day: NaiveDate) -> bool {
        is_weekly_off(day) || self.is_holiday(day)
    }

    pub fn within(&self, range: &DateRange) -> Self {
        Self {
            entries: self
                .entries
                .range(range.start..=range.end)
                .map(|(day, title)| (*day, title.clone()))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(NaiveDate, String)> for HolidayCalendar {
    fn from_iter<I: IntoIterator<Item = (NaiveDate, String)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

pub fn is_weekly_off(day: NaiveDate) -> bool {
    day.weekday() == Weekday::Sun
}

/// Reduces `2024-06-05`, `2024-06-05T00:00:00` or ` 2024-06-05 ` to a date.
pub fn normalize_date_key(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    let head = trimmed.get(..10).unwrap_or(trimmed);
    NaiveDate::parse_from_str(head, HOLIDAY_DATE_FORMAT).ok()
}

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::Config;
use crate::model::date_range::DateRange;
use crate::model::holiday::{HOLIDAY_DATE_FORMAT, HolidayCalendar};

const UNTITLED_HOLIDAY: &str = "Holiday";

/// Where holidays for a date range come from.
#[async_trait]
pub trait HolidaySource: Send + Sync {
    async fn holidays_between(&self, range: DateRange) -> Result<HolidayCalendar>;
}

/// Fetches holidays for `range`, falling back to an empty calendar when the
/// source fails. A missing holiday list never blocks a calculation.
pub async fn fetch_or_empty(source: &dyn HolidaySource, range: DateRange) -> HolidayCalendar {
    match source.holidays_between(range).await {
        Ok(calendar) => {
            debug!(
                start = %range.start,
                end = %range.end,
                holidays = calendar.len(),
                "Holiday lookup complete"
            );
            calendar
        }
        Err(e) => {
            warn!(
                start = %range.start,
                end = %range.end,
                "Holiday lookup failed, continuing without holidays: {:#}",
                e
            );
            HolidayCalendar::new()
        }
    }
}

/// Picks the holiday source for this deployment.
pub fn from_config(config: &Config) -> Result<Arc<dyn HolidaySource>> {
    match &config.holiday_api_url {
        Some(url) => {
            let source = HttpHolidaySource::new(
                url.clone(),
                config.holiday_api_token.clone(),
                Duration::from_secs(config.holiday_api_timeout_secs),
            )?;
            Ok(Arc::new(source))
        }
        None => {
            warn!("HOLIDAY_API_URL not set, every calculation runs without holidays");
            Ok(Arc::new(StaticHolidaySource::default()))
        }
    }
}

/* =========================
Upstream holiday endpoint
========================= */

#[derive(Debug, Deserialize)]
struct HolidayEnvelope {
    #[serde(default)]
    results: Option<HolidayPage>,
}

#[derive(Debug, Deserialize)]
struct HolidayPage {
    #[serde(default)]
    data: Option<Vec<HolidayEntry>>,
}

#[derive(Debug, Deserialize)]
struct HolidayEntry {
    #[serde(default)]
    start_date: Option<String>,
    #[serde(default)]
    title: Option<String>,
}

impl HolidayEnvelope {
    fn into_calendar(self) -> HolidayCalendar {
        let entries = self.results.and_then(|page| page.data).unwrap_or_default();

        let mut calendar = HolidayCalendar::new();
        for entry in entries {
            let Some(raw_date) = entry.start_date else {
                continue;
            };
            let title = entry
                .title
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| UNTITLED_HOLIDAY.to_string());
            if !calendar.insert_raw(&raw_date, title) {
                debug!(raw_date = %raw_date, "Skipping holiday with unreadable date");
            }
        }
        calendar
    }
}

/// `GET <url>?start_date=YYYY-MM-DD&end_date=YYYY-MM-DD` against the HR backend.
pub struct HttpHolidaySource {
    client: reqwest::Client,
    url: String,
    token: Option<String>,
}

impl HttpHolidaySource {
    pub fn new(url: impl Into<String>, token: Option<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build holiday http client")?;

        Ok(Self {
            client,
            url: url.into(),
            token,
        })
    }
}

#[async_trait]
impl HolidaySource for HttpHolidaySource {
    async fn holidays_between(&self, range: DateRange) -> Result<HolidayCalendar> {
        let start = range.start.format(HOLIDAY_DATE_FORMAT).to_string();
        let end = range.end.format(HOLIDAY_DATE_FORMAT).to_string();

        let mut request = self
            .client
            .get(&self.url)
            .query(&[("start_date", start.as_str()), ("end_date", end.as_str())]);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let envelope: HolidayEnvelope = request
            .send()
            .await
            .context("Holiday request failed")?
            .error_for_status()
            .context("Holiday endpoint returned an error status")?
            .json()
            .await
            .context("Holiday response is not the expected json")?;

        Ok(envelope.into_calendar().within(&range))
    }
}

/// Fixed calendar, used when no upstream is configured.
#[derive(Debug, Clone, Default)]
pub struct StaticHolidaySource {
    calendar: HolidayCalendar,
}

impl StaticHolidaySource {
    pub fn new(calendar: HolidayCalendar) -> Self {
        Self { calendar }
    }
}

#[async_trait]
impl HolidaySource for StaticHolidaySource {
    async fn holidays_between(&self, range: DateRange) -> Result<HolidayCalendar> {
        Ok(self.calendar.within(&range))
    }
}

/*
 *  forecast.rs
 *
 *  smart-display - weather & clock panel
 *  (c) 2020-26 Stuart Hunter
 *
 *  Hourly temperature series -> per-day min/max summaries
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use chrono::{Datelike, NaiveDate};
use log::{debug, info, warn};
use serde::Deserialize;
use std::future::Future;

use crate::error::FeedError;
use crate::http::HttpFetcher;

pub const HOURS_PER_DAY: usize = 24;
pub const MAX_FORECAST_DAYS: usize = 7;

/// One hourly sample, timestamp kept verbatim ("2025-12-23T00:00")
#[derive(Debug, Clone, PartialEq)]
pub struct HourlySample {
    pub timestamp: String,
    pub temperature_c: f64,
}

/// Contiguous hour-aligned series starting at hour 0 of the first forecast day.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HourlySeries {
    samples: Vec<HourlySample>,
}

impl HourlySeries {
    pub fn new(samples: Vec<HourlySample>) -> Self {
        Self { samples }
    }

    pub fn samples(&self) -> &[HourlySample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Summary of one complete 24-hour window
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DaySummary {
    /// 1..=31, or 0 when the window's timestamp had no readable date
    pub day_of_month: u32,
    pub min_temp: f64,
    pub max_temp: f64,
}

impl DaySummary {
    pub fn date_text(&self) -> String {
        format!("{:02}", self.day_of_month)
    }

    /// "min / max" in whole degrees
    pub fn min_max_text(&self) -> String {
        format!("{} / {}", whole_degrees(self.min_temp), whole_degrees(self.max_temp))
    }
}

/// Display rounding: truncate toward zero. Only ever applied when formatting.
pub fn whole_degrees(temp: f64) -> i32 {
    temp.trunc() as i32
}

#[derive(Deserialize)]
struct ForecastDocument {
    hourly: HourlyBlock,
}

// extra hourly arrays (rain, showers, ...) are ignored
#[derive(Deserialize)]
struct HourlyBlock {
    time: Vec<String>,
    temperature_2m: Vec<f64>,
}

/// Parse a forecast document. Any malformed entry fails the whole parse.
pub fn parse(raw: &[u8]) -> Result<HourlySeries, FeedError> {
    let doc: ForecastDocument = serde_json::from_slice(raw)?;
    let HourlyBlock { time, temperature_2m } = doc.hourly;

    if time.len() != temperature_2m.len() {
        return Err(FeedError::Parse(format!(
            "hourly time/temperature length mismatch: {} vs {}",
            time.len(),
            temperature_2m.len()
        )));
    }

    let samples = time
        .into_iter()
        .zip(temperature_2m)
        .map(|(timestamp, temperature_c)| HourlySample { timestamp, temperature_c })
        .collect();

    Ok(HourlySeries::new(samples))
}

/// Summarize up to `day_count` days from consecutive 24-sample windows.
///
/// A trailing window with fewer than 24 samples is dropped, so a 30-hour
/// series yields one summary. A series without a single full day is
/// `InsufficientData`.
pub fn summarize_days(series: &HourlySeries, day_count: usize) -> Result<Vec<DaySummary>, FeedError> {
    let summaries: Vec<DaySummary> = series
        .samples()
        .chunks_exact(HOURS_PER_DAY)
        .take(day_count)
        .filter_map(summarize_window)
        .collect();

    if summaries.is_empty() {
        return Err(FeedError::InsufficientData {
            needed: HOURS_PER_DAY,
            available: series.len(),
        });
    }
    if summaries.len() < day_count {
        debug!(
            "Forecast covers {} of {} days ({} hourly samples)",
            summaries.len(),
            day_count,
            series.len()
        );
    }
    Ok(summaries)
}

fn summarize_window(window: &[HourlySample]) -> Option<DaySummary> {
    let first = window.first()?;
    let (min_temp, max_temp) = window.iter().fold(
        (f64::INFINITY, f64::NEG_INFINITY),
        |(lo, hi), s| (lo.min(s.temperature_c), hi.max(s.temperature_c)),
    );
    Some(DaySummary {
        day_of_month: day_of_month(&first.timestamp),
        min_temp,
        max_temp,
    })
}

/// Day-of-month from the date part of an ISO-8601 timestamp, 0 if unreadable
pub fn day_of_month(timestamp: &str) -> u32 {
    timestamp
        .get(..10)
        .and_then(|date| NaiveDate::parse_from_str(date, "%Y-%m-%d").ok())
        .map(|date| date.day())
        .unwrap_or(0)
}

/// Chart values for the temperature chart, at most `max_points` of them
pub fn chart_points(series: &HourlySeries, max_points: usize) -> Vec<i32> {
    series
        .samples()
        .iter()
        .take(max_points)
        .map(|s| whole_degrees(s.temperature_c))
        .collect()
}

/// Source of raw forecast documents
pub trait ForecastSource {
    fn fetch_forecast(&self) -> impl Future<Output = Result<Vec<u8>, FeedError>>;
}

/// Open-Meteo style forecast endpoint
pub struct HttpForecastSource {
    http: HttpFetcher,
    url: String,
    latitude: f64,
    longitude: f64,
    days: usize,
    timezone: String,
}

impl HttpForecastSource {
    pub fn new(
        http: HttpFetcher,
        url: &str,
        latitude: f64,
        longitude: f64,
        days: usize,
        utc_offset_secs: i64,
    ) -> Self {
        let timezone = forecast_timezone(utc_offset_secs);
        info!("Forecast source {} at {:.4}, {:.4} ({})", url, latitude, longitude, timezone);
        Self { http, url: url.to_string(), latitude, longitude, days, timezone }
    }
}

impl ForecastSource for HttpForecastSource {
    async fn fetch_forecast(&self) -> Result<Vec<u8>, FeedError> {
        let query = forecast_query(self.latitude, self.longitude, self.days, &self.timezone);
        self.http.get_bytes(&self.url, &query).await
    }
}

pub fn forecast_query(latitude: f64, longitude: f64, days: usize, timezone: &str) -> Vec<(&'static str, String)> {
    vec![
        ("latitude", format!("{:.4}", latitude)),
        ("longitude", format!("{:.4}", longitude)),
        ("hourly", "temperature_2m,rain,showers,snowfall".to_string()),
        ("forecast_days", days.to_string()),
        ("timezone", timezone.to_string()),
    ]
}

/// tz database name for the clock's fixed offset, so forecast days start
/// at the same midnight the clock shows. Etc/GMT signs are inverted:
/// UTC+1 is "Etc/GMT-1". Offsets with no Etc zone fall back to UTC.
pub fn forecast_timezone(utc_offset_secs: i64) -> String {
    let hours = utc_offset_secs / 3600;
    if utc_offset_secs % 3600 != 0 || !(-12..=14).contains(&hours) {
        warn!("No fixed zone for offset {}s, forecast days run on UTC", utc_offset_secs);
        return "GMT".to_string();
    }
    match hours {
        0 => "GMT".to_string(),
        h => format!("Etc/GMT{:+}", -h),
    }
}

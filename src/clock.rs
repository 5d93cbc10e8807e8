/*
 *  clock.rs
 *
 *  smart-display - weather & clock panel
 *  (c) 2020-26 Stuart Hunter
 *
 *  Local clock service - free-runs between authoritative time fetches
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

use arrayvec::ArrayString;
use chrono::{DateTime, Datelike, NaiveDateTime, Weekday};
use clap::ValueEnum;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt::Write;
use std::future::Future;
use std::time::{Duration, Instant};

use crate::error::FeedError;
use crate::http::HttpFetcher;

/// Shown on the clock label until the first successful time fetch
pub const UNKNOWN_TIME_TEXT: &str = "Invalid Time";

/// Rendered clock text, e.g. "Tue 23.12.2025 22:53:49"
pub type ClockText = ArrayString<32>;

/// The two weekday label sets the panel knows about.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum WeekdayLabels {
    #[default]
    En,
    De,
}

impl WeekdayLabels {
    /// Short weekday name, Monday-first tables
    pub fn name(self, day: Weekday) -> &'static str {
        const EN: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];
        const DE: [&str; 7] = ["Mo", "Di", "Mi", "Do", "Fr", "Sa", "So"];
        let idx = day.num_days_from_monday() as usize;
        match self {
            WeekdayLabels::En => EN[idx],
            WeekdayLabels::De => DE[idx],
        }
    }
}

/// Source of authoritative epoch seconds (before any offset correction).
pub trait TimeSource {
    fn fetch_unix_time(&self) -> impl Future<Output = Result<i64, FeedError>>;
}

/// Time source backed by an HTTP endpoint returning `{"time": <epoch>}`.
pub struct HttpTimeSource {
    http: HttpFetcher,
    url: String,
}

impl HttpTimeSource {
    pub fn new(http: HttpFetcher, url: &str) -> Self {
        Self { http, url: url.to_string() }
    }
}

impl TimeSource for HttpTimeSource {
    async fn fetch_unix_time(&self) -> Result<i64, FeedError> {
        let body = self.http.get_bytes(&self.url, &[]).await?;
        parse_time_payload(&body)
    }
}

/// Extract the epoch from a time endpoint body.
///
/// Accepts an object with a `time` member, an object with exactly one
/// member, or a bare number. The value must be a positive integer.
pub fn parse_time_payload(body: &[u8]) -> Result<i64, FeedError> {
    let doc: Value = serde_json::from_slice(body)?;
    let value = match &doc {
        Value::Object(map) => match map.get("time") {
            Some(v) => v,
            None => match (map.len(), map.values().next()) {
                (1, Some(v)) => v,
                _ => return Err(FeedError::Parse("missing time field".to_string())),
            },
        },
        Value::Number(_) => &doc,
        other => return Err(FeedError::Parse(format!("unexpected time document: {}", other))),
    };
    let secs = value
        .as_i64()
        .ok_or_else(|| FeedError::Parse(format!("time field is not an integer: {}", value)))?;
    if secs <= 0 {
        return Err(FeedError::Parse(format!("non-positive epoch {}", secs)));
    }
    Ok(secs)
}

/// Millisecond counter relative to process start. Never goes backwards.
#[derive(Debug, Clone, Copy)]
pub struct Monotonic {
    origin: Instant,
}

impl Monotonic {
    pub fn start() -> Self {
        Self { origin: Instant::now() }
    }

    pub fn now_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }
}

/// Volatile clock state, rebuilt from the network after every power cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClockState {
    /// Offset-corrected epoch seconds; `None` until the first good fetch
    pub authoritative_epoch_secs: Option<i64>,
    pub last_sync_mark_ms: u64,
    pub last_tick_mark_ms: u64,
}

/// Result of a `maybe_resync` call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResyncOutcome {
    /// Interval not elapsed, nothing attempted
    NotDue,
    Synced,
    /// Fetch attempted and failed, state kept
    Failed,
}

pub struct ClockService<T: TimeSource> {
    source: T,
    state: ClockState,
    utc_offset_secs: i64,
    sync_interval_ms: u64,
    labels: WeekdayLabels,
}

impl<T: TimeSource> ClockService<T> {
    pub fn new(source: T, utc_offset_secs: i64, sync_interval: Duration, labels: WeekdayLabels) -> Self {
        Self {
            source,
            state: ClockState::default(),
            utc_offset_secs,
            sync_interval_ms: sync_interval.as_millis() as u64,
            labels,
        }
    }

    /// One round trip to the time source with the fixed offset applied.
    /// Commits nothing.
    pub async fn fetch_authoritative_time(&self) -> Result<i64, FeedError> {
        let raw = self.source.fetch_unix_time().await?;
        if raw <= 0 {
            return Err(FeedError::Parse(format!("non-positive epoch {}", raw)));
        }
        Ok(raw + self.utc_offset_secs)
    }

    /// Initial fetch. On failure the clock stays unknown until a resync succeeds.
    pub async fn initialize(&mut self, now_ms: u64) -> bool {
        self.state.last_sync_mark_ms = now_ms;
        self.state.last_tick_mark_ms = now_ms;
        match self.fetch_authoritative_time().await {
            Ok(epoch) => {
                self.state.authoritative_epoch_secs = Some(epoch);
                info!("Initial time: {}", self.format_display_time());
                true
            }
            Err(e) => {
                warn!("Initial time fetch failed ({}): {}", e.kind(), e);
                false
            }
        }
    }

    /// Advance by the whole seconds elapsed since the last tick.
    ///
    /// The tick mark moves by the seconds consumed, so the sub-second
    /// remainder carries into the next call. Returns true when the
    /// displayed time changed.
    pub fn tick(&mut self, now_ms: u64) -> bool {
        let whole_secs = now_ms.saturating_sub(self.state.last_tick_mark_ms) / 1000;
        if whole_secs == 0 {
            return false;
        }
        self.state.last_tick_mark_ms += whole_secs * 1000;
        match self.state.authoritative_epoch_secs.as_mut() {
            Some(epoch) => {
                *epoch += whole_secs as i64;
                true
            }
            None => false,
        }
    }

    /// Hard reset from the time source once the sync interval has elapsed.
    pub async fn maybe_resync(&mut self, now_ms: u64) -> ResyncOutcome {
        if now_ms.saturating_sub(self.state.last_sync_mark_ms) < self.sync_interval_ms {
            return ResyncOutcome::NotDue;
        }
        // counts as an attempt whatever the outcome
        self.state.last_sync_mark_ms = now_ms;

        match self.fetch_authoritative_time().await {
            Ok(epoch) => {
                match self.state.authoritative_epoch_secs {
                    Some(local) => debug!("Time synchronized from server, local drift {}s", local - epoch),
                    None => {
                        self.state.last_tick_mark_ms = now_ms;
                        info!("Time synchronized from server after startup without time");
                    }
                }
                self.state.authoritative_epoch_secs = Some(epoch);
                ResyncOutcome::Synced
            }
            Err(e) => {
                warn!("Time resync failed ({}): {}", e.kind(), e);
                ResyncOutcome::Failed
            }
        }
    }

    /// Wall-clock fields of the current estimate (offset already applied)
    pub fn wall_clock(&self) -> Option<NaiveDateTime> {
        self.state
            .authoritative_epoch_secs
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .map(|dt| dt.naive_utc())
    }

    /// 0 = Sunday .. 6 = Saturday, `None` while the time is unknown
    pub fn current_day_of_week(&self) -> Option<u32> {
        self.wall_clock().map(|dt| dt.weekday().num_days_from_sunday())
    }

    pub fn format_display_time(&self) -> ClockText {
        format_clock_text(self.wall_clock(), self.labels)
    }

    pub fn is_known(&self) -> bool {
        self.state.authoritative_epoch_secs.is_some()
    }

    pub fn labels(&self) -> WeekdayLabels {
        self.labels
    }

    pub fn state(&self) -> &ClockState {
        &self.state
    }
}

/// "<Weekday> DD.MM.YYYY HH:MM:SS", or the placeholder for an unknown time
pub fn format_clock_text(when: Option<NaiveDateTime>, labels: WeekdayLabels) -> ClockText {
    let mut buf = ClockText::new();
    match when {
        Some(dt) => {
            let _ = write!(
                &mut buf,
                "{} {}",
                labels.name(dt.weekday()),
                dt.format("%d.%m.%Y %H:%M:%S")
            );
        }
        None => {
            let _ = buf.try_push_str(UNKNOWN_TIME_TEXT);
        }
    }
    buf
}

/*
 *  dashboard.rs
 *
 *  smart-display - weather & clock panel
 *  (c) 2020-26 Stuart Hunter
 *
 *  Driver: owns the clock, the weekday slots and the display sink
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

use log::{debug, info, warn};
use std::time::Duration;

use crate::clock::{ClockService, ResyncOutcome, TimeSource};
use crate::display::DisplaySink;
use crate::error::FeedError;
use crate::forecast::{self, ForecastSource, HOURS_PER_DAY};
use crate::slots::{self, WeekdaySlots};

/// What one `step` did
#[derive(Debug)]
pub struct StepReport {
    pub ticked: bool,
    pub resync: ResyncOutcome,
    /// `None` when the forecast pipeline was not due (or the clock is unknown)
    pub forecast: Option<Result<usize, FeedError>>,
}

/// Single owner of all mutable display state.
///
/// Everything runs on the caller's task, one operation at a time, so the
/// clock state and the slot array never see concurrent writers.
pub struct Dashboard<T: TimeSource, F: ForecastSource, S: DisplaySink> {
    clock: ClockService<T>,
    forecast: F,
    sink: S,
    slots: WeekdaySlots,
    forecast_days: usize,
    forecast_interval_ms: u64,
    /// `None` until the pipeline has run once
    last_forecast_mark_ms: Option<u64>,
}

impl<T: TimeSource, F: ForecastSource, S: DisplaySink> Dashboard<T, F, S> {
    pub fn new(
        clock: ClockService<T>,
        forecast: F,
        sink: S,
        forecast_days: usize,
        forecast_interval: Duration,
    ) -> Self {
        Self {
            clock,
            forecast,
            sink,
            slots: WeekdaySlots::default(),
            forecast_days,
            forecast_interval_ms: forecast_interval.as_millis() as u64,
            last_forecast_mark_ms: None,
        }
    }

    /// Initial time fetch, static weekday names, clock label and, when the
    /// time is known, the first forecast.
    pub async fn start(&mut self, now_ms: u64) -> bool {
        let known = self.clock.initialize(now_ms).await;
        self.publish_weekday_names();
        self.publish_clock();

        if known {
            if let Err(e) = self.refresh_forecast(now_ms).await {
                debug!("Initial forecast not shown: {}", e);
            }
        } else {
            warn!("Starting without time, forecast waits for the first sync");
        }
        known
    }

    /// One driver cadence: tick, maybe resync, maybe refresh the forecast.
    pub async fn step(&mut self, now_ms: u64) -> StepReport {
        let ticked = self.clock.tick(now_ms);
        let resync = self.clock.maybe_resync(now_ms).await;
        if ticked || resync == ResyncOutcome::Synced {
            self.publish_clock();
        }

        let forecast = if self.forecast_due(now_ms) {
            Some(self.refresh_forecast(now_ms).await)
        } else {
            None
        };

        StepReport { ticked, resync, forecast }
    }

    fn forecast_due(&self, now_ms: u64) -> bool {
        if !self.clock.is_known() {
            return false;
        }
        match self.last_forecast_mark_ms {
            Some(mark) => now_ms.saturating_sub(mark) >= self.forecast_interval_ms,
            None => true,
        }
    }

    /// fetch -> parse -> summarize -> project -> highlight -> display.
    ///
    /// Returns the number of days written. On any error the slots and the
    /// chart keep their previous content. The forecast period restarts
    /// whatever the outcome, except when the time is still unknown: then
    /// nothing is fetched and `Ok(0)` is returned.
    pub async fn refresh_forecast(&mut self, now_ms: u64) -> Result<usize, FeedError> {
        let Some(today) = self.clock.current_day_of_week() else {
            debug!("Forecast skipped, time unknown");
            return Ok(0);
        };
        self.last_forecast_mark_ms = Some(now_ms);

        match self.run_pipeline(today).await {
            Ok(days) => {
                info!("Forecast updated: {} days", days);
                Ok(days)
            }
            Err(e) => {
                warn!("Forecast update failed ({}): {}", e.kind(), e);
                Err(e)
            }
        }
    }

    async fn run_pipeline(&mut self, today: u32) -> Result<usize, FeedError> {
        let raw = self.forecast.fetch_forecast().await?;
        let series = forecast::parse(&raw)?;
        let summaries = forecast::summarize_days(&series, self.forecast_days)?;

        // build the new slot array aside, commit in one assignment
        let mut next = slots::project(&self.slots, &summaries, Some(today));
        if let Some(index) = slots::monday_index(today) {
            slots::highlight(&mut next, index);
        }
        self.slots = next;

        self.publish_slots();
        let points = forecast::chart_points(&series, self.forecast_days * HOURS_PER_DAY);
        if let Err(e) = self.sink.set_chart_points(&points) {
            warn!("Chart update failed: {}", e);
        }
        Ok(summaries.len())
    }

    fn publish_clock(&mut self) {
        let text = self.clock.format_display_time();
        if let Err(e) = self.sink.set_clock_text(&text) {
            warn!("Clock label update failed: {}", e);
        }
    }

    fn publish_weekday_names(&mut self) {
        let labels = self.clock.labels();
        for (i, slot) in self.slots.iter().enumerate() {
            if let Err(e) = self.sink.set_weekday_label(i, labels.name(slot.weekday)) {
                warn!("Weekday label {} update failed: {}", i, e);
                return;
            }
        }
    }

    /// Names go out with every slot update so a display that failed
    /// at startup gets them once it recovers.
    fn publish_slots(&mut self) {
        self.publish_weekday_names();
        for (i, slot) in self.slots.iter().enumerate() {
            if let Err(e) = self.sink.write_slot(i, slot) {
                warn!("Slot {} update failed: {}", i, e);
                return;
            }
        }
    }

    pub fn clock(&self) -> &ClockService<T> {
        &self.clock
    }

    pub fn slots(&self) -> &WeekdaySlots {
        &self.slots
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::WeekdayLabels;
    use crate::display::{MockSink, SlotStyle};
    use std::cell::Cell;

    // 2025-12-23 21:53:49 UTC, a Tuesday once the hour is added
    const SAMPLE_EPOCH: i64 = 1_766_526_829;

    struct FixedTime(Option<i64>);

    impl TimeSource for FixedTime {
        async fn fetch_unix_time(&self) -> Result<i64, FeedError> {
            self.0.ok_or_else(|| FeedError::NetworkUnavailable("offline".into()))
        }
    }

    struct CountingForecast {
        body: Vec<u8>,
        calls: Cell<usize>,
    }

    impl ForecastSource for CountingForecast {
        async fn fetch_forecast(&self) -> Result<Vec<u8>, FeedError> {
            self.calls.set(self.calls.get() + 1);
            Ok(self.body.clone())
        }
    }

    fn flat_week_body() -> Vec<u8> {
        let time: Vec<String> = (0..7 * 24)
            .map(|h| format!("2025-12-{:02}T{:02}:00", 23 + h / 24, h % 24))
            .collect();
        let temps: Vec<f64> = (0..7 * 24).map(|h| (h / 24) as f64).collect();
        serde_json::json!({"hourly": {"time": time, "temperature_2m": temps}})
            .to_string()
            .into_bytes()
    }

    fn dashboard(epoch: Option<i64>) -> (Dashboard<FixedTime, CountingForecast, MockSink>, MockSink) {
        let clock = ClockService::new(FixedTime(epoch), 3600, Duration::from_secs(60), WeekdayLabels::En);
        let forecast = CountingForecast { body: flat_week_body(), calls: Cell::new(0) };
        let display = MockSink::new();
        let board = Dashboard::new(clock, forecast, display.clone(), 7, Duration::from_secs(300));
        (board, display)
    }

    #[tokio::test]
    async fn test_start_fills_everything() {
        let (mut board, display) = dashboard(Some(SAMPLE_EPOCH));
        assert!(board.start(0).await);

        let state = display.snapshot();
        assert_eq!(state.clock_text, "Tue 23.12.2025 22:53:49");
        assert_eq!(state.weekday_labels[0], "Mon");
        assert_eq!(state.weekday_labels[6], "Sun");
        // day 0 on Tuesday
        assert_eq!(state.date_labels[1], "23");
        assert_eq!(state.min_max_labels[1], "0 / 0");
        assert_eq!(state.date_labels[0], "29");
        assert_eq!(state.accent_slots(), vec![1]);
        assert_eq!(state.chart_points.len(), 168);
        assert_eq!(board.slots().today_index(), Some(1));
    }

    #[tokio::test]
    async fn test_forecast_waits_for_interval() {
        let (mut board, _display) = dashboard(Some(SAMPLE_EPOCH));
        board.start(0).await;

        let report = board.step(299_000).await;
        assert!(report.forecast.is_none());
        let report = board.step(300_000).await;
        assert!(matches!(report.forecast, Some(Ok(7))));
        assert_eq!(board.forecast.calls.get(), 2);
    }

    #[tokio::test]
    async fn test_unknown_time_skips_forecast() {
        let (mut board, display) = dashboard(None);
        assert!(!board.start(0).await);

        let report = board.step(400_000).await;
        assert!(report.forecast.is_none());
        assert_eq!(board.refresh_forecast(400_000).await.unwrap(), 0);
        assert_eq!(board.forecast.calls.get(), 0);

        let state = display.snapshot();
        assert_eq!(state.clock_text, "Invalid Time");
        assert!(state.styles.iter().all(|s| *s == SlotStyle::Default));
    }
}

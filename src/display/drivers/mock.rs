/*
 *  display/drivers/mock.rs
 *
 *  smart-display - weather & clock panel
 *  (c) 2020-26 Stuart Hunter
 *
 *  Mock display sink for testing without a presentation layer
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

use std::sync::{Arc, Mutex, MutexGuard};

use crate::display::error::DisplayError;
use crate::display::traits::{DisplaySink, SlotStyle};
use crate::slots::SLOT_COUNT;

/// Mock sink for testing
///
/// Records every label write. Clones share state, so a test can hand one
/// clone to the dashboard and inspect the other.
#[derive(Debug, Clone, Default)]
pub struct MockSink {
    state: Arc<Mutex<MockSinkState>>,
}

/// Recorded label contents (shared for inspection in tests)
#[derive(Debug, Default, Clone)]
pub struct MockSinkState {
    pub clock_text: String,
    pub weekday_labels: [String; SLOT_COUNT],
    pub date_labels: [String; SLOT_COUNT],
    pub min_max_labels: [String; SLOT_COUNT],
    pub styles: [SlotStyle; SLOT_COUNT],
    pub chart_points: Vec<i32>,

    /// Number of clock label writes
    pub clock_writes: usize,

    /// Number of completed slot writes (style is written last)
    pub slot_writes: usize,

    /// Number of chart updates
    pub chart_writes: usize,

    /// Simulate failures (for error testing)
    pub simulate_failure: bool,
}

impl MockSinkState {
    /// Slots currently styled as today
    pub fn accent_slots(&self) -> Vec<usize> {
        self.styles
            .iter()
            .enumerate()
            .filter(|(_, s)| **s == SlotStyle::Accent)
            .map(|(i, _)| i)
            .collect()
    }
}

impl MockSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the current state
    pub fn snapshot(&self) -> MockSinkState {
        self.lock().clone()
    }

    pub fn set_failure(&self, fail: bool) {
        self.lock().simulate_failure = fail;
    }

    fn lock(&self) -> MutexGuard<'_, MockSinkState> {
        // a panicking test thread must not hide the recorded state
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write<F>(&mut self, slot: Option<usize>, apply: F) -> Result<(), DisplayError>
    where
        F: FnOnce(&mut MockSinkState),
    {
        let mut state = self.lock();
        if state.simulate_failure {
            return Err(DisplayError::Other("Simulated sink failure".to_string()));
        }
        if let Some(index) = slot {
            if index >= SLOT_COUNT {
                return Err(DisplayError::UnknownSlot(index));
            }
        }
        apply(&mut state);
        Ok(())
    }
}

impl DisplaySink for MockSink {
    fn set_clock_text(&mut self, text: &str) -> Result<(), DisplayError> {
        self.write(None, |s| {
            s.clock_text = text.to_string();
            s.clock_writes += 1;
        })
    }

    fn set_weekday_label(&mut self, slot: usize, name: &str) -> Result<(), DisplayError> {
        self.write(Some(slot), |s| s.weekday_labels[slot] = name.to_string())
    }

    fn set_date_label(&mut self, slot: usize, text: &str) -> Result<(), DisplayError> {
        self.write(Some(slot), |s| s.date_labels[slot] = text.to_string())
    }

    fn set_min_max_label(&mut self, slot: usize, text: &str) -> Result<(), DisplayError> {
        self.write(Some(slot), |s| s.min_max_labels[slot] = text.to_string())
    }

    fn set_slot_style(&mut self, slot: usize, style: SlotStyle) -> Result<(), DisplayError> {
        self.write(Some(slot), |s| {
            s.styles[slot] = style;
            s.slot_writes += 1;
        })
    }

    fn set_chart_points(&mut self, points: &[i32]) -> Result<(), DisplayError> {
        self.write(None, |s| {
            s.chart_points = points.to_vec();
            s.chart_writes += 1;
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_state() {
        let display = MockSink::new();
        let mut sink = display.clone();
        sink.set_clock_text("Mon 01.01.2024 00:00:00").unwrap();
        sink.set_slot_style(3, SlotStyle::Accent).unwrap();

        let state = display.snapshot();
        assert_eq!(state.clock_text, "Mon 01.01.2024 00:00:00");
        assert_eq!(state.clock_writes, 1);
        assert_eq!(state.accent_slots(), vec![3]);
    }

    #[test]
    fn test_simulated_failure() {
        let mut sink = MockSink::new();
        sink.set_failure(true);
        assert!(sink.set_chart_points(&[1, 2]).is_err());
        assert_eq!(sink.snapshot().chart_writes, 0);
    }

    #[test]
    fn test_unknown_slot() {
        let mut sink = MockSink::new();
        assert_eq!(sink.set_weekday_label(SLOT_COUNT, "X"), Err(DisplayError::UnknownSlot(7)));
    }
}

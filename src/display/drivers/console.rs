/*
 *  display/drivers/console.rs
 *
 *  smart-display - weather & clock panel
 *  (c) 2020-26 Stuart Hunter
 *
 *  Headless sink - every label change goes to the log
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

use log::{debug, info};

use crate::display::error::DisplayError;
use crate::display::traits::{DisplaySink, SlotStyle};
use crate::slots::SLOT_COUNT;

#[derive(Debug, Clone, Default)]
struct SlotLabels {
    name: String,
    date: String,
    min_max: String,
    style: SlotStyle,
}

/// Keeps the last written labels so a completed slot update can be
/// logged as one readable line.
#[derive(Debug, Default)]
pub struct ConsoleSink {
    clock: String,
    slots: [SlotLabels; SLOT_COUNT],
}

impl ConsoleSink {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot_mut(&mut self, slot: usize) -> Result<&mut SlotLabels, DisplayError> {
        self.slots.get_mut(slot).ok_or(DisplayError::UnknownSlot(slot))
    }

    /// One line for the whole week, today in brackets
    pub fn summary_line(&self) -> String {
        self.slots
            .iter()
            .map(|s| {
                let cell = format!("{} {} {}", s.name, s.date, s.min_max);
                match s.style {
                    SlotStyle::Accent => format!("[{}]", cell.trim()),
                    SlotStyle::Default => cell.trim().to_string(),
                }
            })
            .collect::<Vec<_>>()
            .join(" | ")
    }
}

impl DisplaySink for ConsoleSink {
    fn set_clock_text(&mut self, text: &str) -> Result<(), DisplayError> {
        if self.clock != text {
            debug!("clock: {}", text);
            self.clock = text.to_string();
        }
        Ok(())
    }

    fn set_weekday_label(&mut self, slot: usize, name: &str) -> Result<(), DisplayError> {
        self.slot_mut(slot)?.name = name.to_string();
        Ok(())
    }

    fn set_date_label(&mut self, slot: usize, text: &str) -> Result<(), DisplayError> {
        self.slot_mut(slot)?.date = text.to_string();
        Ok(())
    }

    fn set_min_max_label(&mut self, slot: usize, text: &str) -> Result<(), DisplayError> {
        self.slot_mut(slot)?.min_max = text.to_string();
        Ok(())
    }

    fn set_slot_style(&mut self, slot: usize, style: SlotStyle) -> Result<(), DisplayError> {
        self.slot_mut(slot)?.style = style;
        // style is the last write of a slot update
        if slot == SLOT_COUNT - 1 {
            info!("week: {}", self.summary_line());
        }
        Ok(())
    }

    fn set_chart_points(&mut self, points: &[i32]) -> Result<(), DisplayError> {
        if let (Some(lo), Some(hi)) = (points.iter().min(), points.iter().max()) {
            info!("chart: {} points, {}..{} deg", points.len(), lo, hi);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_line_marks_today() {
        let mut sink = ConsoleSink::new();
        sink.set_weekday_label(0, "Mon").unwrap();
        sink.set_date_label(0, "22").unwrap();
        sink.set_min_max_label(0, "1 / 7").unwrap();
        sink.set_slot_style(0, SlotStyle::Accent).unwrap();
        sink.set_weekday_label(1, "Tue").unwrap();

        let line = sink.summary_line();
        assert!(line.starts_with("[Mon 22 1 / 7] | Tue"));
    }

    #[test]
    fn test_rejects_unknown_slot() {
        let mut sink = ConsoleSink::new();
        assert_eq!(sink.set_date_label(7, "01"), Err(DisplayError::UnknownSlot(7)));
    }
}

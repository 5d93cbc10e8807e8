/*
 *  display/traits.rs
 *
 *  smart-display - weather & clock panel
 *  (c) 2020-26 Stuart Hunter
 *
 *  Core trait definition for the presentation layer
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

use crate::display::error::DisplayError;
use crate::slots::{SLOT_COUNT, WeekdaySlot};

/// Visual state of a weekday slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SlotStyle {
    /// Today
    Accent,
    #[default]
    Default,
}

/// Named label slots owned by the presentation layer.
///
/// The core only writes text and styles. Widget creation, layout and
/// teardown belong to whoever implements this. Slot indices are
/// Monday-first, 0..=6.
pub trait DisplaySink {
    /// The date/time label
    fn set_clock_text(&mut self, text: &str) -> Result<(), DisplayError>;

    /// Weekday name above slot `slot`
    fn set_weekday_label(&mut self, slot: usize, name: &str) -> Result<(), DisplayError>;

    /// Two-digit day of month for slot `slot`
    fn set_date_label(&mut self, slot: usize, text: &str) -> Result<(), DisplayError>;

    /// "min / max" text for slot `slot`
    fn set_min_max_label(&mut self, slot: usize, text: &str) -> Result<(), DisplayError>;

    fn set_slot_style(&mut self, slot: usize, style: SlotStyle) -> Result<(), DisplayError>;

    /// Replace the temperature chart series, whole degrees
    fn set_chart_points(&mut self, points: &[i32]) -> Result<(), DisplayError>;

    /// Write one slot's content and style
    fn write_slot(&mut self, index: usize, slot: &WeekdaySlot) -> Result<(), DisplayError> {
        if index >= SLOT_COUNT {
            return Err(DisplayError::UnknownSlot(index));
        }
        self.set_date_label(index, &slot.date_text)?;
        self.set_min_max_label(index, &slot.min_max_text)?;
        self.set_slot_style(index, slot.style())
    }
}

/*
 *  lib.rs
 *
 *  smart-display - weather & clock panel
 *  (c) 2020-26 Stuart Hunter
 *
 *  Library root, shared by the binary and the integration tests
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

pub mod error;
pub mod config;
pub mod http;
pub mod location;
pub mod clock;
pub mod forecast;
pub mod slots;
pub mod display;
pub mod dashboard;

pub use clock::{ClockService, ClockState, HttpTimeSource, Monotonic, TimeSource, WeekdayLabels};
pub use dashboard::{Dashboard, StepReport};
pub use error::FeedError;
pub use forecast::{DaySummary, ForecastSource, HourlySeries, HttpForecastSource};
pub use slots::{WeekdaySlot, WeekdaySlots};

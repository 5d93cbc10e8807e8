/*
 *  slots.rs
 *
 *  smart-display - weather & clock panel
 *  (c) 2020-26 Stuart Hunter
 *
 *  Seven fixed Mon..Sun forecast slots, rotated onto the current weekday
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

use chrono::Weekday;

use crate::display::SlotStyle;
use crate::forecast::DaySummary;

pub const SLOT_COUNT: usize = 7;

/// One fixed display position. Content is whatever was last projected
/// onto it; a failed update never clears it.
#[derive(Debug, Clone, PartialEq)]
pub struct WeekdaySlot {
    pub weekday: Weekday,
    pub date_text: String,
    pub min_max_text: String,
    pub is_today: bool,
}

impl WeekdaySlot {
    fn blank(weekday: Weekday) -> Self {
        Self {
            weekday,
            date_text: String::new(),
            min_max_text: String::new(),
            is_today: false,
        }
    }

    pub fn style(&self) -> SlotStyle {
        if self.is_today { SlotStyle::Accent } else { SlotStyle::Default }
    }
}

/// The Mon..Sun slot array, index 0 is Monday
#[derive(Debug, Clone, PartialEq)]
pub struct WeekdaySlots {
    slots: [WeekdaySlot; SLOT_COUNT],
}

impl Default for WeekdaySlots {
    fn default() -> Self {
        let mut day = Weekday::Mon;
        let slots = std::array::from_fn(|_| {
            let slot = WeekdaySlot::blank(day);
            day = day.succ();
            slot
        });
        Self { slots }
    }
}

impl WeekdaySlots {
    pub fn get(&self, index: usize) -> Option<&WeekdaySlot> {
        self.slots.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &WeekdaySlot> {
        self.slots.iter()
    }

    /// Index of the highlighted slot, if any
    pub fn today_index(&self) -> Option<usize> {
        self.slots.iter().position(|s| s.is_today)
    }
}

/// Sunday-based day of week (0..=6) to Monday-first slot index.
/// Anything outside 0..=6 has no slot.
pub fn monday_index(today: u32) -> Option<usize> {
    match today {
        0 => Some(SLOT_COUNT - 1),
        1..=6 => Some(today as usize - 1),
        _ => None,
    }
}

/// Write `summaries` onto a copy of `prior`, day 0 on today's slot and
/// following days wrapping forward through Mon..Sun.
///
/// With no usable day-of-week the copy is returned unchanged. At most
/// seven summaries are placed so no slot is written twice. Highlight
/// state is left as it was; see [`highlight`].
pub fn project(prior: &WeekdaySlots, summaries: &[DaySummary], today: Option<u32>) -> WeekdaySlots {
    let mut next = prior.clone();
    let Some(start) = today.and_then(monday_index) else {
        return next;
    };
    for (i, day) in summaries.iter().take(SLOT_COUNT).enumerate() {
        let slot = &mut next.slots[(start + i) % SLOT_COUNT];
        slot.date_text = day.date_text();
        slot.min_max_text = day.min_max_text();
    }
    next
}

/// Mark `today` and clear every other slot. Idempotent. An index with
/// no slot leaves the highlight as it was.
pub fn highlight(slots: &mut WeekdaySlots, today: usize) {
    if today >= SLOT_COUNT {
        return;
    }
    for (i, slot) in slots.slots.iter_mut().enumerate() {
        slot.is_today = i == today;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn week() -> Vec<DaySummary> {
        (0..7)
            .map(|i| DaySummary {
                day_of_month: 24 + i,
                min_temp: -(i as f64),
                max_temp: 10.0 + i as f64,
            })
            .collect()
    }

    #[test]
    fn test_monday_index() {
        assert_eq!(monday_index(0), Some(6));
        assert_eq!(monday_index(1), Some(0));
        assert_eq!(monday_index(6), Some(5));
        assert_eq!(monday_index(7), None);
    }

    #[test]
    fn test_default_slots_are_mon_to_sun() {
        let slots = WeekdaySlots::default();
        let days: Vec<Weekday> = slots.iter().map(|s| s.weekday).collect();
        assert_eq!(days.first(), Some(&Weekday::Mon));
        assert_eq!(days.last(), Some(&Weekday::Sun));
        assert_eq!(slots.today_index(), None);
    }

    #[test]
    fn test_rotation_from_wednesday() {
        let slots = project(&WeekdaySlots::default(), &week(), Some(3));

        let wed = slots.get(2).unwrap();
        assert_eq!(wed.weekday, Weekday::Wed);
        assert_eq!(wed.date_text, "24");
        assert_eq!(wed.min_max_text, "0 / 10");

        // day 4 lands on Sunday
        let sun = slots.get(6).unwrap();
        assert_eq!(sun.date_text, "28");
        assert_eq!(sun.min_max_text, "-4 / 14");

        // day 6 wraps round to Tuesday
        let tue = slots.get(1).unwrap();
        assert_eq!(tue.weekday, Weekday::Tue);
        assert_eq!(tue.date_text, "30");
    }

    #[test]
    fn test_sunday_starts_on_last_slot() {
        let slots = project(&WeekdaySlots::default(), &week()[..2], Some(0));
        assert_eq!(slots.get(6).unwrap().date_text, "24");
        assert_eq!(slots.get(0).unwrap().date_text, "25");
        // untouched
        assert_eq!(slots.get(1).unwrap().date_text, "");
    }

    #[test]
    fn test_project_is_pure() {
        let prior = WeekdaySlots::default();
        let a = project(&prior, &week(), Some(5));
        let b = project(&prior, &week(), Some(5));
        assert_eq!(a, b);
        assert_eq!(prior, WeekdaySlots::default());
    }

    #[test]
    fn test_unknown_day_keeps_prior_content() {
        let prior = project(&WeekdaySlots::default(), &week(), Some(1));
        let next = project(&prior, &week()[3..], None);
        assert_eq!(next, prior);
    }

    #[test]
    fn test_highlight_is_exclusive() {
        let mut slots = WeekdaySlots::default();
        highlight(&mut slots, 4);
        highlight(&mut slots, 2);
        assert_eq!(slots.iter().filter(|s| s.is_today).count(), 1);
        assert_eq!(slots.today_index(), Some(2));
        assert_eq!(slots.get(2).unwrap().style(), SlotStyle::Accent);
        assert_eq!(slots.get(4).unwrap().style(), SlotStyle::Default);

        let once = slots.clone();
        highlight(&mut slots, 2);
        assert_eq!(slots, once);
    }

    #[test]
    fn test_highlight_ignores_out_of_range_index() {
        let mut slots = WeekdaySlots::default();
        highlight(&mut slots, 2);
        highlight(&mut slots, SLOT_COUNT);
        highlight(&mut slots, 42);
        assert_eq!(slots.iter().filter(|s| s.is_today).count(), 1);
        assert_eq!(slots.today_index(), Some(2));
    }
}

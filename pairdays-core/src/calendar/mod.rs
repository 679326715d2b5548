//! Calendar view state: which month is showing and which day is selected.

mod grid;

pub use grid::{
    CalendarCell, MonthGrid, Week, WeekdayHeader, first_of_month, index_events, is_weekend,
    last_of_month, weekday_headers,
};

use chrono::{Duration, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::constants::NAVIGATION_JUMP_DAYS;
use crate::event::Event;

/// How the previous/next controls move the anchor date.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MonthStep {
    /// Shift by a raw 30 days. From the 31st this can skip a short month
    /// entirely, and from the 1st of a 31-day month it can land in the same
    /// month again.
    #[default]
    ThirtyDays,
    /// Shift by one calendar month (day clamped to the month's length).
    CalendarMonth,
}

#[derive(Debug, Clone)]
pub struct CalendarView {
    anchor: NaiveDate,
    selected: Option<NaiveDate>,
    step: MonthStep,
}

impl CalendarView {
    pub fn new(anchor: NaiveDate, step: MonthStep) -> Self {
        CalendarView {
            anchor,
            selected: None,
            step,
        }
    }

    pub fn anchor(&self) -> NaiveDate {
        self.anchor
    }

    pub fn next(&mut self) {
        self.anchor = match self.step {
            MonthStep::ThirtyDays => self
                .anchor
                .checked_add_signed(Duration::days(NAVIGATION_JUMP_DAYS))
                .unwrap_or(self.anchor),
            MonthStep::CalendarMonth => self
                .anchor
                .checked_add_months(Months::new(1))
                .unwrap_or(self.anchor),
        };
    }

    pub fn previous(&mut self) {
        self.anchor = match self.step {
            MonthStep::ThirtyDays => self
                .anchor
                .checked_sub_signed(Duration::days(NAVIGATION_JUMP_DAYS))
                .unwrap_or(self.anchor),
            MonthStep::CalendarMonth => self
                .anchor
                .checked_sub_months(Months::new(1))
                .unwrap_or(self.anchor),
        };
    }

    /// Select a day, replacing any previous selection.
    pub fn select(&mut self, date: NaiveDate) {
        self.selected = Some(date);
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    pub fn selected(&self) -> Option<NaiveDate> {
        self.selected
    }

    pub fn is_selected(&self, date: NaiveDate) -> bool {
        self.selected == Some(date)
    }

    pub fn grid(&self, events: &[Event]) -> MonthGrid {
        MonthGrid::build(self.anchor, events)
    }

    /// "March 2025"
    pub fn title(&self) -> String {
        self.anchor.format("%B %Y").to_string()
    }
}

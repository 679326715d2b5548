//! Month grid computation and event-to-day binning.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use std::collections::BTreeMap;

use crate::event::Event;

/// One day's slot in the rendered month.
#[derive(Debug, Clone, PartialEq)]
pub struct CalendarCell {
    pub date: NaiveDate,
    /// False for the leading/trailing days borrowed from adjacent months
    pub in_current_month: bool,
    pub is_weekend: bool,
    /// Events on this date, by start time (ties keep list order)
    pub events: Vec<Event>,
}

/// Seven consecutive days, Sunday first.
#[derive(Debug, Clone, PartialEq)]
pub struct Week {
    pub days: [CalendarCell; 7],
}

/// All the weeks needed to show one month: from the Sunday on/before the 1st
/// to the Saturday on/after the last day.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthGrid {
    pub year: i32,
    pub month: u32,
    pub weeks: Vec<Week>,
}

/// Day-of-week column header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekdayHeader {
    pub weekday: Weekday,
    pub label: &'static str,
    pub is_weekend: bool,
}

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

pub fn last_of_month(date: NaiveDate) -> NaiveDate {
    let first = first_of_month(date);
    let next_first = if first.month() == 12 {
        NaiveDate::from_ymd_opt(first.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(first.year(), first.month() + 1, 1)
    };
    next_first.and_then(|d| d.pred_opt()).unwrap_or(first)
}

// Both clamp at the ends of the representable range instead of overflowing.
fn start_of_week(date: NaiveDate) -> NaiveDate {
    date.checked_sub_signed(Duration::days(date.weekday().num_days_from_sunday() as i64))
        .unwrap_or(NaiveDate::MIN)
}

fn end_of_week(date: NaiveDate) -> NaiveDate {
    date.checked_add_signed(Duration::days(6 - date.weekday().num_days_from_sunday() as i64))
        .unwrap_or(NaiveDate::MAX)
}

/// Group events by date once per render. Within a day events are ordered by
/// start time; the sort is stable so equal start times keep the order they
/// arrived in.
pub fn index_events(events: &[Event]) -> BTreeMap<NaiveDate, Vec<Event>> {
    let mut by_date: BTreeMap<NaiveDate, Vec<Event>> = BTreeMap::new();
    for event in events {
        by_date.entry(event.date).or_default().push(event.clone());
    }
    for day in by_date.values_mut() {
        day.sort_by_key(|e| e.start_time);
    }
    by_date
}

/// Sunday-first column headers.
pub fn weekday_headers() -> [WeekdayHeader; 7] {
    const LABELS: [(Weekday, &str); 7] = [
        (Weekday::Sun, "Sun"),
        (Weekday::Mon, "Mon"),
        (Weekday::Tue, "Tue"),
        (Weekday::Wed, "Wed"),
        (Weekday::Thu, "Thu"),
        (Weekday::Fri, "Fri"),
        (Weekday::Sat, "Sat"),
    ];
    LABELS.map(|(weekday, label)| WeekdayHeader {
        weekday,
        label,
        is_weekend: matches!(weekday, Weekday::Sat | Weekday::Sun),
    })
}

impl MonthGrid {
    /// Build the grid for the month containing `reference`.
    pub fn build(reference: NaiveDate, events: &[Event]) -> Self {
        let month_start = first_of_month(reference);
        let month_end = last_of_month(reference);
        let grid_start = start_of_week(month_start);
        let grid_end = end_of_week(month_end);

        let mut by_date = index_events(events);
        let total_days = (grid_end - grid_start).num_days() + 1;

        let weeks = (0..total_days / 7)
            .map(|w| Week {
                days: std::array::from_fn(|d| {
                    let date = grid_start + Duration::days(w * 7 + d as i64);
                    CalendarCell {
                        date,
                        in_current_month: date.month() == month_start.month()
                            && date.year() == month_start.year(),
                        is_weekend: is_weekend(date),
                        events: by_date.remove(&date).unwrap_or_default(),
                    }
                }),
            })
            .collect();

        MonthGrid {
            year: month_start.year(),
            month: month_start.month(),
            weeks,
        }
    }

    pub fn cells(&self) -> impl Iterator<Item = &CalendarCell> {
        self.weeks.iter().flat_map(|w| w.days.iter())
    }

    pub fn cell(&self, date: NaiveDate) -> Option<&CalendarCell> {
        self.cells().find(|c| c.date == date)
    }

    pub fn first_day(&self) -> Option<NaiveDate> {
        self.cells().next().map(|c| c.date)
    }

    pub fn last_day(&self) -> Option<NaiveDate> {
        self.cells().last().map(|c| c.date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{EventFields, NewEvent};
    use chrono::NaiveTime;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn event(title: &str, on: NaiveDate, start: (u32, u32), end: (u32, u32)) -> Event {
        let mut fields = EventFields::with_title(title);
        fields.start_time = NaiveTime::from_hms_opt(start.0, start.1, 0).unwrap();
        fields.end_time = NaiveTime::from_hms_opt(end.0, end.1, 0).unwrap();
        NewEvent::new(on, fields).into_event()
    }

    #[test]
    fn test_grid_shape_for_every_month_of_two_years() {
        for year in [2024, 2025] {
            for month in 1..=12 {
                let grid = MonthGrid::build(date(year, month, 15), &[]);
                let cells: Vec<_> = grid.cells().collect();

                assert_eq!(cells.len() % 7, 0);
                assert_eq!(grid.first_day().unwrap().weekday(), Weekday::Sun);
                assert_eq!(grid.last_day().unwrap().weekday(), Weekday::Sat);

                let month_days: Vec<_> = cells.iter().filter(|c| c.in_current_month).collect();
                assert_eq!(month_days.len() as u32, last_of_month(date(year, month, 1)).day());
                for (i, cell) in month_days.iter().enumerate() {
                    assert_eq!(cell.date.day(), i as u32 + 1);
                }

                // consecutive days, no repeats
                for pair in cells.windows(2) {
                    assert_eq!(pair[1].date, pair[0].date + Duration::days(1));
                }
            }
        }
    }

    #[test]
    fn test_february_2026_fits_four_weeks() {
        // Feb 1 2026 is a Sunday and Feb 28 a Saturday
        let grid = MonthGrid::build(date(2026, 2, 10), &[]);
        assert_eq!(grid.weeks.len(), 4);
        assert!(grid.cells().all(|c| c.in_current_month));
    }

    #[test]
    fn test_march_2025_spans_six_weeks() {
        // Mar 1 2025 is a Saturday
        let grid = MonthGrid::build(date(2025, 3, 1), &[]);
        assert_eq!(grid.weeks.len(), 6);
        assert_eq!(grid.first_day(), Some(date(2025, 2, 23)));
        assert_eq!(grid.last_day(), Some(date(2025, 4, 5)));
        assert!(!grid.cell(date(2025, 2, 23)).unwrap().in_current_month);
    }

    #[test]
    fn test_weekend_flags() {
        let grid = MonthGrid::build(date(2025, 3, 1), &[]);
        for week in &grid.weeks {
            assert!(week.days[0].is_weekend);
            assert!(week.days[6].is_weekend);
            assert!(week.days[1..6].iter().all(|c| !c.is_weekend));
        }
    }

    #[test]
    fn test_events_binned_by_date_and_sorted() {
        let day = date(2025, 3, 10);
        let late = event("Movie", day, (21, 0), (23, 0));
        let dinner = event("Dinner", day, (18, 0), (20, 0));
        let other = event("Lunch", date(2025, 3, 11), (12, 0), (13, 0));
        let far = event("Trip", date(2025, 7, 1), (8, 0), (9, 0));

        let grid = MonthGrid::build(day, &[late.clone(), other.clone(), dinner.clone(), far.clone()]);

        let cell = grid.cell(day).unwrap();
        assert_eq!(cell.events, vec![dinner, late]);
        assert_eq!(grid.cell(date(2025, 3, 11)).unwrap().events, vec![other]);
        assert!(grid.cells().all(|c| c.events.iter().all(|e| e.date == c.date)));
        assert!(!grid.cells().any(|c| c.events.contains(&far)));
    }

    #[test]
    fn test_equal_start_times_keep_insertion_order() {
        let day = date(2025, 3, 10);
        let first = event("First", day, (9, 0), (10, 0));
        let second = event("Second", day, (9, 0), (9, 30));

        let index = index_events(&[first.clone(), second.clone()]);
        assert_eq!(index[&day], vec![first, second]);
    }

    #[test]
    fn test_overflow_days_show_their_events() {
        // Feb 23 2025 is shown in March's grid
        let spill = event("Brunch", date(2025, 2, 23), (10, 0), (11, 0));
        let grid = MonthGrid::build(date(2025, 3, 5), std::slice::from_ref(&spill));
        assert_eq!(grid.cell(date(2025, 2, 23)).unwrap().events, vec![spill]);
    }

    #[test]
    fn test_weekday_headers() {
        let headers = weekday_headers();
        assert_eq!(headers[0].label, "Sun");
        assert!(headers[0].is_weekend && headers[6].is_weekend);
        assert!(!headers[3].is_weekend);
    }

    #[test]
    fn test_last_of_month() {
        assert_eq!(last_of_month(date(2024, 2, 3)), date(2024, 2, 29));
        assert_eq!(last_of_month(date(2025, 12, 31)), date(2025, 12, 31));
    }

    #[test]
    fn test_week_bounds_clamp_at_range_ends() {
        assert_eq!(start_of_week(NaiveDate::MIN), NaiveDate::MIN);
        assert_eq!(end_of_week(NaiveDate::MAX), NaiveDate::MAX);
        assert_eq!(start_of_week(date(2025, 3, 5)), date(2025, 3, 2));
        assert_eq!(end_of_week(date(2025, 3, 5)), date(2025, 3, 8));
    }
}

//! Terminal rendering for pairdays types.
//!
//! Extension traits that add colored output to pairdays-core types using
//! owo_colors.

use chrono::{Datelike, NaiveDate};
use owo_colors::OwoColorize;
use pairdays_core::calendar::{CalendarCell, CalendarView, MonthGrid, weekday_headers};
use pairdays_core::carousel::Carousel;
use pairdays_core::{Event, Memory, Message};

pub trait Render {
    fn render(&self) -> String;
}

impl Render for Event {
    fn render(&self) -> String {
        let mut line = format!("{} {}", self.time_range().cyan(), self.title.bold());
        if let Some(note) = self.note.as_deref().filter(|n| !n.is_empty()) {
            line.push_str(&format!(" {}", note.dimmed()));
        }
        line
    }
}

impl Render for Message {
    fn render(&self) -> String {
        format!(
            "{} {}  {}",
            self.created_at.format("%Y-%m-%d %H:%M").to_string().dimmed(),
            self.message,
            self.id.to_string().dimmed()
        )
    }
}

impl Render for Carousel {
    fn render(&self) -> String {
        self.dots()
            .into_iter()
            .map(|active| if active { "●" } else { "○" })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl Render for Memory {
    fn render(&self) -> String {
        let mut lines = vec![format!(
            "{}  {}",
            self.title.bold(),
            self.created_at.format("%Y-%m-%d").to_string().dimmed()
        )];
        if let Some(description) = &self.description {
            lines.push(format!("   {description}"));
        }
        match Carousel::new(self.images.len()) {
            Some(carousel) => lines.push(format!(
                "   {} {}",
                carousel.render(),
                pluralize("image", self.images.len()).dimmed()
            )),
            None => lines.push(format!("   {}", "no images".dimmed())),
        }
        lines.push(format!("   {}", self.id.to_string().dimmed()));
        lines.join("\n")
    }
}

fn pluralize(word: &str, count: usize) -> String {
    if count == 1 {
        format!("1 {word}")
    } else {
        format!("{count} {word}s")
    }
}

/// Day number padded to the cell width, with a dot when the day has events.
fn cell_label(cell: &CalendarCell) -> String {
    let marker = if cell.events.is_empty() { ' ' } else { '•' };
    format!("{:>3}{}", cell.date.day(), marker)
}

fn render_cell(cell: &CalendarCell, view: &CalendarView, today: NaiveDate) -> String {
    let label = cell_label(cell);
    if view.is_selected(cell.date) {
        return label.reversed().to_string();
    }
    if !cell.in_current_month {
        return label.dimmed().to_string();
    }
    let label = if cell.is_weekend {
        label.red().to_string()
    } else {
        label
    };
    if cell.date == today {
        label.bold().underline().to_string()
    } else {
        label
    }
}

/// Title line, weekday header, then one line per week.
pub fn render_month(grid: &MonthGrid, view: &CalendarView, today: NaiveDate) -> String {
    let mut lines = vec![format!("  {}", view.title().bold())];

    let header: String = weekday_headers()
        .iter()
        .map(|h| {
            let label = format!("{:>4}", h.label);
            if h.is_weekend {
                label.red().to_string()
            } else {
                label.dimmed().to_string()
            }
        })
        .collect();
    lines.push(header);

    for week in &grid.weeks {
        lines.push(
            week.days
                .iter()
                .map(|cell| render_cell(cell, view, today))
                .collect(),
        );
    }

    lines.join("\n")
}

/// A day's events, one per line, or a dimmed placeholder.
pub fn render_day(cell: &CalendarCell) -> String {
    let heading = cell.date.format("%A, %B %-d").to_string();
    if cell.events.is_empty() {
        return format!("  {}\n   {}", heading.bold(), "No events".dimmed());
    }

    let mut lines = vec![format!("  {}", heading.bold())];
    for event in &cell.events {
        lines.push(format!("   {}  {}", event.render(), event.id.to_string().dimmed()));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;
    use pairdays_core::calendar::MonthStep;
    use pairdays_core::{EventFields, NewEvent};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn dinner(day: NaiveDate) -> Event {
        let mut fields = EventFields::with_title("Dinner");
        fields.start_time = NaiveTime::from_hms_opt(18, 0, 0).unwrap();
        fields.end_time = NaiveTime::from_hms_opt(20, 0, 0).unwrap();
        NewEvent::new(day, fields).into_event()
    }

    #[test]
    fn month_has_title_header_and_one_line_per_week() {
        let view = CalendarView::new(date(2025, 3, 10), MonthStep::ThirtyDays);
        let grid = view.grid(&[]);
        let out = render_month(&grid, &view, date(2025, 3, 10));

        // March 2025 spans six Sunday-first weeks
        assert_eq!(out.lines().count(), 2 + 6);
        assert!(out.contains("March 2025"));
    }

    #[test]
    fn cell_label_marks_days_with_events() {
        let day = date(2025, 3, 10);
        let view = CalendarView::new(day, MonthStep::ThirtyDays);
        let grid = view.grid(&[dinner(day)]);

        assert_eq!(cell_label(grid.cell(day).unwrap()), " 10•");
        assert_eq!(cell_label(grid.cell(date(2025, 3, 11)).unwrap()), " 11 ");
    }

    #[test]
    fn day_lists_events() {
        let day = date(2025, 3, 10);
        let view = CalendarView::new(day, MonthStep::ThirtyDays);
        let grid = view.grid(&[dinner(day)]);

        let out = render_day(grid.cell(day).unwrap());
        assert!(out.contains("Monday, March 10"));
        assert!(out.contains("Dinner"));
        assert!(out.contains("18:00-20:00"));

        let empty = render_day(grid.cell(date(2025, 3, 12)).unwrap());
        assert!(empty.contains("No events"));
    }

    #[test]
    fn carousel_dots() {
        let mut carousel = Carousel::new(3).unwrap();
        carousel.set_active(1);
        assert_eq!(carousel.render(), "○ ● ○");
    }

    #[test]
    fn pluralize_counts() {
        assert_eq!(pluralize("image", 1), "1 image");
        assert_eq!(pluralize("image", 4), "4 images");
    }
}

use anyhow::Result;
use chrono::{Local, NaiveDate};
use owo_colors::OwoColorize;
use pairdays_core::calendar::CalendarView;
use pairdays_core::store::EventStore;

use super::{Context, parse_month};
use crate::render::{render_day, render_month};
use crate::utils::tui::spin;

pub async fn run(
    ctx: &Context,
    month: Option<&str>,
    next: u32,
    prev: u32,
    select: Option<NaiveDate>,
) -> Result<()> {
    let today = Local::now().date_naive();
    let anchor = match month {
        Some(m) => parse_month(m)?,
        None => today,
    };

    let mut view = CalendarView::new(anchor, ctx.config.calendar.month_step);
    for _ in 0..next {
        view.next();
    }
    for _ in 0..prev {
        view.previous();
    }
    if let Some(date) = select {
        view.select(date);
    }

    let mut store = EventStore::new(ctx.gateway.clone());
    spin("Loading events", store.list()).await?;

    let grid = view.grid(store.events());
    println!("{}", render_month(&grid, &view, today));

    if let Some(date) = view.selected() {
        println!();
        match grid.cell(date) {
            Some(cell) => println!("{}", render_day(cell)),
            None => println!(
                "  {}",
                format!("{date} is not in {}", view.title()).yellow()
            ),
        }
    }

    Ok(())
}

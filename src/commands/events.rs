use anyhow::{Context as _, Result};
use chrono::{Datelike, Local, NaiveDate, NaiveTime};
use dialoguer::{Confirm, Input};
use owo_colors::OwoColorize;
use pairdays_core::store::EventStore;
use pairdays_core::{EventFields, NewEvent};
use uuid::Uuid;

use super::{Context, parse_month};
use crate::render::Render;
use crate::utils::tui::spin;

pub async fn list(ctx: &Context, month: Option<&str>) -> Result<()> {
    let month = month.map(parse_month).transpose()?;

    let mut store = EventStore::new(ctx.gateway.clone());
    let events = spin("Loading events", store.list()).await?;

    let mut shown = 0;
    let mut last_date = None;
    for event in events.iter().filter(|e| {
        month.is_none_or(|m| e.date.year() == m.year() && e.date.month() == m.month())
    }) {
        if last_date != Some(event.date) {
            println!("{}", event.date.format("%a %Y-%m-%d").to_string().bold());
            last_date = Some(event.date);
        }
        println!("   {}  {}", event.render(), event.id.to_string().dimmed());
        shown += 1;
    }

    if shown == 0 {
        println!("{}", "No events".dimmed());
    }
    Ok(())
}

pub async fn add(
    ctx: &Context,
    title: Option<String>,
    date: Option<NaiveDate>,
    start: Option<String>,
    end: Option<String>,
    note: Option<String>,
) -> Result<()> {
    let interactive = title.is_none() || date.is_none();

    let title = match title {
        Some(t) => t,
        None => Input::<String>::new()
            .with_prompt("  Title")
            .interact_text()?,
    };

    let date = match date {
        Some(d) => d,
        None => prompt_with_retry("  Date (YYYY-MM-DD)", Some(Local::now().date_naive()), |s| {
            NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
                .with_context(|| format!("Invalid date '{s}'"))
        })?,
    };

    let mut fields = EventFields::with_title(title);

    fields.start_time = match start {
        Some(s) => parse_time(&s)?,
        None if interactive => prompt_with_retry("  Start", Some(fields.start_time), parse_time)?,
        None => fields.start_time,
    };
    fields.end_time = match end {
        Some(s) => parse_time(&s)?,
        None if interactive => prompt_with_retry("  End", Some(fields.end_time), parse_time)?,
        None => fields.end_time,
    };

    fields.note = match note {
        Some(n) => Some(n),
        None if interactive => Some(
            Input::<String>::new()
                .with_prompt("  Note (skip)")
                .default(String::new())
                .show_default(false)
                .interact_text()?,
        ),
        None => None,
    }
    .filter(|n| !n.trim().is_empty());

    let mut store = EventStore::new(ctx.gateway.clone());
    let event = spin("Saving event", store.create(NewEvent::new(date, fields))).await?;

    if interactive {
        println!();
    }
    println!(
        "{}",
        format!("  Created: {} on {}", event, event.date.format("%Y-%m-%d")).green()
    );
    Ok(())
}

pub async fn edit(
    ctx: &Context,
    id: Uuid,
    title: Option<String>,
    start: Option<String>,
    end: Option<String>,
    note: Option<String>,
) -> Result<()> {
    let mut store = EventStore::new(ctx.gateway.clone());
    spin("Loading events", store.list()).await?;

    let Some(event) = store.find(id) else {
        anyhow::bail!("Event {id} not found");
    };
    let mut fields = event.fields();

    if let Some(t) = title {
        fields.title = t;
    }
    if let Some(s) = start {
        fields.start_time = parse_time(&s)?;
    }
    if let Some(e) = end {
        fields.end_time = parse_time(&e)?;
    }
    if let Some(n) = note {
        fields.note = Some(n).filter(|n| !n.trim().is_empty());
    }

    spin("Saving event", store.update(id, fields)).await?;

    if let Some(updated) = store.find(id) {
        println!("{}", format!("  Updated: {updated}").green());
    }
    Ok(())
}

pub async fn delete(ctx: &Context, id: Uuid, yes: bool) -> Result<()> {
    let mut store = EventStore::new(ctx.gateway.clone());
    spin("Loading events", store.list()).await?;

    let Some(event) = store.find(id).cloned() else {
        anyhow::bail!("Event {id} not found");
    };

    if !yes
        && !Confirm::new()
            .with_prompt(format!("  Delete \"{}\"?", event.title))
            .default(false)
            .interact()?
    {
        return Ok(());
    }

    spin("Deleting event", store.delete(id)).await?;
    println!("{}", format!("  Deleted: {}", event.title).red());
    Ok(())
}

/// Parse "HH:MM" (or "HH:MM:SS").
fn parse_time(input: &str) -> Result<NaiveTime> {
    let input = input.trim();
    NaiveTime::parse_from_str(input, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(input, "%H:%M:%S"))
        .with_context(|| format!("Invalid time '{input}', expected HH:MM"))
}

/// Prompt the user with retry on parse errors.
fn prompt_with_retry<T, F>(prompt: &str, default: Option<T>, parse: F) -> Result<T>
where
    T: Copy + std::fmt::Display,
    F: Fn(&str) -> Result<T>,
{
    loop {
        let mut input = Input::<String>::new().with_prompt(prompt);
        if let Some(d) = default {
            input = input.default(d.to_string());
        }
        let answer = input.interact_text()?;
        match parse(&answer) {
            Ok(result) => return Ok(result),
            Err(e) => eprintln!("  {}", e.to_string().red()),
        }
    }
}

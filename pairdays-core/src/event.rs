//! Calendar events.
//!
//! Events belong to a calendar day (no time zone conversion) and carry a
//! wall-clock start and end time. They are shared by both partners, so rows
//! in the `events` table have no owner column.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::error::{PairDaysError, PairDaysResult};

/// A calendar event as stored in the `events` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: Uuid,
    pub title: String,
    /// Free-form extra details shown next to the title
    pub note: Option<String>,
    pub date: NaiveDate,
    #[serde(with = "crate::time_format")]
    pub start_time: NaiveTime,
    #[serde(with = "crate::time_format")]
    pub end_time: NaiveTime,
}

/// An event that hasn't been stored yet. The id is assigned on insert.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEvent {
    pub date: NaiveDate,
    pub fields: EventFields,
}

/// The user-editable fields of an event. The date of an existing event is
/// fixed; edits only touch these.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventFields {
    pub title: String,
    pub note: Option<String>,
    #[serde(with = "crate::time_format")]
    pub start_time: NaiveTime,
    #[serde(with = "crate::time_format")]
    pub end_time: NaiveTime,
}

impl EventFields {
    /// Default slot offered for a fresh event: 09:00 to 10:00.
    pub fn with_title(title: impl Into<String>) -> Self {
        EventFields {
            title: title.into(),
            note: None,
            start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap_or_default(),
            end_time: NaiveTime::from_hms_opt(10, 0, 0).unwrap_or_default(),
        }
    }

    pub fn validate(&self) -> PairDaysResult<()> {
        if self.start_time > self.end_time {
            return Err(PairDaysError::Validation(format!(
                "start time {} is after end time {}",
                self.start_time.format("%H:%M"),
                self.end_time.format("%H:%M")
            )));
        }
        Ok(())
    }
}

impl NewEvent {
    pub fn new(date: NaiveDate, fields: EventFields) -> Self {
        NewEvent { date, fields }
    }

    /// Assign a fresh id, producing the row to insert.
    pub fn into_event(self) -> Event {
        Event {
            id: Uuid::new_v4(),
            title: self.fields.title,
            note: self.fields.note,
            date: self.date,
            start_time: self.fields.start_time,
            end_time: self.fields.end_time,
        }
    }
}

impl Event {
    pub fn fields(&self) -> EventFields {
        EventFields {
            title: self.title.clone(),
            note: self.note.clone(),
            start_time: self.start_time,
            end_time: self.end_time,
        }
    }

    /// "18:00-20:00"
    pub fn time_range(&self) -> String {
        format!(
            "{}-{}",
            self.start_time.format("%H:%M"),
            self.end_time.format("%H:%M")
        )
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} ({})", self.title, self.time_range())?;
        if let Some(note) = self.note.as_deref().filter(|n| !n.is_empty()) {
            write!(f, " - {}", note)?;
        }
        Ok(())
    }
}

//! Wall-clock time (de)serialization.
//!
//! Times are written as `HH:MM`. Postgres `time` columns come back as
//! `HH:MM:SS`, so both forms are accepted on read.

use chrono::NaiveTime;
use serde::{Deserialize, Deserializer, Serializer};

pub fn parse(s: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(s, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
        .ok()
}

pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&time.format("%H:%M").to_string())
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
    let s = String::deserialize(deserializer)?;
    parse(&s).ok_or_else(|| serde::de::Error::custom(format!("invalid time '{s}', expected HH:MM")))
}

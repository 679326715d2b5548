//! Core types for pairdays.
//!
//! This crate holds everything that doesn't talk HTTP:
//! - the data model (`Event`, `Memory`, `Message`)
//! - the `Gateway` trait the backend is consumed through, plus an in-memory double
//! - the calendar grid builder and month navigation
//! - the carousel / full-screen viewer gesture controller
//! - the event, memory and message stores built on top of a gateway

pub mod calendar;
pub mod carousel;
pub mod config;
pub mod constants;
pub mod error;
pub mod event;
pub mod gateway;
pub mod memory;
pub mod message;
pub mod store;
mod time_format;

pub use error::{PairDaysError, PairDaysResult};
pub use event::{Event, EventFields, NewEvent};
pub use memory::{Memory, MemoryImage, UploadFile};
pub use message::{Message, MessageText};

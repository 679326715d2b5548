//! Stores: the CRUD façades the views work through.
//!
//! Each store owns a gateway handle and a snapshot of the list it shows.
//! Consistency is refresh-on-success: after any mutation succeeds the whole
//! list is reloaded from the backend and replaces the snapshot; nothing is
//! patched locally. A failed mutation returns the backend's message and
//! leaves the snapshot as it was.
//!
//! Mutations take `&mut self`, so a store cannot have a second submission in
//! flight while one is pending.

mod events;
mod memories;
mod messages;

pub use events::EventStore;
pub use memories::{MemoryCreated, MemoryFeed, SkippedUpload};
pub use messages::MessageFeed;

use uuid::Uuid;

use crate::error::{PairDaysError, PairDaysResult};
use crate::gateway::{Gateway, User};

/// Mutations need a session; lists treat a missing one as "nothing to show".
async fn require_user<G: Gateway>(gateway: &G) -> PairDaysResult<User> {
    gateway.current_user().await?.ok_or(PairDaysError::NotSignedIn)
}

fn id_value(id: Uuid) -> serde_json::Value {
    serde_json::Value::String(id.to_string())
}

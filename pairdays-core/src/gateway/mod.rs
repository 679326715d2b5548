//! The backend gateway.
//!
//! Everything pairdays persists goes through a hosted backend that offers row
//! storage, object storage and password auth. The stores never talk to it
//! directly: they are handed a `Gateway` at construction, which lets tests
//! swap in [`InMemoryGateway`].

mod auth;
mod in_memory;
mod query;

pub use auth::{AuthSession, User};
pub use in_memory::{FailOn, InMemoryGateway};
pub use query::{Filter, Order, Query};

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::future::Future;
use uuid::Uuid;

use crate::error::PairDaysResult;

/// Abstract backend. `SupabaseGateway` is the production implementation.
///
/// Rows travel as JSON objects; the stores (de)serialize them into the typed
/// model. Implementations are expected to be cheap to clone (a shared HTTP
/// client or a shared in-memory state) so each store can own a handle.
pub trait Gateway: Send + Sync {
    // -- Rows --

    fn select(&self, query: &Query) -> impl Future<Output = PairDaysResult<Vec<Value>>> + Send;

    /// Insert rows and return them as stored (with backend defaults filled in).
    fn insert(
        &self,
        table: &str,
        rows: Vec<Value>,
    ) -> impl Future<Output = PairDaysResult<Vec<Value>>> + Send;

    /// Overwrite `fields` on the row with this id. Returns how many rows
    /// matched, so a missing or hidden row reads as 0.
    fn update(
        &self,
        table: &str,
        id: Uuid,
        fields: Value,
    ) -> impl Future<Output = PairDaysResult<usize>> + Send;

    /// Delete every row matching the query's filters. Returns how many rows
    /// were removed.
    fn delete(&self, query: &Query) -> impl Future<Output = PairDaysResult<usize>> + Send;

    // -- Object storage --

    fn upload(
        &self,
        bucket: &str,
        key: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> impl Future<Output = PairDaysResult<()>> + Send;

    fn public_url(&self, bucket: &str, key: &str) -> String;

    // -- Auth --

    /// The signed-in user, or `None` when there is no session.
    fn current_user(&self) -> impl Future<Output = PairDaysResult<Option<User>>> + Send;

    fn sign_in(
        &self,
        email: &str,
        password: &str,
    ) -> impl Future<Output = PairDaysResult<AuthSession>> + Send;
}

pub(crate) fn decode_rows<T: DeserializeOwned>(rows: Vec<Value>) -> PairDaysResult<Vec<T>> {
    rows.into_iter()
        .map(|row| serde_json::from_value(row).map_err(Into::into))
        .collect()
}

pub(crate) fn encode_row<T: Serialize>(row: &T) -> PairDaysResult<Value> {
    Ok(serde_json::to_value(row)?)
}

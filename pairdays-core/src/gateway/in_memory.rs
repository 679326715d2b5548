//! In-process gateway backed by plain collections.
//!
//! Behaves like the hosted backend as far as the stores can tell: filters and
//! ordering are applied the same way, `created_at` is filled in on insert and
//! deletes report how many rows they removed. Failures can be injected per
//! operation to exercise error paths.

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

use super::{AuthSession, Gateway, Query, User};
use crate::error::{PairDaysError, PairDaysResult};

/// Which operation an injected failure applies to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FailOn {
    Select(String),
    Insert(String),
    Update(String),
    Delete(String),
    /// Uploads whose key contains this text
    Upload(String),
}

#[derive(Default)]
struct State {
    tables: HashMap<String, Vec<Value>>,
    objects: HashMap<(String, String), Vec<u8>>,
    accounts: HashMap<String, (String, User)>,
    current_user: Option<User>,
    failures: HashMap<FailOn, String>,
    /// Ticks the fake clock so rows inserted in sequence get distinct timestamps.
    clock: i64,
}

#[derive(Clone, Default)]
pub struct InMemoryGateway {
    state: Arc<Mutex<State>>,
}

impl InMemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> PairDaysResult<MutexGuard<'_, State>> {
        self.state
            .lock()
            .map_err(|e| PairDaysError::Gateway(format!("failed to acquire gateway lock: {e}")))
    }

    /// Register an account that `sign_in` will accept.
    pub fn add_account(&self, email: &str, password: &str) -> User {
        let user = User {
            id: Uuid::new_v4(),
            email: Some(email.to_string()),
        };
        if let Ok(mut state) = self.lock() {
            state
                .accounts
                .insert(email.to_string(), (password.to_string(), user.clone()));
        }
        user
    }

    /// Switch the active session to `user` without going through `sign_in`.
    pub fn sign_in_as(&self, user: &User) {
        if let Ok(mut state) = self.lock() {
            state.current_user = Some(user.clone());
        }
    }

    pub fn sign_out(&self) {
        if let Ok(mut state) = self.lock() {
            state.current_user = None;
        }
    }

    pub fn fail(&self, on: FailOn, message: &str) {
        if let Ok(mut state) = self.lock() {
            state.failures.insert(on, message.to_string());
        }
    }

    pub fn clear_failures(&self) {
        if let Ok(mut state) = self.lock() {
            state.failures.clear();
        }
    }

    /// Raw rows of a table, in insertion order.
    pub fn rows(&self, table: &str) -> Vec<Value> {
        self.lock()
            .map(|state| state.tables.get(table).cloned().unwrap_or_default())
            .unwrap_or_default()
    }

    pub fn object(&self, bucket: &str, key: &str) -> Option<Vec<u8>> {
        self.lock()
            .ok()?
            .objects
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
    }
}

impl State {
    fn check(&self, on: &FailOn) -> PairDaysResult<()> {
        match self.failures.get(on) {
            Some(message) => Err(PairDaysError::Gateway(message.clone())),
            None => Ok(()),
        }
    }

    fn check_upload(&self, key: &str) -> PairDaysResult<()> {
        for (on, message) in &self.failures {
            if let FailOn::Upload(fragment) = on {
                if key.contains(fragment.as_str()) {
                    return Err(PairDaysError::Gateway(message.clone()));
                }
            }
        }
        Ok(())
    }

    fn next_timestamp(&mut self) -> DateTime<Utc> {
        self.clock += 1;
        let epoch = Utc
            .with_ymd_and_hms(2025, 1, 1, 0, 0, 0)
            .single()
            .unwrap_or_default();
        epoch + Duration::seconds(self.clock)
    }
}

/// Order JSON values the way Postgres orders the column types we use:
/// ISO dates, `HH:MM` times and RFC 3339 timestamps all sort as text.
fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        // Postgres sorts NULL last in ascending order.
        (Value::Null, _) => Ordering::Greater,
        (_, Value::Null) => Ordering::Less,
        (Value::Number(x), Value::Number(y)) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        _ => a.to_string().cmp(&b.to_string()),
    }
}

impl Gateway for InMemoryGateway {
    async fn select(&self, query: &Query) -> PairDaysResult<Vec<Value>> {
        let state = self.lock()?;
        state.check(&FailOn::Select(query.table.clone()))?;

        let mut rows: Vec<Value> = state
            .tables
            .get(&query.table)
            .map(|rows| rows.iter().filter(|r| query.matches(r)).cloned().collect())
            .unwrap_or_default();

        // Stable, so rows equal on every key keep insertion order.
        rows.sort_by(|a, b| {
            query
                .order
                .iter()
                .map(|o| {
                    let ord = compare_values(
                        a.get(&o.column).unwrap_or(&Value::Null),
                        b.get(&o.column).unwrap_or(&Value::Null),
                    );
                    if o.ascending { ord } else { ord.reverse() }
                })
                .find(|ord| *ord != Ordering::Equal)
                .unwrap_or(Ordering::Equal)
        });

        Ok(rows)
    }

    async fn insert(&self, table: &str, rows: Vec<Value>) -> PairDaysResult<Vec<Value>> {
        let mut state = self.lock()?;
        state.check(&FailOn::Insert(table.to_string()))?;

        let mut stored = Vec::with_capacity(rows.len());
        for mut row in rows {
            let Some(object) = row.as_object_mut() else {
                return Err(PairDaysError::Gateway(format!(
                    "insert into {table}: row is not an object"
                )));
            };
            if !object.contains_key("created_at") {
                let now = state.next_timestamp();
                object.insert("created_at".into(), Value::String(now.to_rfc3339()));
            }
            stored.push(row);
        }

        let id_taken = {
            let existing = state.tables.get(table).map(Vec::as_slice).unwrap_or_default();
            stored
                .iter()
                .any(|new| existing.iter().any(|old| old.get("id") == new.get("id")))
        };
        if id_taken {
            return Err(PairDaysError::Gateway(format!(
                "duplicate key value violates unique constraint \"{table}_pkey\""
            )));
        }

        state
            .tables
            .entry(table.to_string())
            .or_default()
            .extend(stored.iter().cloned());

        Ok(stored)
    }

    async fn update(&self, table: &str, id: Uuid, fields: Value) -> PairDaysResult<usize> {
        let mut state = self.lock()?;
        state.check(&FailOn::Update(table.to_string()))?;

        let Value::Object(fields) = fields else {
            return Err(PairDaysError::Gateway(format!(
                "update {table}: fields are not an object"
            )));
        };

        let id = Value::String(id.to_string());
        let mut matched = 0;
        if let Some(rows) = state.tables.get_mut(table) {
            for row in rows.iter_mut().filter(|r| r.get("id") == Some(&id)) {
                if let Some(object) = row.as_object_mut() {
                    for (k, v) in &fields {
                        object.insert(k.clone(), v.clone());
                    }
                    matched += 1;
                }
            }
        }

        Ok(matched)
    }

    async fn delete(&self, query: &Query) -> PairDaysResult<usize> {
        let mut state = self.lock()?;
        state.check(&FailOn::Delete(query.table.clone()))?;

        let Some(rows) = state.tables.get_mut(&query.table) else {
            return Ok(0);
        };
        let before = rows.len();
        rows.retain(|r| !query.matches(r));
        Ok(before - rows.len())
    }

    async fn upload(
        &self,
        bucket: &str,
        key: &str,
        _content_type: &str,
        bytes: Vec<u8>,
    ) -> PairDaysResult<()> {
        let mut state = self.lock()?;
        state.check_upload(key)?;
        state
            .objects
            .insert((bucket.to_string(), key.to_string()), bytes);
        Ok(())
    }

    fn public_url(&self, bucket: &str, key: &str) -> String {
        format!("memory://{bucket}/{key}")
    }

    async fn current_user(&self) -> PairDaysResult<Option<User>> {
        Ok(self.lock()?.current_user.clone())
    }

    async fn sign_in(&self, email: &str, password: &str) -> PairDaysResult<AuthSession> {
        let mut state = self.lock()?;

        let user = match state.accounts.get(email) {
            Some((expected, user)) if expected == password => user.clone(),
            _ => return Err(PairDaysError::AuthRejected("Invalid login credentials".into())),
        };
        state.current_user = Some(user.clone());

        Ok(AuthSession {
            access_token: format!("access-{}", user.id),
            refresh_token: format!("refresh-{}", user.id),
            expires_at: Utc::now() + Duration::hours(1),
            user,
        })
    }
}

//! Shared calendar events.

use uuid::Uuid;

use crate::constants::EVENTS_TABLE;
use crate::error::{PairDaysError, PairDaysResult};
use crate::event::{Event, EventFields, NewEvent};
use crate::gateway::{Gateway, Query, decode_rows, encode_row};
use crate::store::id_value;

pub struct EventStore<G: Gateway> {
    gateway: G,
    events: Vec<Event>,
}

impl<G: Gateway> EventStore<G> {
    pub fn new(gateway: G) -> Self {
        EventStore {
            gateway,
            events: Vec::new(),
        }
    }

    /// The list as of the last successful load.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn find(&self, id: Uuid) -> Option<&Event> {
        self.events.iter().find(|e| e.id == id)
    }

    /// Load every event, by date then start time.
    pub async fn list(&mut self) -> PairDaysResult<&[Event]> {
        let rows = self
            .gateway
            .select(
                &Query::table(EVENTS_TABLE)
                    .order_asc("date")
                    .order_asc("start_time"),
            )
            .await?;
        self.events = decode_rows(rows)?;
        tracing::debug!(count = self.events.len(), "loaded events");
        Ok(&self.events)
    }

    pub async fn create(&mut self, new_event: NewEvent) -> PairDaysResult<Event> {
        new_event.fields.validate()?;

        let event = new_event.into_event();
        let stored = self
            .gateway
            .insert(EVENTS_TABLE, vec![encode_row(&event)?])
            .await?;

        let event = match stored.into_iter().next() {
            Some(row) => serde_json::from_value(row)?,
            None => event,
        };
        tracing::info!(id = %event.id, date = %event.date, "created event");

        self.reload().await;
        Ok(event)
    }

    pub async fn update(&mut self, id: Uuid, fields: EventFields) -> PairDaysResult<()> {
        fields.validate()?;

        let matched = self
            .gateway
            .update(EVENTS_TABLE, id, encode_row(&fields)?)
            .await?;
        if matched == 0 {
            return Err(PairDaysError::NotFound(format!("event {id}")));
        }
        tracing::info!(%id, "updated event");

        self.reload().await;
        Ok(())
    }

    pub async fn delete(&mut self, id: Uuid) -> PairDaysResult<()> {
        let removed = self
            .gateway
            .delete(&Query::table(EVENTS_TABLE).eq("id", id_value(id)))
            .await?;
        if removed == 0 {
            return Err(PairDaysError::NotFound(format!("event {id}")));
        }
        tracing::info!(%id, "deleted event");

        self.reload().await;
        Ok(())
    }

    /// Reload after a committed write. A failure here doesn't undo the write,
    /// so it is logged and the snapshot stays as it was.
    async fn reload(&mut self) {
        if let Err(e) = self.list().await {
            tracing::warn!(error = %e, "reload after write failed, events list is stale");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::{FailOn, InMemoryGateway};
    use chrono::{NaiveDate, NaiveTime};

    fn fields(title: &str, start: u32, end: u32) -> EventFields {
        let mut fields = EventFields::with_title(title);
        fields.start_time = NaiveTime::from_hms_opt(start, 0, 0).unwrap();
        fields.end_time = NaiveTime::from_hms_opt(end, 0, 0).unwrap();
        fields
    }

    fn march(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, day).unwrap()
    }

    #[tokio::test]
    async fn test_create_reloads_sorted_list() {
        let mut store = EventStore::new(InMemoryGateway::new());
        store.create(NewEvent::new(march(11), fields("Lunch", 12, 13))).await.unwrap();
        store.create(NewEvent::new(march(10), fields("Movie", 21, 23))).await.unwrap();
        let dinner = store.create(NewEvent::new(march(10), fields("Dinner", 18, 20))).await.unwrap();

        let titles: Vec<_> = store.events().iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["Dinner", "Movie", "Lunch"]);
        assert_eq!(store.find(dinner.id), Some(&dinner));
    }

    #[tokio::test]
    async fn test_create_rejects_inverted_times_before_calling_backend() {
        let gateway = InMemoryGateway::new();
        let mut store = EventStore::new(gateway.clone());

        let err = store.create(NewEvent::new(march(10), fields("Dinner", 20, 18))).await;
        assert!(matches!(err, Err(PairDaysError::Validation(_))));
        assert!(gateway.rows(EVENTS_TABLE).is_empty());
    }

    #[tokio::test]
    async fn test_update_keeps_date() {
        let mut store = EventStore::new(InMemoryGateway::new());
        let event = store.create(NewEvent::new(march(10), fields("Dinner", 18, 20))).await.unwrap();

        let mut changed = fields("Late dinner", 19, 21);
        changed.note = Some("sushi".into());
        store.update(event.id, changed).await.unwrap();

        let updated = store.find(event.id).unwrap();
        assert_eq!(updated.title, "Late dinner");
        assert_eq!(updated.note.as_deref(), Some("sushi"));
        assert_eq!(updated.date, march(10));
    }

    #[tokio::test]
    async fn test_failed_mutation_leaves_snapshot() {
        let gateway = InMemoryGateway::new();
        let mut store = EventStore::new(gateway.clone());
        let event = store.create(NewEvent::new(march(10), fields("Dinner", 18, 20))).await.unwrap();

        gateway.fail(FailOn::Update(EVENTS_TABLE.into()), "new row violates row-level security policy");
        let err = store.update(event.id, fields("Brunch", 10, 11)).await.unwrap_err();
        assert_eq!(err.to_string(), "new row violates row-level security policy");
        assert_eq!(store.events(), &[event]);
    }

    #[tokio::test]
    async fn test_delete() {
        let mut store = EventStore::new(InMemoryGateway::new());
        let event = store.create(NewEvent::new(march(10), fields("Dinner", 18, 20))).await.unwrap();

        store.delete(event.id).await.unwrap();
        assert!(store.events().is_empty());

        let again = store.delete(event.id).await;
        assert!(matches!(again, Err(PairDaysError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_update_of_missing_event_is_not_found() {
        let mut store = EventStore::new(InMemoryGateway::new());
        let event = store.create(NewEvent::new(march(10), fields("Dinner", 18, 20))).await.unwrap();
        store.delete(event.id).await.unwrap();

        let err = store.update(event.id, fields("Brunch", 10, 11)).await;
        assert!(matches!(err, Err(PairDaysError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_create_succeeds_when_reload_fails() {
        let gateway = InMemoryGateway::new();
        let mut store = EventStore::new(gateway.clone());

        gateway.fail(FailOn::Select(EVENTS_TABLE.into()), "network down");
        let event = store
            .create(NewEvent::new(march(10), fields("Dinner", 18, 20)))
            .await
            .unwrap();

        assert_eq!(gateway.rows(EVENTS_TABLE).len(), 1);
        assert!(store.events().is_empty());

        gateway.clear_failures();
        store.list().await.unwrap();
        assert_eq!(store.events(), &[event]);
    }
}

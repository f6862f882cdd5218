//! Event Repository

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::{Event, EventUpdate};
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

const TABLE: &str = "event";

#[derive(Clone)]
pub struct EventRepository {
    base: BaseRepository,
}

impl EventRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find all events ordered by date
    pub async fn find_all(&self) -> RepoResult<Vec<Event>> {
        let events: Vec<Event> = self
            .base
            .db()
            .query("SELECT * FROM event ORDER BY date")
            .await?
            .take(0)?;
        Ok(events)
    }

    /// Find event by id
    pub async fn find_by_id(&self, id: &RecordId) -> RepoResult<Option<Event>> {
        let event: Option<Event> = self.base.db().select(id.clone()).await?;
        Ok(event)
    }

    /// Create a new event
    pub async fn create(&self, event: Event) -> RepoResult<Event> {
        let created: Option<Event> = self.base.db().create(TABLE).content(event).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create event".to_string()))
    }

    /// Update an event
    pub async fn update(&self, id: &RecordId, data: EventUpdate) -> RepoResult<Event> {
        self.base
            .db()
            .query("UPDATE $event MERGE $data")
            .bind(("event", id.clone()))
            .bind(("data", data))
            .await?
            .check()?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Event {} not found", id)))
    }

    /// Events whose date has passed and that are not archived yet
    pub async fn find_expired(&self, now: i64) -> RepoResult<Vec<Event>> {
        let events: Vec<Event> = self
            .base
            .db()
            .query("SELECT * FROM event WHERE date < $now AND status != 'past'")
            .bind(("now", now))
            .await?
            .take(0)?;
        Ok(events)
    }

    /// Conditionally archive one event.
    ///
    /// Only transitions if the event is still not `past`, which makes the
    /// operation idempotent under overlapping job runs. Returns `None`
    /// when another run already archived it.
    pub async fn archive(&self, id: &RecordId) -> RepoResult<Option<Event>> {
        let mut result = self
            .base
            .db()
            .query(
                r#"
                UPDATE $event SET
                    status = 'past',
                    is_archived = true
                WHERE status != 'past'
                RETURN AFTER
                "#,
            )
            .bind(("event", id.clone()))
            .await?;
        let events: Vec<Event> = result.take(0)?;
        Ok(events.into_iter().next())
    }
}

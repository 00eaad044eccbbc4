/// Event records and persistence
use crate::error::{ApiError, ApiResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};

/// Event record in the database
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: i64,
    pub title: String,
    pub date: DateTime<Utc>,
    pub time: String,
    pub location: String,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub kind: String,
    pub participants: String,
    pub description: String,
    /// Asset-store path (`/uploads/events/...`) or an external URL
    pub poster: Option<String>,
    pub registration_link: Option<String>,
}

/// Field values for an insert or a full-row update
#[derive(Debug, Clone)]
pub struct EventRecord {
    pub title: String,
    pub date: DateTime<Utc>,
    pub time: String,
    pub location: String,
    pub kind: String,
    pub participants: String,
    pub description: String,
    pub poster: Option<String>,
    pub registration_link: Option<String>,
}

/// Listing window relative to "now"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventWindow {
    All,
    Upcoming,
    Previous,
}

const COLUMNS: &str =
    "id, title, date, time, location, type, participants, description, poster, registration_link";

/// Pure persistence for events, no knowledge of files
#[derive(Clone)]
pub struct EventRepository {
    pool: SqlitePool,
}

impl EventRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new event and return it with its assigned id
    pub async fn create(&self, record: &EventRecord) -> ApiResult<Event> {
        let result = sqlx::query(
            r#"
            INSERT INTO events (title, date, time, location, type, participants, description, poster, registration_link)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&record.title)
        .bind(record.date)
        .bind(&record.time)
        .bind(&record.location)
        .bind(&record.kind)
        .bind(&record.participants)
        .bind(&record.description)
        .bind(&record.poster)
        .bind(&record.registration_link)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        self.find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::Internal(format!("event {} missing after insert", id)))
    }

    pub async fn find_by_id(&self, id: i64) -> ApiResult<Option<Event>> {
        let event = sqlx::query_as::<_, Event>(&format!(
            "SELECT {} FROM events WHERE id = ?1",
            COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(event)
    }

    /// List events for a window, ordered per the window's convention:
    /// upcoming ascending, previous descending, unfiltered ascending.
    pub async fn list(&self, window: EventWindow, now: DateTime<Utc>) -> ApiResult<Vec<Event>> {
        let events = match window {
            EventWindow::All => {
                sqlx::query_as::<_, Event>(&format!(
                    "SELECT {} FROM events ORDER BY date ASC",
                    COLUMNS
                ))
                .fetch_all(&self.pool)
                .await?
            }
            EventWindow::Upcoming => {
                sqlx::query_as::<_, Event>(&format!(
                    "SELECT {} FROM events WHERE date >= ?1 ORDER BY date ASC",
                    COLUMNS
                ))
                .bind(now)
                .fetch_all(&self.pool)
                .await?
            }
            EventWindow::Previous => {
                sqlx::query_as::<_, Event>(&format!(
                    "SELECT {} FROM events WHERE date < ?1 ORDER BY date DESC",
                    COLUMNS
                ))
                .bind(now)
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(events)
    }

    /// Overwrite an event's fields; fails with NotFound for an absent id
    pub async fn update(&self, id: i64, record: &EventRecord) -> ApiResult<Event> {
        let result = sqlx::query(
            r#"
            UPDATE events
            SET title = ?1, date = ?2, time = ?3, location = ?4, type = ?5,
                participants = ?6, description = ?7, poster = ?8, registration_link = ?9
            WHERE id = ?10
            "#,
        )
        .bind(&record.title)
        .bind(record.date)
        .bind(&record.time)
        .bind(&record.location)
        .bind(&record.kind)
        .bind(&record.participants)
        .bind(&record.description)
        .bind(&record.poster)
        .bind(&record.registration_link)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound(format!("event {}", id)));
        }

        self.find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::Internal(format!("event {} missing after update", id)))
    }

    pub async fn delete(&self, id: i64) -> ApiResult<()> {
        let result = sqlx::query("DELETE FROM events WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound(format!("event {}", id)));
        }

        Ok(())
    }

    pub async fn count(&self) -> ApiResult<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM events")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    pub async fn count_upcoming(&self, now: DateTime<Utc>) -> ApiResult<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM events WHERE date >= ?1")
            .bind(now)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

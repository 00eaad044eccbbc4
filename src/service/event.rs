/// Event lifecycle orchestration
use crate::asset_store::{AssetCategory, AssetStore};
use crate::db::event::{Event, EventRecord, EventRepository, EventWindow};
use crate::error::{ApiError, ApiResult};
use crate::service::{explicit_option, non_empty, parse_timestamp, required};
use crate::upload::StagedFile;
use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;

const DEFAULT_TIME: &str = "00:00";
const DEFAULT_KIND: &str = "Webinar";
const DEFAULT_PARTICIPANTS: &str = "-";

/// Incoming event fields, shared by create and update
///
/// Every field is optional so the same DTO covers JSON bodies and multipart
/// text fields; create enforces its required fields, update merges into the
/// stored record.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventInput {
    pub title: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub location: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub participants: Option<String>,
    pub description: Option<String>,
    /// Absent = keep the current poster; null or "" = clear it;
    /// a string = point at an external URL
    #[serde(default, deserialize_with = "explicit_option")]
    pub poster: Option<Option<String>>,
    pub registration_link: Option<String>,
}

/// Creates, mutates, and destroys events while keeping each record's
/// poster reference and the file on disk in step
#[derive(Clone)]
pub struct EventService {
    repo: EventRepository,
    assets: Arc<AssetStore>,
}

impl EventService {
    pub fn new(repo: EventRepository, assets: Arc<AssetStore>) -> Self {
        Self { repo, assets }
    }

    pub async fn list(&self, window: EventWindow) -> ApiResult<Vec<Event>> {
        self.repo.list(window, Utc::now()).await
    }

    pub async fn get(&self, id: i64) -> ApiResult<Event> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("event {}", id)))
    }

    pub async fn create(&self, input: EventInput, file: Option<StagedFile>) -> ApiResult<Event> {
        let title = required(input.title, "title")?;
        let date = parse_timestamp(&required(input.date, "date")?)?;

        let poster = match file {
            Some(file) => Some(
                self.assets
                    .put(AssetCategory::Events, &file.extension, &file.data)
                    .await?,
            ),
            None => input.poster.flatten().filter(|p| !p.is_empty()),
        };

        let record = EventRecord {
            title,
            date,
            time: non_empty(input.time).unwrap_or_else(|| DEFAULT_TIME.to_string()),
            location: input.location.unwrap_or_default(),
            kind: non_empty(input.kind).unwrap_or_else(|| DEFAULT_KIND.to_string()),
            participants: non_empty(input.participants)
                .unwrap_or_else(|| DEFAULT_PARTICIPANTS.to_string()),
            description: input.description.unwrap_or_default(),
            poster,
            registration_link: non_empty(input.registration_link),
        };

        self.repo.create(&record).await
    }

    /// Partial update; a new upload replaces the stored poster and the old
    /// file is released afterwards (new file first, row second, old file
    /// last, so a failed write never leaves the record pointing nowhere)
    pub async fn update(
        &self,
        id: i64,
        input: EventInput,
        file: Option<StagedFile>,
    ) -> ApiResult<Event> {
        let existing = self.get(id).await?;

        let mut replaced = None;
        let poster = if let Some(file) = &file {
            replaced = existing.poster.clone();
            Some(
                self.assets
                    .put(AssetCategory::Events, &file.extension, &file.data)
                    .await?,
            )
        } else {
            match input.poster {
                Some(submitted) => {
                    let submitted = submitted.filter(|p| !p.is_empty());
                    if submitted != existing.poster {
                        replaced = existing.poster.clone();
                    }
                    submitted
                }
                None => existing.poster.clone(),
            }
        };

        let date = match input.date.as_deref() {
            Some(date) => parse_timestamp(date)?,
            None => existing.date,
        };

        let record = EventRecord {
            title: non_empty(input.title).unwrap_or(existing.title),
            date,
            time: non_empty(input.time).unwrap_or(existing.time),
            location: non_empty(input.location).unwrap_or(existing.location),
            kind: non_empty(input.kind).unwrap_or(existing.kind),
            participants: non_empty(input.participants).unwrap_or(existing.participants),
            description: non_empty(input.description).unwrap_or(existing.description),
            poster,
            registration_link: match input.registration_link {
                Some(link) => non_empty(Some(link)),
                None => existing.registration_link,
            },
        };

        let updated = self.repo.update(id, &record).await?;

        if let Some(old) = replaced {
            self.discard_asset(&old).await;
        }

        Ok(updated)
    }

    /// Delete the record, releasing its stored poster first; a failed file
    /// removal never blocks the row deletion
    pub async fn delete(&self, id: i64) -> ApiResult<()> {
        let existing = self.get(id).await?;

        if let Some(poster) = &existing.poster {
            self.discard_asset(poster).await;
        }

        self.repo.delete(id).await
    }

    pub async fn count(&self) -> ApiResult<i64> {
        self.repo.count().await
    }

    pub async fn count_upcoming(&self) -> ApiResult<i64> {
        self.repo.count_upcoming(Utc::now()).await
    }

    /// Best-effort removal of a no-longer-referenced poster
    async fn discard_asset(&self, path: &str) {
        if !AssetStore::is_owned(path) {
            return;
        }

        if let Err(e) = self.assets.delete(path).await {
            tracing::warn!("failed to remove replaced poster {}: {}", path, e);
        }
    }
}

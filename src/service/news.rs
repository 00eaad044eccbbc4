/// News lifecycle orchestration
use crate::asset_store::{AssetCategory, AssetStore};
use crate::db::news::{News, NewsRecord, NewsRepository};
use crate::error::{ApiError, ApiResult};
use crate::service::{explicit_option, non_empty, required};
use crate::upload::StagedFile;
use chrono::{Duration, Utc};
use serde::Deserialize;
use std::sync::Arc;

/// Window for the dashboard's "recent news" count
const RECENT_WINDOW_DAYS: i64 = 7;

/// Incoming news fields, shared by create and update
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsInput {
    pub title: Option<String>,
    pub content: Option<String>,
    pub author: Option<String>,
    /// Absent = keep the current image; null or "" = clear it;
    /// a string = point at an external URL
    #[serde(default, deserialize_with = "explicit_option")]
    pub image: Option<Option<String>>,
}

/// Creates, mutates, and destroys news articles while keeping each
/// record's image reference and the file on disk in step
#[derive(Clone)]
pub struct NewsService {
    repo: NewsRepository,
    assets: Arc<AssetStore>,
}

impl NewsService {
    pub fn new(repo: NewsRepository, assets: Arc<AssetStore>) -> Self {
        Self { repo, assets }
    }

    pub async fn list(&self) -> ApiResult<Vec<News>> {
        self.repo.list().await
    }

    pub async fn get(&self, id: i64) -> ApiResult<News> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("news {}", id)))
    }

    pub async fn create(&self, input: NewsInput, file: Option<StagedFile>) -> ApiResult<News> {
        let title = required(input.title, "title")?;
        let content = required(input.content, "content")?;
        let author = required(input.author, "author")?;

        let image = match file {
            Some(file) => Some(
                self.assets
                    .put(AssetCategory::News, &file.extension, &file.data)
                    .await?,
            ),
            None => input.image.flatten().filter(|i| !i.is_empty()),
        };

        let record = NewsRecord {
            title,
            content,
            author,
            image,
        };

        self.repo.create(&record).await
    }

    /// Partial update; a new upload replaces the stored image and the old
    /// file is released afterwards (new file first, row second, old file
    /// last)
    pub async fn update(
        &self,
        id: i64,
        input: NewsInput,
        file: Option<StagedFile>,
    ) -> ApiResult<News> {
        let existing = self.get(id).await?;

        let mut replaced = None;
        let image = if let Some(file) = &file {
            replaced = existing.image.clone();
            Some(
                self.assets
                    .put(AssetCategory::News, &file.extension, &file.data)
                    .await?,
            )
        } else {
            match input.image {
                Some(submitted) => {
                    let submitted = submitted.filter(|i| !i.is_empty());
                    if submitted != existing.image {
                        replaced = existing.image.clone();
                    }
                    submitted
                }
                None => existing.image.clone(),
            }
        };

        let record = NewsRecord {
            title: non_empty(input.title).unwrap_or(existing.title),
            content: non_empty(input.content).unwrap_or(existing.content),
            author: non_empty(input.author).unwrap_or(existing.author),
            image,
        };

        let updated = self.repo.update(id, &record).await?;

        if let Some(old) = replaced {
            self.discard_asset(&old).await;
        }

        Ok(updated)
    }

    /// Delete the record, releasing its stored image first; a failed file
    /// removal never blocks the row deletion
    pub async fn delete(&self, id: i64) -> ApiResult<()> {
        let existing = self.get(id).await?;

        if let Some(image) = &existing.image {
            self.discard_asset(image).await;
        }

        self.repo.delete(id).await
    }

    pub async fn count(&self) -> ApiResult<i64> {
        self.repo.count().await
    }

    /// Articles created within the recent window
    pub async fn count_recent(&self) -> ApiResult<i64> {
        self.repo
            .count_since(Utc::now() - Duration::days(RECENT_WINDOW_DAYS))
            .await
    }

    /// Best-effort removal of a no-longer-referenced image
    async fn discard_asset(&self, path: &str) {
        if !AssetStore::is_owned(path) {
            return;
        }

        if let Err(e) = self.assets.delete(path).await {
            tracing::warn!("failed to remove replaced image {}: {}", path, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use tempfile::tempdir;

    async fn create_test_service() -> (NewsService, Arc<AssetStore>, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let pool = db::create_pool(&dir.path().join("test.sqlite"), db::DatabaseOptions::default())
            .await
            .unwrap();
        db::run_migrations(&pool).await.unwrap();

        let assets = Arc::new(AssetStore::new(dir.path().join("uploads")));
        let service = NewsService::new(NewsRepository::new(pool), Arc::clone(&assets));
        (service, assets, dir)
    }

    fn input(title: &str) -> NewsInput {
        NewsInput {
            title: Some(title.to_string()),
            content: Some("<p>story</p>".to_string()),
            author: Some("Editor".to_string()),
            ..NewsInput::default()
        }
    }

    fn staged(data: &[u8]) -> StagedFile {
        StagedFile {
            field: "image".to_string(),
            extension: "jpg".to_string(),
            data: data.to_vec(),
        }
    }

    #[tokio::test]
    async fn test_create_requires_fields() {
        let (service, _assets, _dir) = create_test_service().await;

        let mut missing_author = input("Story");
        missing_author.author = None;

        assert!(matches!(
            service.create(missing_author, None).await,
            Err(ApiError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_create_with_image_stores_file() {
        let (service, assets, _dir) = create_test_service().await;

        let news = service
            .create(input("Story"), Some(staged(b"pixels")))
            .await
            .unwrap();

        let image = news.image.unwrap();
        assert!(image.starts_with("/uploads/news/"));
        assert!(assets.exists(&image).await);
    }

    #[tokio::test]
    async fn test_image_replacement_cleans_up() {
        let (service, assets, _dir) = create_test_service().await;

        let created = service
            .create(input("Story"), Some(staged(b"old")))
            .await
            .unwrap();
        let old_image = created.image.clone().unwrap();

        let updated = service
            .update(created.id, NewsInput::default(), Some(staged(b"new")))
            .await
            .unwrap();
        let new_image = updated.image.clone().unwrap();

        assert_ne!(old_image, new_image);
        assert!(!assets.exists(&old_image).await);
        assert!(assets.exists(&new_image).await);
    }

    #[tokio::test]
    async fn test_delete_cleans_up_image() {
        let (service, assets, _dir) = create_test_service().await;

        let created = service
            .create(input("Story"), Some(staged(b"pixels")))
            .await
            .unwrap();
        let image = created.image.clone().unwrap();

        service.delete(created.id).await.unwrap();

        assert!(!assets.exists(&image).await);
        assert!(matches!(
            service.get(created.id).await,
            Err(ApiError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_counts() {
        let (service, _assets, _dir) = create_test_service().await;

        service.create(input("One"), None).await.unwrap();
        service.create(input("Two"), None).await.unwrap();

        assert_eq!(service.count().await.unwrap(), 2);
        // Both were just created, so both are recent
        assert_eq!(service.count_recent().await.unwrap(), 2);
    }
}

/// News records and persistence
use crate::error::{ApiError, ApiResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};

/// News record in the database
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct News {
    pub id: i64,
    pub title: String,
    /// May contain rich markup
    pub content: String,
    pub author: String,
    /// Asset-store path (`/uploads/news/...`) or an external URL
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Field values for an insert or a full-row update
#[derive(Debug, Clone)]
pub struct NewsRecord {
    pub title: String,
    pub content: String,
    pub author: String,
    pub image: Option<String>,
}

const COLUMNS: &str = "id, title, content, author, image, created_at";

/// Pure persistence for news, no knowledge of files
#[derive(Clone)]
pub struct NewsRepository {
    pool: SqlitePool,
}

impl NewsRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new article; `created_at` is assigned here
    pub async fn create(&self, record: &NewsRecord) -> ApiResult<News> {
        let result = sqlx::query(
            r#"
            INSERT INTO news (title, content, author, image, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&record.title)
        .bind(&record.content)
        .bind(&record.author)
        .bind(&record.image)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        self.find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::Internal(format!("news {} missing after insert", id)))
    }

    pub async fn find_by_id(&self, id: i64) -> ApiResult<Option<News>> {
        let news = sqlx::query_as::<_, News>(&format!("SELECT {} FROM news WHERE id = ?1", COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(news)
    }

    /// List all articles, newest first
    pub async fn list(&self) -> ApiResult<Vec<News>> {
        let news = sqlx::query_as::<_, News>(&format!(
            "SELECT {} FROM news ORDER BY created_at DESC, id DESC",
            COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(news)
    }

    /// Overwrite an article's fields; `created_at` is never touched
    pub async fn update(&self, id: i64, record: &NewsRecord) -> ApiResult<News> {
        let result = sqlx::query(
            r#"
            UPDATE news
            SET title = ?1, content = ?2, author = ?3, image = ?4
            WHERE id = ?5
            "#,
        )
        .bind(&record.title)
        .bind(&record.content)
        .bind(&record.author)
        .bind(&record.image)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound(format!("news {}", id)));
        }

        self.find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::Internal(format!("news {} missing after update", id)))
    }

    pub async fn delete(&self, id: i64) -> ApiResult<()> {
        let result = sqlx::query("DELETE FROM news WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound(format!("news {}", id)));
        }

        Ok(())
    }

    pub async fn count(&self) -> ApiResult<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM news")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Count articles created at or after the cutoff
    pub async fn count_since(&self, cutoff: DateTime<Utc>) -> ApiResult<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM news WHERE created_at >= ?1")
            .bind(cutoff)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use chrono::Duration;
    use tempfile::tempdir;

    async fn create_test_repo() -> (NewsRepository, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let pool = db::create_pool(&dir.path().join("test.sqlite"), db::DatabaseOptions::default())
            .await
            .unwrap();
        db::run_migrations(&pool).await.unwrap();
        (NewsRepository::new(pool), dir)
    }

    fn record(title: &str) -> NewsRecord {
        NewsRecord {
            title: title.to_string(),
            content: "<p>body</p>".to_string(),
            author: "Editor".to_string(),
            image: None,
        }
    }

    #[tokio::test]
    async fn test_create_sets_created_at() {
        let (repo, _dir) = create_test_repo().await;

        let before = Utc::now() - Duration::seconds(1);
        let news = repo.create(&record("Launch")).await.unwrap();
        let after = Utc::now() + Duration::seconds(1);

        assert!(news.created_at >= before && news.created_at <= after);
        assert_eq!(news.author, "Editor");
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let (repo, _dir) = create_test_repo().await;

        let first = repo.create(&record("Older")).await.unwrap();
        let second = repo.create(&record("Newer")).await.unwrap();

        let all = repo.list().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, second.id);
        assert_eq!(all[1].id, first.id);
    }

    #[tokio::test]
    async fn test_update_keeps_created_at() {
        let (repo, _dir) = create_test_repo().await;

        let news = repo.create(&record("Original")).await.unwrap();
        let mut changed = record("Edited");
        changed.image = Some("https://example.org/pic.png".to_string());

        let updated = repo.update(news.id, &changed).await.unwrap();
        assert_eq!(updated.title, "Edited");
        assert_eq!(updated.created_at, news.created_at);
        assert_eq!(updated.image.as_deref(), Some("https://example.org/pic.png"));
    }

    #[tokio::test]
    async fn test_delete_missing_news() {
        let (repo, _dir) = create_test_repo().await;

        assert!(matches!(
            repo.delete(41).await,
            Err(ApiError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_count_since() {
        let (repo, _dir) = create_test_repo().await;

        let fresh = repo.create(&record("Fresh")).await.unwrap();
        let stale = repo.create(&record("Stale")).await.unwrap();

        // Backdate one article past the window
        sqlx::query("UPDATE news SET created_at = ?1 WHERE id = ?2")
            .bind(Utc::now() - Duration::days(30))
            .bind(stale.id)
            .execute(&repo.pool)
            .await
            .unwrap();

        let cutoff = Utc::now() - Duration::days(7);
        assert_eq!(repo.count().await.unwrap(), 2);
        assert_eq!(repo.count_since(cutoff).await.unwrap(), 1);
        assert!(fresh.created_at >= cutoff);
    }
}

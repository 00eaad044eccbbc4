/// Application context and dependency injection
use crate::{
    asset_store::AssetStore,
    auth::AuthGate,
    config::ServerConfig,
    db::{self, event::EventRepository, news::NewsRepository},
    error::ApiResult,
    service::{event::EventService, news::NewsService},
};
use sqlx::SqlitePool;
use std::sync::Arc;

/// Application context holding all shared services
///
/// Everything is constructed once at startup and injected explicitly; there
/// are no module-level singletons.
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<ServerConfig>,
    pub db: SqlitePool,
    pub assets: Arc<AssetStore>,
    pub events: Arc<EventService>,
    pub news: Arc<NewsService>,
    pub auth: Arc<AuthGate>,
}

impl AppContext {
    /// Create a new application context from configuration
    pub async fn new(config: ServerConfig) -> ApiResult<Self> {
        config.validate()?;

        Self::ensure_directories(&config).await?;

        let pool = db::create_pool(&config.storage.database, db::DatabaseOptions::default()).await?;
        db::run_migrations(&pool).await?;
        db::test_connection(&pool).await?;

        let assets = Arc::new(AssetStore::new(config.storage.upload_directory.clone()));

        let events = Arc::new(EventService::new(
            EventRepository::new(pool.clone()),
            Arc::clone(&assets),
        ));
        let news = Arc::new(NewsService::new(
            NewsRepository::new(pool.clone()),
            Arc::clone(&assets),
        ));

        let auth = Arc::new(AuthGate::new(&config.auth));

        Ok(Self {
            config: Arc::new(config),
            db: pool,
            assets,
            events,
            news,
            auth,
        })
    }

    /// Ensure required directories exist
    async fn ensure_directories(config: &ServerConfig) -> ApiResult<()> {
        for dir in [&config.storage.data_directory, &config.storage.upload_directory] {
            if !dir.exists() {
                tokio::fs::create_dir_all(dir).await?;
            }
        }

        Ok(())
    }
}

/// Global Insight Series - content API
///
/// Serves the Events and News resources behind the university outreach
/// site, along with locally stored uploads and the admin dashboard
/// endpoints.
use global_insight_api::{config::ServerConfig, context::AppContext, error::ApiResult, server};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> ApiResult<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "global_insight_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    println!(
        "Global Insight Series API v{}",
        env!("CARGO_PKG_VERSION")
    );

    // Load configuration
    let config = ServerConfig::from_env()?;

    // Create application context and start serving
    let ctx = AppContext::new(config).await?;
    server::serve(ctx).await?;

    Ok(())
}

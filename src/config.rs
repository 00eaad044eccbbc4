/// Configuration management for the Global Insight Series API
use crate::error::{ApiError, ApiResult};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// Main server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub service: ServiceConfig,
    pub storage: StorageConfig,
    pub auth: AuthConfig,
}

/// Service-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub hostname: String,
    pub port: u16,
    pub version: String,
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub data_directory: PathBuf,
    pub database: PathBuf,
    pub upload_directory: PathBuf,
}

/// Admin authentication configuration
///
/// The username/password pair stands in for a real credential backend; it
/// guards a single admin identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    pub admin_username: String,
    pub admin_password: String,
    pub token_secret: String,
    pub token_ttl_secs: u64,
}

impl ServerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> ApiResult<Self> {
        dotenv::dotenv().ok();

        let hostname = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("PORT")
            .unwrap_or_else(|_| "5000".to_string())
            .parse()
            .map_err(|_| ApiError::Validation("invalid port number".to_string()))?;
        let version =
            env::var("GIS_VERSION").unwrap_or_else(|_| env!("CARGO_PKG_VERSION").to_string());

        let data_directory: PathBuf = env::var("GIS_DATA_DIRECTORY")
            .unwrap_or_else(|_| "./data".to_string())
            .into();
        let database = env::var("GIS_DATABASE_LOCATION")
            .map(PathBuf::from)
            .unwrap_or_else(|_| data_directory.join("insight.sqlite"));
        let upload_directory = env::var("GIS_UPLOAD_DIRECTORY")
            .map(PathBuf::from)
            .unwrap_or_else(|_| data_directory.join("uploads"));

        let admin_username =
            env::var("GIS_ADMIN_USERNAME").unwrap_or_else(|_| "admin".to_string());
        let admin_password =
            env::var("GIS_ADMIN_PASSWORD").unwrap_or_else(|_| "globalinsight".to_string());
        let token_secret = env::var("GIS_TOKEN_SECRET")
            .unwrap_or_else(|_| "global-insight-series-dev-secret".to_string());
        let token_ttl_secs = env::var("GIS_TOKEN_TTL_SECS")
            .unwrap_or_else(|_| "86400".to_string())
            .parse()
            .unwrap_or(86400);

        Ok(ServerConfig {
            service: ServiceConfig {
                hostname,
                port,
                version,
            },
            storage: StorageConfig {
                data_directory,
                database,
                upload_directory,
            },
            auth: AuthConfig {
                admin_username,
                admin_password,
                token_secret,
                token_ttl_secs,
            },
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> ApiResult<()> {
        if self.service.hostname.is_empty() {
            return Err(ApiError::Validation("hostname cannot be empty".to_string()));
        }

        if self.auth.token_secret.len() < 16 {
            return Err(ApiError::Validation(
                "token secret must be at least 16 characters".to_string(),
            ));
        }

        Ok(())
    }
}

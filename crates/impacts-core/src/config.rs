//! Configuration module
//!
//! This module provides configuration structures for the API and the ingestion
//! pipeline, including database, repository backend, upload and invitation settings.

use std::env;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

// Common constants
const MAX_CONNECTIONS: u32 = 20;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
const MAX_UPLOAD_SIZE_MB: usize = 5;
const MAX_BATCH_SIZE: usize = 500;
const INVITATION_EXPIRY_DAYS: i64 = 7;

/// Repository backend types
///
/// `Postgres` is the production backend; `Memory` keeps every entity in process
/// and is used for local development and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Postgres,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StorageBackend::Postgres),
            "memory" | "in-memory" => Ok(StorageBackend::Memory),
            _ => Err(anyhow::anyhow!("Invalid storage backend: {}", s)),
        }
    }
}

impl Display for StorageBackend {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            StorageBackend::Postgres => write!(f, "postgres"),
            StorageBackend::Memory => write!(f, "memory"),
        }
    }
}

/// Base configuration shared by every binary
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    pub environment: String,
    pub log_format: String,
}

/// Basic Impacts API configuration
#[derive(Clone, Debug)]
pub struct ImpactsConfig {
    pub base: BaseConfig,
    pub storage_backend: StorageBackend,
    pub database_url: Option<String>,
    // Ingestion limits
    pub max_upload_size_bytes: usize,
    pub upload_allowed_extensions: Vec<String>,
    pub max_batch_size: usize,
    // Admin back-office
    pub invitation_expiry_days: i64,
    pub admin_api_key: Option<String>,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config(pub Box<ImpactsConfig>);

impl Config {
    pub fn new(config: ImpactsConfig) -> Self {
        Config(Box::new(config))
    }

    fn inner(&self) -> &ImpactsConfig {
        &self.0
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.inner().base.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        let config = ImpactsConfig::from_env()?;
        Ok(Config(Box::new(config)))
    }

    pub fn server_port(&self) -> u16 {
        self.inner().base.server_port
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.inner().base.cors_origins
    }

    pub fn environment(&self) -> &str {
        &self.inner().base.environment
    }

    pub fn log_format(&self) -> &str {
        &self.inner().base.log_format
    }

    pub fn db_max_connections(&self) -> u32 {
        self.inner().base.db_max_connections
    }

    pub fn db_timeout_seconds(&self) -> u64 {
        self.inner().base.db_timeout_seconds
    }

    pub fn storage_backend(&self) -> StorageBackend {
        self.inner().storage_backend
    }

    pub fn database_url(&self) -> Option<&str> {
        self.inner().database_url.as_deref()
    }

    pub fn max_upload_size_bytes(&self) -> usize {
        self.inner().max_upload_size_bytes
    }

    pub fn upload_allowed_extensions(&self) -> &[String] {
        &self.inner().upload_allowed_extensions
    }

    pub fn max_batch_size(&self) -> usize {
        self.inner().max_batch_size
    }

    pub fn invitation_expiry_days(&self) -> i64 {
        self.inner().invitation_expiry_days
    }

    pub fn admin_api_key(&self) -> Option<&str> {
        self.inner().admin_api_key.as_deref()
    }
}

impl ImpactsConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins_str = env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());
        let is_production =
            environment.to_lowercase() == "production" || environment.to_lowercase() == "prod";
        if is_production && cors_origins_str.trim() == "*" {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        let cors_origins: Vec<String> = cors_origins_str
            .split(',')
            .map(|s| s.trim().to_string())
            .collect();

        let base = BaseConfig {
            server_port: env::var("PORT")
                .unwrap_or_else(|_| "4000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            cors_origins,
            db_max_connections: env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| MAX_CONNECTIONS.to_string())
                .parse()
                .unwrap_or(MAX_CONNECTIONS),
            db_timeout_seconds: env::var("DB_TIMEOUT_SECONDS")
                .unwrap_or_else(|_| CONNECTION_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(CONNECTION_TIMEOUT_SECS),
            environment,
            log_format: env::var("LOG_FORMAT")
                .unwrap_or_else(|_| "pretty".to_string())
                .to_lowercase(),
        };

        let database_url = env::var("DATABASE_URL").ok();
        let storage_backend = match env::var("STORAGE_BACKEND") {
            Ok(value) => value.parse()?,
            Err(_) if database_url.is_some() => StorageBackend::Postgres,
            Err(_) => StorageBackend::Memory,
        };
        if storage_backend == StorageBackend::Postgres && database_url.is_none() {
            return Err(anyhow::anyhow!(
                "DATABASE_URL must be set when STORAGE_BACKEND=postgres"
            ));
        }

        let max_upload_size_mb = env::var("MAX_UPLOAD_SIZE_MB")
            .unwrap_or_else(|_| MAX_UPLOAD_SIZE_MB.to_string())
            .parse::<usize>()
            .unwrap_or(MAX_UPLOAD_SIZE_MB);

        let upload_allowed_extensions = env::var("UPLOAD_ALLOWED_EXTENSIONS")
            .unwrap_or_else(|_| "json,txt".to_string())
            .split(',')
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect();

        Ok(ImpactsConfig {
            base,
            storage_backend,
            database_url,
            max_upload_size_bytes: max_upload_size_mb * 1024 * 1024,
            upload_allowed_extensions,
            max_batch_size: env::var("MAX_BATCH_SIZE")
                .unwrap_or_else(|_| MAX_BATCH_SIZE.to_string())
                .parse()
                .unwrap_or(MAX_BATCH_SIZE),
            invitation_expiry_days: env::var("INVITATION_EXPIRY_DAYS")
                .unwrap_or_else(|_| INVITATION_EXPIRY_DAYS.to_string())
                .parse()
                .unwrap_or(INVITATION_EXPIRY_DAYS),
            admin_api_key: env::var("ADMIN_API_KEY").ok().filter(|k| !k.is_empty()),
        })
    }

    /// Development defaults: in-memory backend, no admin key, permissive CORS.
    pub fn development() -> Self {
        ImpactsConfig {
            base: BaseConfig {
                server_port: 4000,
                cors_origins: vec!["*".to_string()],
                db_max_connections: MAX_CONNECTIONS,
                db_timeout_seconds: CONNECTION_TIMEOUT_SECS,
                environment: "development".to_string(),
                log_format: "pretty".to_string(),
            },
            storage_backend: StorageBackend::Memory,
            database_url: None,
            max_upload_size_bytes: MAX_UPLOAD_SIZE_MB * 1024 * 1024,
            upload_allowed_extensions: vec!["json".to_string(), "txt".to_string()],
            max_batch_size: MAX_BATCH_SIZE,
            invitation_expiry_days: INVITATION_EXPIRY_DAYS,
            admin_api_key: None,
        }
    }
}

//! Configuration validation
//!
//! Checks critical values at startup so misconfiguration fails fast.

use anyhow::Result;
use impacts_core::{Config, StorageBackend};

/// Shortest admin key accepted in production
pub const MIN_ADMIN_KEY_LEN: usize = 32;

pub fn validate_config(config: &Config) -> Result<()> {
    let is_production = config.is_production();

    if is_production && config.cors_origins().iter().any(|o| o == "*") {
        return Err(anyhow::anyhow!(
            "CORS configured to allow all origins (*) in production. \
            Set explicit origins via CORS_ORIGINS."
        ));
    }

    match config.admin_api_key() {
        Some(key) if is_production && key.len() < MIN_ADMIN_KEY_LEN => {
            return Err(anyhow::anyhow!(
                "ADMIN_API_KEY must be at least {} characters long in production",
                MIN_ADMIN_KEY_LEN
            ));
        }
        None if is_production => {
            return Err(anyhow::anyhow!("ADMIN_API_KEY must be set in production"));
        }
        None => {
            tracing::warn!("ADMIN_API_KEY not set; admin routes are unauthenticated");
        }
        Some(_) => {}
    }

    if config.storage_backend() == StorageBackend::Postgres {
        if config.database_url().is_none() {
            return Err(anyhow::anyhow!("DATABASE_URL is required for the postgres backend"));
        }
        if config.db_max_connections() == 0 {
            return Err(anyhow::anyhow!("Database max connections cannot be 0"));
        }
        if config.db_timeout_seconds() == 0 {
            return Err(anyhow::anyhow!("Database timeout cannot be 0"));
        }
    } else if is_production {
        tracing::warn!("In-memory storage in production; data will not survive a restart");
    }

    if config.max_upload_size_bytes() == 0 {
        return Err(anyhow::anyhow!("Max upload size cannot be 0"));
    }
    if config.max_batch_size() == 0 {
        return Err(anyhow::anyhow!("Max batch size cannot be 0"));
    }
    if config.invitation_expiry_days() <= 0 {
        return Err(anyhow::anyhow!("Invitation expiry must be at least one day"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use impacts_core::ImpactsConfig;

    fn production() -> ImpactsConfig {
        let mut config = ImpactsConfig::development();
        config.base.environment = "production".to_string();
        config.base.cors_origins = vec!["https://impacts.example.org".to_string()];
        config.admin_api_key = Some("k".repeat(MIN_ADMIN_KEY_LEN));
        config
    }

    #[test]
    fn development_defaults_pass() {
        assert!(validate_config(&Config::new(ImpactsConfig::development())).is_ok());
    }

    #[test]
    fn production_requires_strong_admin_key() {
        assert!(validate_config(&Config::new(production())).is_ok());

        let mut weak = production();
        weak.admin_api_key = Some("short".to_string());
        assert!(validate_config(&Config::new(weak)).is_err());

        let mut missing = production();
        missing.admin_api_key = None;
        assert!(validate_config(&Config::new(missing)).is_err());
    }

    #[test]
    fn production_rejects_wildcard_cors() {
        let mut config = production();
        config.base.cors_origins = vec!["*".to_string()];
        assert!(validate_config(&Config::new(config)).is_err());
    }

    #[test]
    fn zero_limits_rejected() {
        let mut config = ImpactsConfig::development();
        config.max_batch_size = 0;
        assert!(validate_config(&Config::new(config)).is_err());
    }
}

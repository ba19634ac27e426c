/**
 * Configuration validation
 * Validates environment variables and configuration on startup
 */
use crate::config::Config;
use anyhow::Result;
use crate::core::registry::{MAX_EXPIRY_HOURS, MIN_EXPIRY_HOURS};

pub fn validate_config(config: &Config) -> Result<()> {
    if config.port == 0 {
        anyhow::bail!("PORT must be nonzero");
    }

    if let Some(ref db_url) = config.database_url {
        if !db_url.starts_with("postgresql://") && !db_url.starts_with("postgres://") {
            anyhow::bail!("DATABASE_URL must start with postgresql:// or postgres://");
        }
        #[cfg(not(feature = "postgres"))]
        tracing::warn!(
            "DATABASE_URL is set but the `postgres` feature is not enabled; falling back to the in-memory store"
        );
    }

    if config.cors_origin.is_empty() {
        tracing::warn!("CORS_ORIGIN is empty; cross-origin requests will be rejected");
    }

    if !(MIN_EXPIRY_HOURS..=MAX_EXPIRY_HOURS).contains(&config.default_expiry_hours) {
        anyhow::bail!(
            "DEFAULT_EXPIRY_HOURS must be {MIN_EXPIRY_HOURS}..={MAX_EXPIRY_HOURS}, got {}",
            config.default_expiry_hours
        );
    }

    if config.archive_cutoff_hours <= 0 {
        anyhow::bail!("ARCHIVE_CUTOFF_HOURS must be positive");
    }

    if config.max_request_body_bytes == 0 {
        anyhow::bail!("MAX_REQUEST_BODY_BYTES must be greater than 0");
    }
    if config.max_request_body_bytes > 100 * 1024 * 1024 {
        tracing::warn!(
            "MAX_REQUEST_BODY_BYTES is very large ({}MB); consider reducing it",
            config.max_request_body_bytes / 1024 / 1024
        );
    }

    if config.invite_base_url.is_empty() {
        anyhow::bail!("INVITE_BASE_URL must not be empty");
    }

    Ok(())
}

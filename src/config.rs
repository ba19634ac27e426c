/**
 * Configuration management
 */
use std::env;

#[derive(Clone, Debug)]
pub struct Config {
    pub port: u16,
    pub host: String,
    pub cors_origin: String,
    /// Base URL used to build deterministic share links (spec §4.6).
    pub invite_base_url: String,
    /// Default `expiry_hours` used by callers that don't specify one.
    pub default_expiry_hours: i64,
    /// `ArchiveInactive` cutoff: sessions untouched for longer than this
    /// become eligible for archival.
    pub archive_cutoff_hours: i64,
    /// How often the archival sweep runs, independent of the cutoff age.
    pub archive_sweep_interval_secs: u64,
    pub database_url: Option<String>,
    pub max_request_body_bytes: usize,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Config {
            port: env::var("PORT")
                .unwrap_or_else(|_| "3001".to_string())
                .parse()?,
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            cors_origin: env::var("CORS_ORIGIN")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            invite_base_url: env::var("INVITE_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            default_expiry_hours: env::var("DEFAULT_EXPIRY_HOURS")
                .unwrap_or_else(|_| "24".to_string())
                .parse()
                .unwrap_or(24),
            archive_cutoff_hours: env::var("ARCHIVE_CUTOFF_HOURS")
                .unwrap_or_else(|_| "720".to_string())
                .parse()
                .unwrap_or(720),
            archive_sweep_interval_secs: env::var("ARCHIVE_SWEEP_INTERVAL_SECS")
                .unwrap_or_else(|_| "3600".to_string())
                .parse()
                .unwrap_or(3600),
            database_url: env::var("DATABASE_URL").ok(),
            max_request_body_bytes: env::var("MAX_REQUEST_BODY_BYTES")
                .unwrap_or_else(|_| "1048576".to_string())
                .parse()
                .unwrap_or(1_048_576),
        })
    }
}

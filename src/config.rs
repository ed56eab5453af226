//! Client configuration loaded from environment variables.

use crate::error::{Result, TroviError};
use std::env;

/// Client configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Trovi API base URL
    pub api_url: String,

    /// Chameleon portal base URL (badge listing, share/launch links)
    pub portal_url: String,

    /// Log level
    pub log_level: String,

    /// Artifact listing page size
    pub page_size: u32,

    /// HTTP request timeout in seconds
    pub http_timeout_secs: u64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            api_url: env::var("TROVI_API_URL")
                .map_err(|_| TroviError::Config("TROVI_API_URL not set".into()))?,
            portal_url: env::var("CHAMELEON_PORTAL_URL")
                .map_err(|_| TroviError::Config("CHAMELEON_PORTAL_URL not set".into()))?,
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            page_size: env::var("TROVI_PAGE_SIZE")
                .unwrap_or_else(|_| "21".into())
                .parse()
                .unwrap_or(21),
            http_timeout_secs: env::var("HTTP_TIMEOUT_SECS")
                .unwrap_or_else(|_| "30".into())
                .parse()
                .unwrap_or(30),
        })
    }
}

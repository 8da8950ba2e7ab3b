//! Environment-driven settings

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::api::DEFAULT_TIMEOUT;
use crate::database::DEFAULT_DATABASE_URL;

const DEFAULT_DELAY: Duration = Duration::from_millis(1000);

/// Where the catalog comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogConfig {
    /// Bundled sample listings, served after `delay`
    Fixture { delay: Duration },
    File(PathBuf),
    Api { base_url: String, timeout: Duration },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub database_url: String,
    pub catalog: CatalogConfig,
    pub login_delay: Duration,
    /// Base latency of the mock form backend
    pub form_delay: Duration,
}

impl Config {
    /// Read settings from the process environment.
    ///
    /// `BOOK_MARKET_API_URL` wins over `BOOK_MARKET_CATALOG_FILE`; with neither
    /// set the bundled catalog is used.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let database_url = lookup("BOOK_MARKET_DATABASE_URL").unwrap_or_else(|| {
            info!("BOOK_MARKET_DATABASE_URL not set - using {}", DEFAULT_DATABASE_URL);
            DEFAULT_DATABASE_URL.to_string()
        });

        let catalog = if let Some(base_url) = lookup("BOOK_MARKET_API_URL") {
            let timeout = parse_duration(&lookup, "BOOK_MARKET_API_TIMEOUT_SECS", Duration::from_secs)?
                .unwrap_or(DEFAULT_TIMEOUT);
            CatalogConfig::Api { base_url, timeout }
        } else if let Some(path) = lookup("BOOK_MARKET_CATALOG_FILE") {
            CatalogConfig::File(PathBuf::from(path))
        } else {
            let delay = parse_duration(&lookup, "BOOK_MARKET_CATALOG_DELAY_MS", Duration::from_millis)?
                .unwrap_or(DEFAULT_DELAY);
            CatalogConfig::Fixture { delay }
        };

        let login_delay = parse_duration(&lookup, "BOOK_MARKET_LOGIN_DELAY_MS", Duration::from_millis)?
            .unwrap_or(DEFAULT_DELAY);
        let form_delay = parse_duration(&lookup, "BOOK_MARKET_FORM_DELAY_MS", Duration::from_millis)?
            .unwrap_or(DEFAULT_DELAY);

        if database_url.contains(":memory:") {
            warn!("In-memory database configured - wishlist and session will not survive restarts");
        }

        Ok(Self {
            database_url,
            catalog,
            login_delay,
            form_delay,
        })
    }
}

fn parse_duration(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    unit: fn(u64) -> Duration,
) -> Result<Option<Duration>> {
    lookup(key)
        .map(|raw| {
            u64::from_str(raw.trim())
                .map(unit)
                .with_context(|| format!("{key} must be a whole number, got {raw:?}"))
        })
        .transpose()
}

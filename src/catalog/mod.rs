//! Catalog store and the sources it can be loaded from

use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::{error, info, warn};

use crate::filter::{self, FilterQuery};
use crate::models::Listing;
use crate::traits::CatalogSource;

const BUNDLED_CATALOG: &str = include_str!("../../data/catalog.json");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogStatus {
    Loading,
    Ready,
    /// The source failed; the catalog is empty
    Failed,
}

/// What the listing page should show for a query
#[derive(Debug, Clone, PartialEq)]
pub enum BrowseState {
    Loading,
    Empty,
    Listings(Vec<Listing>),
}

/// Holds the listings loaded from a [`CatalogSource`]
pub struct CatalogStore {
    listings: Vec<Listing>,
    status: CatalogStatus,
}

impl CatalogStore {
    pub const fn new() -> Self {
        Self {
            listings: Vec::new(),
            status: CatalogStatus::Loading,
        }
    }

    /// Replace the catalog with the contents of `source`.
    ///
    /// A failing source leaves an empty catalog behind; the failure is only
    /// logged and shows up in [`CatalogStore::status`].
    pub async fn load(&mut self, source: &dyn CatalogSource) -> CatalogStatus {
        self.status = CatalogStatus::Loading;
        info!("Loading catalog from {}", source.name());

        match source.fetch_listings().await {
            Ok(raw) => {
                self.listings = validate_listings(raw);
                self.status = CatalogStatus::Ready;
                info!("Loaded {} listings from {}", self.listings.len(), source.name());
            }
            Err(e) => {
                error!("Error fetching books from {}: {:#}", source.name(), e);
                self.listings.clear();
                self.status = CatalogStatus::Failed;
            }
        }

        self.status
    }

    pub const fn status(&self) -> CatalogStatus {
        self.status
    }

    pub fn listings(&self) -> &[Listing] {
        &self.listings
    }

    pub fn get(&self, id: &str) -> Option<&Listing> {
        self.listings.iter().find(|listing| listing.id == id)
    }

    /// Run the filter engine over the loaded catalog
    pub fn browse(&self, query: &FilterQuery) -> BrowseState {
        if self.status == CatalogStatus::Loading {
            return BrowseState::Loading;
        }

        let visible = filter::apply(&self.listings, query);
        if visible.is_empty() {
            BrowseState::Empty
        } else {
            BrowseState::Listings(visible)
        }
    }
}

impl Default for CatalogStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Drop listings that break the price invariant or reuse an id
fn validate_listings(raw: Vec<Listing>) -> Vec<Listing> {
    let mut seen = HashSet::new();

    raw.into_iter()
        .filter(|listing| match listing.validate() {
            Ok(()) => true,
            Err(e) => {
                warn!("Skipping listing: {}", e);
                false
            }
        })
        .filter(|listing| {
            let fresh = seen.insert(listing.id.clone());
            if !fresh {
                warn!("Skipping duplicate listing id {}", listing.id);
            }
            fresh
        })
        .collect()
}

/// Decode a JSON array of listings, dropping records that do not deserialize.
///
/// Only a document that is not an array at all is an error.
fn parse_catalog(json: &str) -> Result<Vec<Listing>> {
    let records: Vec<serde_json::Value> =
        serde_json::from_str(json).context("catalog is not a JSON array")?;

    Ok(decode_records(records))
}

pub(crate) fn decode_records(records: Vec<serde_json::Value>) -> Vec<Listing> {
    records
        .into_iter()
        .enumerate()
        .filter_map(|(index, record)| {
            serde_json::from_value::<Listing>(record)
                .map_err(|e| warn!("Skipping catalog record {}: {}", index, e))
                .ok()
        })
        .collect()
}

/// Bundled sample catalog served after a fixed delay
#[derive(Debug, Clone)]
pub struct FixtureCatalog {
    delay: Duration,
}

impl FixtureCatalog {
    pub const fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl CatalogSource for FixtureCatalog {
    fn name(&self) -> &str {
        "bundled catalog"
    }

    async fn fetch_listings(&self) -> Result<Vec<Listing>> {
        tokio::time::sleep(self.delay).await;
        parse_catalog(BUNDLED_CATALOG)
    }
}

/// Listings read from a JSON file on disk
#[derive(Debug, Clone)]
pub struct JsonFileCatalog {
    path: PathBuf,
    name: String,
}

impl JsonFileCatalog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path.display().to_string();
        Self { path, name }
    }
}

#[async_trait]
impl CatalogSource for JsonFileCatalog {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch_listings(&self) -> Result<Vec<Listing>> {
        let json = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("failed to read {}", self.path.display()))?;

        parse_catalog(&json)
    }
}

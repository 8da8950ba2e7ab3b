use std::sync::Arc;

use anyhow::{Result, anyhow};
use tracing::info;

use crate::api::{ApiClient, HttpCatalog};
use crate::catalog::{BrowseState, CatalogStatus, CatalogStore, FixtureCatalog, JsonFileCatalog};
use crate::config::{CatalogConfig, Config};
use crate::database::Database;
use crate::forms::{FormDesk, ListingDraft, MockFormService, Notification, ProfileUpdate};
use crate::models::WishlistItem;
use crate::query::FilterController;
use crate::session::{MockIdentityProvider, SessionStore};
use crate::traits::{CatalogSource, KeyValueStore, Navigator, TOKEN_KEY};
use crate::wishlist::WishlistStore;

/// The application shell: one of each store, built once per session
pub struct BookMarket {
    pub catalog: CatalogStore,
    pub filters: FilterController,
    pub wishlist: WishlistStore,
    pub session: SessionStore,
    pub forms: FormDesk,
}

impl BookMarket {
    /// Open storage, restore wishlist and session, and load the configured catalog
    pub async fn new(config: &Config, query_string: &str, navigator: Arc<dyn Navigator>) -> Result<Self> {
        let database = Database::new(&config.database_url).await?;
        let storage: Arc<dyn KeyValueStore> = Arc::new(database);

        let source = catalog_source(config, storage.as_ref()).await?;
        Ok(Self::with_parts(storage, source.as_ref(), query_string, navigator, config).await)
    }

    /// Assemble from explicit collaborators
    pub async fn with_parts(
        storage: Arc<dyn KeyValueStore>,
        source: &dyn CatalogSource,
        query_string: &str,
        navigator: Arc<dyn Navigator>,
        config: &Config,
    ) -> Self {
        let provider = Arc::new(MockIdentityProvider::new(config.login_delay));
        let session = SessionStore::load(storage.clone(), provider).await;
        let wishlist = WishlistStore::load(storage).await;
        let filters = FilterController::new(query_string, navigator);
        let forms = FormDesk::new(Arc::new(MockFormService::new(config.form_delay)));

        let mut catalog = CatalogStore::new();
        catalog.load(source).await;

        Self {
            catalog,
            filters,
            wishlist,
            session,
            forms,
        }
    }

    /// Listings visible under the current filters
    pub fn browse(&self) -> BrowseState {
        self.catalog.browse(self.filters.query())
    }

    pub fn catalog_failed(&self) -> bool {
        self.catalog.status() == CatalogStatus::Failed
    }

    /// Save a catalog listing; returns `false` if it was already saved
    pub async fn save_listing(&mut self, id: &str) -> Result<bool> {
        let listing = self
            .catalog
            .get(id)
            .ok_or_else(|| anyhow!("no listing with id {id}"))?;

        let added = self.wishlist.add(WishlistItem::from(listing)).await?;
        if added {
            info!("{} has been added to your wishlist", listing.title);
        } else {
            info!("{} is already in your wishlist", listing.title);
        }
        Ok(added)
    }

    /// List a book as the signed-in user
    pub async fn add_book(&self, draft: ListingDraft) -> Notification {
        self.forms.add_book(self.session.user(), draft).await
    }

    pub async fn request_exchange(&self, id: &str) -> Notification {
        match self.catalog.get(id) {
            Some(listing) => self.forms.request_exchange(listing).await,
            None => unknown_listing(id),
        }
    }

    pub async fn contact_seller(&self, id: &str) -> Notification {
        match self.catalog.get(id) {
            Some(listing) => self.forms.contact_seller(listing).await,
            None => unknown_listing(id),
        }
    }

    pub async fn update_profile(&self, update: ProfileUpdate) -> Notification {
        self.forms.update_profile(self.session.user(), update).await
    }
}

fn unknown_listing(id: &str) -> Notification {
    Notification::failure("Book not found", format!("No listing with id {id}."))
}

async fn catalog_source(config: &Config, storage: &dyn KeyValueStore) -> Result<Box<dyn CatalogSource>> {
    let source: Box<dyn CatalogSource> = match &config.catalog {
        CatalogConfig::Fixture { delay } => Box::new(FixtureCatalog::new(*delay)),
        CatalogConfig::File(path) => Box::new(JsonFileCatalog::new(path)),
        CatalogConfig::Api { base_url, timeout } => {
            let token = storage.get(TOKEN_KEY).await.ok().flatten();
            Box::new(HttpCatalog::new(ApiClient::new(base_url, *timeout, token)?))
        }
    };
    Ok(source)
}

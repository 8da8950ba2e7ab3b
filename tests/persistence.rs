use std::sync::Arc;
use std::time::Duration;

use book_market::BookMarket;
use book_market::catalog::FixtureCatalog;
use book_market::config::{CatalogConfig, Config};
use book_market::database::Database;
use book_market::query::MemoryHistory;
use book_market::traits::{KeyValueStore, WISHLIST_KEY};

fn config(database_url: String) -> Config {
    Config {
        database_url,
        catalog: CatalogConfig::Fixture {
            delay: Duration::ZERO,
        },
        login_delay: Duration::ZERO,
        form_delay: Duration::ZERO,
    }
}

#[tokio::test]
async fn wishlist_and_session_survive_restart() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(format!("sqlite://{}", dir.path().join("market.db").display()));

    {
        let mut market = BookMarket::new(&config, "", Arc::new(MemoryHistory::new()))
            .await
            .unwrap();
        assert!(market.save_listing("2").await.unwrap());
        assert!(market.save_listing("5").await.unwrap());
        assert!(!market.save_listing("2").await.unwrap());
        assert!(market.wishlist.remove("5").await.unwrap());
        market.session.login("reader@example.com", "pw").await.unwrap();
    }

    let market = BookMarket::new(&config, "", Arc::new(MemoryHistory::new()))
        .await
        .unwrap();

    let ids: Vec<&str> = market.wishlist.items().iter().map(|i| i.id.as_str()).collect();
    assert_eq!(ids, vec!["2"]);
    assert_eq!(
        market.session.user().map(|u| u.email.as_str()),
        Some("reader@example.com")
    );
}

#[tokio::test]
async fn corrupt_wishlist_on_disk_starts_empty() {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}", dir.path().join("market.db").display());

    let database = Database::new(&url).await.unwrap();
    database.set(WISHLIST_KEY, "[{\"id\":").await.unwrap();
    let storage: Arc<dyn KeyValueStore> = Arc::new(database);

    let mut market = BookMarket::with_parts(
        storage.clone(),
        &FixtureCatalog::new(Duration::ZERO),
        "",
        Arc::new(MemoryHistory::new()),
        &config(url),
    )
    .await;

    assert!(market.wishlist.is_empty());
    market.save_listing("1").await.unwrap();
    assert!(storage.get(WISHLIST_KEY).await.unwrap().unwrap().contains("\"id\":\"1\""));
}

#[tokio::test]
async fn saving_unknown_listing_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(format!("sqlite://{}", dir.path().join("market.db").display()));

    let mut market = BookMarket::new(&config, "", Arc::new(MemoryHistory::new()))
        .await
        .unwrap();

    assert!(market.save_listing("does-not-exist").await.is_err());
    assert!(market.wishlist.is_empty());
}

use std::sync::Arc;
use std::time::Duration;

use book_market::BookMarket;
use book_market::catalog::FixtureCatalog;
use book_market::config::{CatalogConfig, Config};
use book_market::database::MemoryStore;
use book_market::forms::{ListingDraft, ProfileUpdate};
use book_market::models::{Condition, ListingType};
use book_market::query::MemoryHistory;
use pretty_assertions::assert_eq;

async fn market() -> BookMarket {
    let config = Config {
        database_url: "sqlite::memory:".to_string(),
        catalog: CatalogConfig::Fixture {
            delay: Duration::ZERO,
        },
        login_delay: Duration::ZERO,
        form_delay: Duration::ZERO,
    };

    BookMarket::with_parts(
        Arc::new(MemoryStore::new()),
        &FixtureCatalog::new(Duration::ZERO),
        "",
        Arc::new(MemoryHistory::new()),
        &config,
    )
    .await
}

fn draft() -> ListingDraft {
    ListingDraft {
        title: "The Hobbit".to_string(),
        author: "J.R.R. Tolkien".to_string(),
        description: "First paperback printing.".to_string(),
        category: "fiction".to_string(),
        condition: Condition::VeryGood,
        price: Some(9.0),
        listing_type: ListingType::Both,
    }
}

#[tokio::test]
async fn listing_a_book_needs_a_session() {
    let mut market = market().await;

    let refused = market.add_book(draft()).await;
    assert_eq!(refused.title, "Please login");
    assert!(refused.destructive);

    market.session.login("reader@example.com", "pw").await.unwrap();
    let listed = market.add_book(draft()).await;
    assert_eq!(listed.title, "Book added successfully");
    assert!(!listed.destructive);

    // Listing is a mock submission; the catalog stays as loaded
    assert!(market.catalog.listings().iter().all(|l| l.title != "The Hobbit"));
}

#[tokio::test]
async fn detail_actions_follow_the_listing_type() {
    let market = market().await;

    let sale_only = market.request_exchange("1").await;
    assert_eq!(sale_only.title, "Exchange not available");
    assert_eq!(sale_only.description, "The Midnight Library is only offered for sale.");

    let swap = market.request_exchange("8").await;
    assert_eq!(
        swap.description,
        "Your exchange request for Dune has been sent to the seller."
    );

    let contact = market.contact_seller("1").await;
    assert_eq!(contact.title, "Contact request sent");

    let missing = market.contact_seller("404").await;
    assert_eq!(missing.title, "Book not found");
    assert!(missing.destructive);
}

#[tokio::test]
async fn profile_edits_require_login() {
    let mut market = market().await;
    let update = ProfileUpdate {
        name: "John Doe".to_string(),
        email: "john@example.com".to_string(),
        phone: "555-0100".to_string(),
        address: String::new(),
        bio: String::new(),
    };

    assert!(market.update_profile(update.clone()).await.destructive);

    market.session.login("john@example.com", "pw").await.unwrap();
    assert_eq!(market.update_profile(update).await.title, "Profile updated");
}

//! Plain-text renderings of the marketplace pages

use crate::catalog::BrowseState;
use crate::charity::Charity;
use crate::forms::Notification;
use crate::models::{Listing, ListingType, WishlistItem};

pub const NO_BOOKS_TITLE: &str = "No books found";
pub const NO_BOOKS_HINT: &str = "Try adjusting your filters to find what you're looking for.";
pub const LOADING: &str = "Loading books...";
pub const EMPTY_WISHLIST: &str = "Your wishlist is empty";
pub const NO_ORGANIZATIONS_TITLE: &str = "No organizations found";
pub const NO_ORGANIZATIONS_HINT: &str = "Try adjusting your search or filters.";

fn badge(kind: ListingType) -> Option<&'static str> {
    match kind {
        ListingType::Sell => None,
        ListingType::Exchange => Some("Exchange"),
        ListingType::Both => Some("Sell/Exchange"),
    }
}

fn offer_label(kind: ListingType) -> &'static str {
    match kind {
        ListingType::Sell => "For Sale",
        ListingType::Exchange => "For Exchange",
        ListingType::Both => "Sell/Exchange",
    }
}

/// One-line summary shown in the listing grid
pub fn render_card(listing: &Listing) -> String {
    let line = format!(
        "[{}] {} by {}  ${:.2}  {}",
        listing.id, listing.title, listing.author, listing.price, listing.condition
    );
    match badge(listing.listing_type) {
        Some(badge) => format!("{line}  <{badge}>"),
        None => line,
    }
}

/// Everything the detail dialog shows, including the actions it offers
pub fn render_detail(listing: &Listing) -> String {
    let mut actions = Vec::new();
    if listing.listing_type.is_for_sale() {
        actions.push("Add to Wishlist");
    }
    if listing.listing_type.is_for_exchange() {
        actions.push("Request Exchange");
    }
    actions.push("Contact Seller");

    [
        listing.title.clone(),
        format!("by {}", listing.author),
        String::new(),
        format!("${:.2}  {}", listing.price, offer_label(listing.listing_type)),
        format!("Condition: {}", listing.condition),
        format!("Category: {}", listing.category),
        format!("Seller: {}", listing.seller.name),
        format!("Listed: {}", listing.created_at.format("%Y-%m-%d")),
        String::new(),
        listing.description.clone(),
        String::new(),
        format!("Actions: {}", actions.join(" | ")),
    ]
    .join("\n")
}

/// Listing page for a browse result.
///
/// A failed catalog load reaches this as [`BrowseState::Empty`] and reads
/// exactly like a query with no matches.
pub fn render_browse(state: &BrowseState) -> String {
    match state {
        BrowseState::Loading => LOADING.to_string(),
        BrowseState::Empty => format!("{NO_BOOKS_TITLE}\n{NO_BOOKS_HINT}"),
        BrowseState::Listings(listings) => listings
            .iter()
            .map(render_card)
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

pub fn render_wishlist(items: &[WishlistItem]) -> String {
    if items.is_empty() {
        return format!(
            "{EMPTY_WISHLIST}\nLooks like you haven't added any books to your wishlist yet."
        );
    }

    let total: f64 = items.iter().map(|item| item.price).sum();

    let mut lines = Vec::with_capacity(items.len() + 2);
    lines.push(format!("Saved Books ({})", items.len()));
    lines.extend(items.iter().map(|item| {
        format!(
            "[{}] {} by {}  ${:.2}  {}",
            item.id, item.title, item.author, item.price, item.condition
        )
    }));
    lines.push(format!("Total: ${total:.2}"));
    lines.join("\n")
}

fn render_charity(charity: &Charity) -> String {
    [
        format!("{}  <{}>", charity.name, charity.category),
        charity.location.clone(),
        charity.description.clone(),
        format!("Needs: {}", charity.needs.join(", ")),
        format!("Contact: {}", charity.email),
        charity.website.clone(),
    ]
    .join("\n")
}

pub fn render_charities(charities: &[&Charity]) -> String {
    if charities.is_empty() {
        return format!("{NO_ORGANIZATIONS_TITLE}\n{NO_ORGANIZATIONS_HINT}");
    }

    charities
        .iter()
        .map(|charity| render_charity(charity))
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn render_notification(notification: &Notification) -> String {
    let marker = if notification.destructive { "! " } else { "" };
    format!("{marker}{}\n{}", notification.title, notification.description)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Condition, Seller};
    use chrono::{TimeZone, Utc};

    fn listing(kind: ListingType) -> Listing {
        Listing {
            id: "42".to_string(),
            title: "Middlemarch".to_string(),
            author: "George Eliot".to_string(),
            description: "Provincial life.".to_string(),
            price: 7.5,
            condition: Condition::LikeNew,
            category: "Fiction".to_string(),
            image: String::new(),
            seller: Seller {
                id: "s".to_string(),
                name: "Mary".to_string(),
            },
            listing_type: kind,
            created_at: Utc.with_ymd_and_hms(2024, 5, 6, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn card_shows_price_condition_and_badge() {
        assert_eq!(
            render_card(&listing(ListingType::Both)),
            "[42] Middlemarch by George Eliot  $7.50  like-new  <Sell/Exchange>"
        );
        assert!(!render_card(&listing(ListingType::Sell)).contains('<'));
    }

    #[test]
    fn detail_offers_actions_by_listing_type() {
        let exchange = render_detail(&listing(ListingType::Exchange));

        assert!(exchange.contains("For Exchange"));
        assert!(exchange.contains("Listed: 2024-05-06"));
        assert!(exchange.ends_with("Actions: Request Exchange | Contact Seller"));
    }

    #[test]
    fn empty_and_loading_are_distinct() {
        assert_ne!(render_browse(&BrowseState::Empty), render_browse(&BrowseState::Loading));
        assert!(render_browse(&BrowseState::Empty).starts_with(NO_BOOKS_TITLE));
    }

    #[test]
    fn wishlist_lists_items_and_total() {
        let item = WishlistItem::from(&listing(ListingType::Sell));
        let page = render_wishlist(&[item.clone(), item]);

        assert!(page.starts_with("Saved Books (2)"));
        assert!(page.ends_with("Total: $15.00"));
        assert!(render_wishlist(&[]).starts_with(EMPTY_WISHLIST));
    }

    #[test]
    fn detail_lists_every_section_in_order() {
        let detail = render_detail(&listing(ListingType::Both));

        assert_eq!(
            detail.lines().collect::<Vec<_>>(),
            vec![
                "Middlemarch",
                "by George Eliot",
                "",
                "$7.50  Sell/Exchange",
                "Condition: like-new",
                "Category: Fiction",
                "Seller: Mary",
                "Listed: 2024-05-06",
                "",
                "Provincial life.",
                "",
                "Actions: Add to Wishlist | Request Exchange | Contact Seller",
            ]
        );
    }

    #[test]
    fn charities_render_or_explain_why_none_match() {
        let charities = crate::charity::bundled().unwrap();
        let found = crate::charity::search(&charities, "bookmobile", None);

        let page = render_charities(&found);
        assert!(page.starts_with("Bookmobile Kids  <Education>"));
        assert!(page.contains("Needs: Picture Books, Early Readers"));

        assert_eq!(
            render_charities(&[]),
            format!("{NO_ORGANIZATIONS_TITLE}\n{NO_ORGANIZATIONS_HINT}")
        );
    }

    #[test]
    fn destructive_notifications_are_marked() {
        let ok = Notification::success("Profile updated", "Saved.");
        let failed = Notification::failure("Please login", "You need to be logged in to add books");

        assert_eq!(render_notification(&ok), "Profile updated\nSaved.");
        assert!(render_notification(&failed).starts_with("! Please login"));
    }
}

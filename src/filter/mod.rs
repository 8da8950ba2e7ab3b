//! # Filter/Sort Engine
//!
//! Maps a catalog and a [`FilterQuery`] to the ordered subset of listings a
//! visitor should see. The engine never mutates its inputs: every call builds
//! a fresh vector, so recomputing from the same inputs always yields the same
//! output.
//!
//! Each active filter dimension becomes one [`Predicate`]; a listing is kept
//! only when every predicate matches. Sorting runs after filtering and is
//! stable, so listings that compare equal keep their catalog order.

use std::cmp::Ordering;

use icu_collator::{Collator, CollatorOptions};
use tracing::{debug, warn};

use crate::models::Listing;

/// Either "no constraint" or a single required value
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    All,
    Only(String),
}

impl Selection {
    pub fn value(&self) -> Option<&str> {
        match self {
            Self::All => None,
            Self::Only(value) => Some(value.as_str()),
        }
    }
}

/// Listing-type dimension of a query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListingTypeFilter {
    #[default]
    All,
    ForSale,
    ForExchange,
    SaleOrExchange,
}

/// Ordering applied to the filtered listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    Newest,
    PriceAsc,
    PriceDesc,
    TitleAsc,
    TitleDesc,
}

/// The active filter and sort selections
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterQuery {
    pub category: Selection,
    pub condition: Selection,
    pub listing_type: ListingTypeFilter,
    pub sort: SortKey,
}

/// One filter dimension, ready to be tested against a listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    Category(String),
    Condition(String),
    ListingType(ListingTypeFilter),
}

impl Predicate {
    pub fn matches(&self, listing: &Listing) -> bool {
        match self {
            Self::Category(category) => listing.category.to_lowercase() == category.to_lowercase(),
            Self::Condition(condition) => {
                listing.condition.as_str().replace('-', " ").to_lowercase()
                    == condition.to_lowercase()
            }
            Self::ListingType(filter) => {
                let kind = listing.listing_type;
                match filter {
                    ListingTypeFilter::All => true,
                    ListingTypeFilter::ForSale => kind.is_for_sale(),
                    ListingTypeFilter::ForExchange => kind.is_for_exchange(),
                    ListingTypeFilter::SaleOrExchange => {
                        kind.is_for_sale() && kind.is_for_exchange()
                    }
                }
            }
        }
    }
}

impl FilterQuery {
    /// Predicates for every dimension that is not set to "all"
    pub fn predicates(&self) -> Vec<Predicate> {
        let mut predicates = Vec::with_capacity(3);

        if let Some(category) = self.category.value() {
            predicates.push(Predicate::Category(category.to_string()));
        }
        if let Some(condition) = self.condition.value() {
            predicates.push(Predicate::Condition(condition.to_string()));
        }
        if self.listing_type != ListingTypeFilter::All {
            predicates.push(Predicate::ListingType(self.listing_type));
        }

        predicates
    }

    pub fn matches(&self, listing: &Listing) -> bool {
        self.predicates().iter().all(|predicate| predicate.matches(listing))
    }
}

impl SortKey {
    pub fn compare(self, a: &Listing, b: &Listing) -> Ordering {
        match self {
            Self::Newest => b.created_at.cmp(&a.created_at),
            Self::PriceAsc => a.price.total_cmp(&b.price),
            Self::PriceDesc => b.price.total_cmp(&a.price),
            Self::TitleAsc => compare_titles(&a.title, &b.title),
            Self::TitleDesc => compare_titles(&b.title, &a.title),
        }
    }
}

thread_local! {
    static COLLATOR: Option<Collator> = Collator::try_new(&Default::default(), CollatorOptions::new())
        .map_err(|e| warn!("Collator unavailable, titles sort by case-folded code points: {}", e))
        .ok();
}

/// Root-locale collation, as a browser's `localeCompare` does it: accents and
/// case only matter when the base letters are equal.
pub fn compare_titles(a: &str, b: &str) -> Ordering {
    COLLATOR.with(|collator| match collator {
        Some(collator) => collator.compare(a, b),
        None => a
            .chars()
            .flat_map(char::to_lowercase)
            .cmp(b.chars().flat_map(char::to_lowercase))
            .then_with(|| b.cmp(a)),
    })
}

/// Filter `listings` by `query` and order the survivors.
pub fn apply(listings: &[Listing], query: &FilterQuery) -> Vec<Listing> {
    let predicates = query.predicates();

    let mut visible: Vec<Listing> = listings
        .iter()
        .filter(|listing| predicates.iter().all(|predicate| predicate.matches(listing)))
        .cloned()
        .collect();

    visible.sort_by(|a, b| query.sort.compare(a, b));

    debug!(
        "Filtered {} listings down to {} ({} active predicates)",
        listings.len(),
        visible.len(),
        predicates.len()
    );

    visible
}

//! Shareable query string and the controller that keeps it in sync with the
//! current [`FilterQuery`].

use std::sync::{Arc, Mutex};

use tokio::sync::watch;
use tracing::{debug, info};

use crate::filter::{FilterQuery, ListingTypeFilter, Selection, SortKey};
use crate::traits::Navigator;

pub const CATEGORY_KEY: &str = "category";
pub const CONDITION_KEY: &str = "condition";
pub const LISTING_TYPE_KEY: &str = "listingType";
pub const SORT_KEY: &str = "sort";

pub const ALL_CATEGORIES: &str = "All Categories";
pub const ALL_CONDITIONS: &str = "All Conditions";

pub const CATEGORIES: [&str; 9] = [
    ALL_CATEGORIES,
    "Fiction",
    "Non-Fiction",
    "Science",
    "History",
    "Biography",
    "Children's Books",
    "Textbooks",
    "Other",
];

pub const CONDITIONS: [&str; 6] = [
    ALL_CONDITIONS,
    "New",
    "Like New",
    "Very Good",
    "Good",
    "Acceptable",
];

/// Ordered key/value pairs of a URL query string
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    /// Parse `a=1&b=two%20words`; a leading `?` and `+` for spaces are accepted
    pub fn parse(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);

        let pairs = query
            .split('&')
            .filter(|pair| !pair.is_empty())
            .map(|pair| {
                let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
                (decode_component(key), decode_component(value))
            })
            .collect();

        Self { pairs }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Replace the first entry for `key` in place, dropping any duplicates, or append
    pub fn set(&mut self, key: &str, value: &str) {
        let mut seen = false;
        self.pairs.retain_mut(|(k, v)| {
            if k != key {
                return true;
            }
            if seen {
                return false;
            }
            seen = true;
            *v = value.to_string();
            true
        });

        if !seen {
            self.pairs.push((key.to_string(), value.to_string()));
        }
    }

    pub fn remove(&mut self, key: &str) {
        self.pairs.retain(|(k, _)| k != key);
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn to_query_string(&self) -> String {
        self.pairs
            .iter()
            .map(|(key, value)| format!("{}={}", urlencoding::encode(key), urlencoding::encode(value)))
            .collect::<Vec<_>>()
            .join("&")
    }
}

fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced).map_or(spaced.clone(), |decoded| decoded.into_owned())
}

impl ListingTypeFilter {
    pub const fn label(self) -> &'static str {
        match self {
            Self::All => "All Listings",
            Self::ForSale => "For Sale",
            Self::ForExchange => "For Exchange",
            Self::SaleOrExchange => "Sale or Exchange",
        }
    }

    pub const fn slug(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::ForSale => "for-sale",
            Self::ForExchange => "for-exchange",
            Self::SaleOrExchange => "sale-or-exchange",
        }
    }

    pub const ALL: [Self; 4] = [
        Self::All,
        Self::ForSale,
        Self::ForExchange,
        Self::SaleOrExchange,
    ];

    /// Accepts labels or slugs in any case
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        Self::ALL.into_iter().find(|kind| {
            kind.label().eq_ignore_ascii_case(raw) || kind.slug().eq_ignore_ascii_case(raw)
        })
    }
}

impl SortKey {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Newest => "Newest First",
            Self::PriceAsc => "Price: Low to High",
            Self::PriceDesc => "Price: High to Low",
            Self::TitleAsc => "Alphabetical: A-Z",
            Self::TitleDesc => "Alphabetical: Z-A",
        }
    }

    pub const fn slug(self) -> &'static str {
        match self {
            Self::Newest => "newest",
            Self::PriceAsc => "price-asc",
            Self::PriceDesc => "price-desc",
            Self::TitleAsc => "title-asc",
            Self::TitleDesc => "title-desc",
        }
    }

    pub const ALL: [Self; 5] = [
        Self::Newest,
        Self::PriceAsc,
        Self::PriceDesc,
        Self::TitleAsc,
        Self::TitleDesc,
    ];

    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        Self::ALL
            .into_iter()
            .find(|key| key.label().eq_ignore_ascii_case(raw) || key.slug().eq_ignore_ascii_case(raw))
    }
}

/// Free-form dimension: the "all" label, the `all` slug and blank values mean no constraint
fn parse_selection(raw: Option<&str>, all_label: &str) -> Selection {
    match raw.map(str::trim) {
        None => Selection::All,
        Some(value)
            if value.is_empty()
                || value.eq_ignore_ascii_case(all_label)
                || value.eq_ignore_ascii_case("all") =>
        {
            Selection::All
        }
        Some(value) => Selection::Only(value.to_string()),
    }
}

impl FilterQuery {
    /// Rebuild a query from the shareable representation
    pub fn from_params(params: &QueryParams) -> Self {
        let listing_type = params.get(LISTING_TYPE_KEY).map_or(ListingTypeFilter::All, |raw| {
            ListingTypeFilter::parse(raw).unwrap_or_else(|| {
                debug!("Unknown listing type {:?}, showing all listings", raw);
                ListingTypeFilter::All
            })
        });

        let sort = params.get(SORT_KEY).map_or(SortKey::Newest, |raw| {
            SortKey::parse(raw).unwrap_or_else(|| {
                debug!("Unknown sort {:?}, falling back to newest", raw);
                SortKey::Newest
            })
        });

        Self {
            category: parse_selection(params.get(CATEGORY_KEY), ALL_CATEGORIES),
            condition: parse_selection(params.get(CONDITION_KEY), ALL_CONDITIONS),
            listing_type,
            sort,
        }
    }

    pub fn from_query_string(query: &str) -> Self {
        Self::from_params(&QueryParams::parse(query))
    }

    /// Canonical query string: only non-default dimensions, in a fixed order
    pub fn to_query_string(&self) -> String {
        let mut params = QueryParams::default();
        if let Some(category) = self.category.value() {
            params.set(CATEGORY_KEY, category);
        }
        if let Some(condition) = self.condition.value() {
            params.set(CONDITION_KEY, condition);
        }
        if self.listing_type != ListingTypeFilter::All {
            params.set(LISTING_TYPE_KEY, self.listing_type.label());
        }
        if self.sort != SortKey::Newest {
            params.set(SORT_KEY, self.sort.label());
        }
        params.to_query_string()
    }
}

/// History stand-in that remembers every replacement
#[derive(Debug, Clone, Default)]
pub struct MemoryHistory {
    entries: Arc<Mutex<Vec<String>>>,
}

impl MemoryHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every query string written so far, oldest first
    pub fn entries(&self) -> Vec<String> {
        self.entries
            .lock()
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }

    pub fn last(&self) -> Option<String> {
        self.entries().pop()
    }
}

impl Navigator for MemoryHistory {
    fn replace(&self, query: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.push(query.to_string());
        }
    }
}

/// Owns the current [`FilterQuery`] and mirrors it into the shareable query string.
///
/// Default values are never written, and a setter that would not change
/// the query string does not touch the navigator.
pub struct FilterController {
    query: FilterQuery,
    params: QueryParams,
    navigator: Arc<dyn Navigator>,
    state: watch::Sender<FilterQuery>,
}

impl FilterController {
    /// Build from a deep link such as `category=Fiction&sort=Price:%20Low%20to%20High`
    pub fn new(query_string: &str, navigator: Arc<dyn Navigator>) -> Self {
        let params = QueryParams::parse(query_string);
        let query = FilterQuery::from_params(&params);
        let (state, _) = watch::channel(query.clone());

        Self {
            query,
            params,
            navigator,
            state,
        }
    }

    pub fn query(&self) -> &FilterQuery {
        &self.query
    }

    pub fn query_string(&self) -> String {
        self.params.to_query_string()
    }

    /// Receiver that observes every state change
    pub fn subscribe(&self) -> watch::Receiver<FilterQuery> {
        self.state.subscribe()
    }

    pub fn set_category(&mut self, category: &str) {
        let selection = parse_selection(Some(category), ALL_CATEGORIES);
        self.query.category = selection.clone();
        self.sync(CATEGORY_KEY, selection.value());
    }

    pub fn set_condition(&mut self, condition: &str) {
        let selection = parse_selection(Some(condition), ALL_CONDITIONS);
        self.query.condition = selection.clone();
        self.sync(CONDITION_KEY, selection.value());
    }

    pub fn set_listing_type(&mut self, listing_type: ListingTypeFilter) {
        self.query.listing_type = listing_type;
        let value = (listing_type != ListingTypeFilter::All).then(|| listing_type.label());
        self.sync(LISTING_TYPE_KEY, value);
    }

    pub fn set_sort(&mut self, sort: SortKey) {
        self.query.sort = sort;
        let value = (sort != SortKey::Newest).then(|| sort.label());
        self.sync(SORT_KEY, value);
    }

    /// Remove filter keys whose value reads as the default, such as an
    /// `All Categories` carried over from a deep link
    fn drop_defaulted(&mut self) {
        let Self { query, params, .. } = self;

        if query.category == Selection::All {
            params.remove(CATEGORY_KEY);
        }
        if query.condition == Selection::All {
            params.remove(CONDITION_KEY);
        }
        if query.listing_type == ListingTypeFilter::All {
            params.remove(LISTING_TYPE_KEY);
        }
        if query.sort == SortKey::Newest {
            params.remove(SORT_KEY);
        }
    }

    /// Publish the state, then write `key` only if the query string disagrees with it
    fn sync(&mut self, key: &str, value: Option<&str>) {
        self.state.send_replace(self.query.clone());

        let reflected = FilterQuery::from_params(&self.params);
        if reflected == self.query {
            debug!("Query string already reflects {}, skipping rewrite", key);
            return;
        }

        match value {
            Some(value) => self.params.set(key, value),
            None => self.params.remove(key),
        }
        self.drop_defaulted();

        let query_string = self.params.to_query_string();
        info!("Filters changed, replacing query with {:?}", query_string);
        self.navigator.replace(&query_string);
    }
}

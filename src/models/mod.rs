//! Data models for book listings, wishlist entries and user profiles

use std::fmt;
use std::str::FromStr;

use anyhow::{Error, Result, anyhow, bail};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Physical condition of a listed book
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Condition {
    New,
    LikeNew,
    VeryGood,
    Good,
    Acceptable,
}

impl Condition {
    /// Kebab-case form as stored in catalog records
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::LikeNew => "like-new",
            Self::VeryGood => "very-good",
            Self::Good => "good",
            Self::Acceptable => "acceptable",
        }
    }
}

impl FromStr for Condition {
    type Err = Error;

    fn from_str(raw: &str) -> Result<Self> {
        match raw.trim().to_lowercase().replace(' ', "-").as_str() {
            "new" => Ok(Self::New),
            "like-new" => Ok(Self::LikeNew),
            "very-good" => Ok(Self::VeryGood),
            "good" => Ok(Self::Good),
            "acceptable" => Ok(Self::Acceptable),
            _ => Err(anyhow!("unknown condition: {raw}")),
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a seller is willing to part with a book
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListingType {
    Sell,
    Exchange,
    Both,
}

impl ListingType {
    /// Whether the listing can be bought outright
    pub const fn is_for_sale(self) -> bool {
        matches!(self, Self::Sell | Self::Both)
    }

    /// Whether the listing can be swapped for another book
    pub const fn is_for_exchange(self) -> bool {
        matches!(self, Self::Exchange | Self::Both)
    }
}

impl FromStr for ListingType {
    type Err = Error;

    fn from_str(raw: &str) -> Result<Self> {
        match raw.trim().to_lowercase().as_str() {
            "sell" => Ok(Self::Sell),
            "exchange" => Ok(Self::Exchange),
            "both" => Ok(Self::Both),
            _ => Err(anyhow!("unknown listing type: {raw}")),
        }
    }
}

/// Seller reference embedded in a listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seller {
    pub id: String,
    pub name: String,
}

/// A book offered on the marketplace
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    pub id: String,
    pub title: String,
    pub author: String,
    pub description: String,
    pub price: f64,
    pub condition: Condition,
    pub category: String,
    pub image: String,
    pub seller: Seller,
    pub listing_type: ListingType,
    pub created_at: DateTime<Utc>,
}

impl Listing {
    /// Checks the price invariant.
    ///
    /// Listings that can be bought must carry a finite, non-negative price.
    /// Exchange-only listings keep whatever price they were stored with.
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            bail!("listing has an empty id");
        }

        if self.listing_type.is_for_sale() && !(self.price.is_finite() && self.price >= 0.0) {
            bail!(
                "listing {} is for sale with an invalid price: {}",
                self.id,
                self.price
            );
        }

        Ok(())
    }
}

/// A listing saved to the wishlist
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WishlistItem {
    pub id: String,
    pub title: String,
    pub author: String,
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub condition: Condition,
}

impl From<&Listing> for WishlistItem {
    fn from(listing: &Listing) -> Self {
        Self {
            id: listing.id.clone(),
            title: listing.title.clone(),
            author: listing.author.clone(),
            price: listing.price,
            image: Some(listing.image.clone()).filter(|image| !image.is_empty()),
            condition: listing.condition,
        }
    }
}

/// Profile of the signed-in user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

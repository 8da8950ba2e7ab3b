//! Mock form submissions: listing a book, donating books, requesting
//! donations, editing the profile, and the exchange and contact actions of
//! the detail view.
//!
//! Every submission ends in a [`Notification`]. Validation problems and
//! backend failures become destructive notifications instead of errors, so
//! callers only ever have something to show.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Error, Result, anyhow, bail};
use async_trait::async_trait;
use tracing::{info, warn};

use crate::models::{Condition, Listing, ListingType, User};
use crate::traits::FormService;

/// Toast-style outcome of a submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub description: String,
    pub destructive: bool,
}

impl Notification {
    pub fn success(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            destructive: false,
        }
    }

    pub fn failure(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            destructive: true,
        }
    }

    fn login_required(action: &str) -> Self {
        Self::failure("Please login", format!("You need to be logged in to {action}"))
    }
}

/// A book the signed-in user wants to list
#[derive(Debug, Clone, PartialEq)]
pub struct ListingDraft {
    pub title: String,
    pub author: String,
    pub description: String,
    pub category: String,
    pub condition: Condition,
    pub price: Option<f64>,
    pub listing_type: ListingType,
}

impl ListingDraft {
    /// Books offered for sale need a price; any price given must be a
    /// non-negative amount.
    pub fn validate(&self) -> Result<()> {
        require("title", &self.title)?;
        require("author", &self.author)?;
        require("description", &self.description)?;
        require("category", &self.category)?;

        match self.price {
            Some(price) if !(price.is_finite() && price >= 0.0) => {
                bail!("price must be a non-negative amount, got {price}")
            }
            None if self.listing_type.is_for_sale() => {
                bail!("price is required for books offered for sale")
            }
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DonationPreference {
    Pickup,
    Dropoff,
    Ship,
}

impl FromStr for DonationPreference {
    type Err = Error;

    fn from_str(raw: &str) -> Result<Self> {
        match raw.trim().to_lowercase().as_str() {
            "pickup" => Ok(Self::Pickup),
            "dropoff" | "drop-off" => Ok(Self::Dropoff),
            "ship" => Ok(Self::Ship),
            _ => Err(anyhow!("unknown donation preference: {raw}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrganizationType {
    School,
    Library,
    Nonprofit,
    Community,
    Other,
}

impl fmt::Display for OrganizationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::School => "School",
            Self::Library => "Library",
            Self::Nonprofit => "Non-profit Organization",
            Self::Community => "Community Center",
            Self::Other => "Other",
        })
    }
}

impl FromStr for OrganizationType {
    type Err = Error;

    fn from_str(raw: &str) -> Result<Self> {
        match raw.trim().to_lowercase().as_str() {
            "school" => Ok(Self::School),
            "library" => Ok(Self::Library),
            "nonprofit" | "non-profit" => Ok(Self::Nonprofit),
            "community" => Ok(Self::Community),
            "other" => Ok(Self::Other),
            _ => Err(anyhow!("unknown organization type: {raw}")),
        }
    }
}

/// Books someone wants to give away
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DonationOffer {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub books: String,
    pub preference: DonationPreference,
    pub notes: String,
}

impl DonationOffer {
    pub fn validate(&self) -> Result<()> {
        require("name", &self.name)?;
        require_email("email", &self.email)?;
        require("books to donate", &self.books)?;
        if self.preference == DonationPreference::Pickup {
            require("address", &self.address)?;
        }
        Ok(())
    }
}

/// An organization asking for donated books
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DonationRequest {
    pub organization: String,
    pub organization_type: OrganizationType,
    pub contact_name: String,
    pub contact_email: String,
    pub contact_phone: String,
    pub address: String,
    pub books_needed: String,
    pub purpose: String,
    pub verification: String,
}

impl DonationRequest {
    pub fn validate(&self) -> Result<()> {
        require("organization name", &self.organization)?;
        require("contact person", &self.contact_name)?;
        require_email("contact email", &self.contact_email)?;
        require("address", &self.address)?;
        require("books needed", &self.books_needed)?;
        require("purpose", &self.purpose)?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub bio: String,
}

impl ProfileUpdate {
    pub fn validate(&self) -> Result<()> {
        require("name", &self.name)?;
        require_email("email", &self.email)
    }
}

/// Everything a form can send to the backend
#[derive(Debug, Clone, PartialEq)]
pub enum Submission {
    Listing(ListingDraft),
    Donation(DonationOffer),
    DonationRequest(DonationRequest),
    Profile(ProfileUpdate),
    Exchange { listing_id: String },
    Contact { listing_id: String },
}

impl Submission {
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Listing(_) => "listing",
            Self::Donation(_) => "donation",
            Self::DonationRequest(_) => "donation request",
            Self::Profile(_) => "profile",
            Self::Exchange { .. } => "exchange request",
            Self::Contact { .. } => "contact request",
        }
    }
}

fn require(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        bail!("{field} is required");
    }
    Ok(())
}

fn require_email(field: &str, value: &str) -> Result<()> {
    require(field, value)?;
    if !value.contains('@') {
        bail!("{field} must be an email address");
    }
    Ok(())
}

/// Form backend that accepts everything after a simulated delay.
///
/// Listings wait half again as long as the base delay. Exchange and contact
/// requests resolve immediately.
#[derive(Debug, Clone)]
pub struct MockFormService {
    delay: Duration,
    fail: bool,
}

impl MockFormService {
    pub const fn new(delay: Duration) -> Self {
        Self { delay, fail: false }
    }

    /// A backend that rejects every submission
    pub const fn failing(delay: Duration) -> Self {
        Self { delay, fail: true }
    }
}

#[async_trait]
impl FormService for MockFormService {
    async fn submit(&self, submission: &Submission) -> Result<()> {
        let delay = match submission {
            Submission::Listing(_) => self.delay * 3 / 2,
            Submission::Exchange { .. } | Submission::Contact { .. } => Duration::ZERO,
            _ => self.delay,
        };
        tokio::time::sleep(delay).await;

        if self.fail {
            bail!("form backend rejected the {} submission", submission.kind());
        }

        info!("Accepted {} submission", submission.kind());
        Ok(())
    }
}

/// Validates submissions, forwards them and words the outcome
#[derive(Clone)]
pub struct FormDesk {
    service: Arc<dyn FormService>,
}

impl FormDesk {
    pub fn new(service: Arc<dyn FormService>) -> Self {
        Self { service }
    }

    async fn deliver(&self, submission: Submission, success: Notification, failure: Notification) -> Notification {
        match self.service.submit(&submission).await {
            Ok(()) => success,
            Err(e) => {
                warn!("Failed to deliver {} submission: {:#}", submission.kind(), e);
                failure
            }
        }
    }

    pub async fn add_book(&self, user: Option<&User>, draft: ListingDraft) -> Notification {
        const FAILED: &str = "Failed to add book";

        if user.is_none() {
            return Notification::login_required("add books");
        }
        if let Err(e) = draft.validate() {
            return Notification::failure(FAILED, e.to_string());
        }

        self.deliver(
            Submission::Listing(draft),
            Notification::success("Book added successfully", "Your book has been listed on BookTook."),
            Notification::failure(FAILED, "There was a problem adding your book."),
        )
        .await
    }

    /// Only listings offered for exchange accept exchange requests
    pub async fn request_exchange(&self, listing: &Listing) -> Notification {
        if !listing.listing_type.is_for_exchange() {
            return Notification::failure(
                "Exchange not available",
                format!("{} is only offered for sale.", listing.title),
            );
        }

        self.deliver(
            Submission::Exchange {
                listing_id: listing.id.clone(),
            },
            Notification::success(
                "Exchange request sent",
                format!("Your exchange request for {} has been sent to the seller.", listing.title),
            ),
            Notification::failure("Failed to send exchange request", "There was a problem sending your request."),
        )
        .await
    }

    pub async fn contact_seller(&self, listing: &Listing) -> Notification {
        self.deliver(
            Submission::Contact {
                listing_id: listing.id.clone(),
            },
            Notification::success(
                "Contact request sent",
                format!("The seller will be notified of your interest in {}.", listing.title),
            ),
            Notification::failure("Failed to contact seller", "There was a problem sending your request."),
        )
        .await
    }

    pub async fn donate(&self, offer: DonationOffer) -> Notification {
        const FAILED: &str = "Failed to submit donation";

        if let Err(e) = offer.validate() {
            return Notification::failure(FAILED, e.to_string());
        }

        self.deliver(
            Submission::Donation(offer),
            Notification::success(
                "Donation request submitted",
                "Thank you! We'll connect you with the right charity.",
            ),
            Notification::failure(FAILED, "There was a problem submitting your donation."),
        )
        .await
    }

    pub async fn request_donations(&self, request: DonationRequest) -> Notification {
        const FAILED: &str = "Failed to submit request";

        if let Err(e) = request.validate() {
            return Notification::failure(FAILED, e.to_string());
        }

        let organization = request.organization.clone();
        self.deliver(
            Submission::DonationRequest(request),
            Notification::success(
                "Donation request submitted",
                format!("We'll share {organization}'s request with donors."),
            ),
            Notification::failure(FAILED, "There was a problem submitting your request."),
        )
        .await
    }

    pub async fn update_profile(&self, user: Option<&User>, update: ProfileUpdate) -> Notification {
        const FAILED: &str = "Failed to update profile";

        if user.is_none() {
            return Notification::login_required("edit your profile");
        }
        if let Err(e) = update.validate() {
            return Notification::failure(FAILED, e.to_string());
        }

        self.deliver(
            Submission::Profile(update),
            Notification::success("Profile updated", "Your profile has been updated successfully."),
            Notification::failure(FAILED, "There was a problem updating your profile."),
        )
        .await
    }
}

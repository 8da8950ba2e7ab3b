//! Traits and interfaces for the collaborators the marketplace depends on

use anyhow::Result;
use async_trait::async_trait;

use crate::forms::Submission;
use crate::models::{Listing, User};

/// Storage key holding the serialized wishlist
pub const WISHLIST_KEY: &str = "wishlist";
/// Storage key holding the serialized signed-in user
pub const USER_KEY: &str = "user";
/// Storage key holding the API bearer token
pub const TOKEN_KEY: &str = "token";

/// Durable string key-value storage
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`
    ///
    /// # Returns
    /// * `Result<Option<String>>` - The stored value, `None` if the key is absent
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Delete `key`; deleting an absent key is not an error
    async fn remove(&self, key: &str) -> Result<()>;
}

/// Supplier of the full listing catalog
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Display name used in logs
    fn name(&self) -> &str;

    /// Fetch every listing the source knows about
    ///
    /// # Returns
    /// * `Result<Vec<Listing>>` - Raw listings, not yet validated
    async fn fetch_listings(&self) -> Result<Vec<Listing>>;
}

/// History API used to publish the shareable query string
///
/// Implementations replace the current entry; they never trigger a reload.
pub trait Navigator: Send + Sync {
    /// Replace the current query string with `query` (no leading `?`)
    fn replace(&self, query: &str);
}

/// Login and registration backend
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn login(&self, email: &str, password: &str) -> Result<User>;

    async fn register(&self, name: &str, email: &str, password: &str) -> Result<User>;
}

/// Backend that accepts form submissions (listings, donations, profile edits)
#[async_trait]
pub trait FormService: Send + Sync {
    /// Deliver an already validated submission
    async fn submit(&self, submission: &Submission) -> Result<()>;
}

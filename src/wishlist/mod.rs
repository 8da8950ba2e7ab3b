//! Persistent wishlist keyed by listing id

use std::collections::HashSet;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::models::WishlistItem;
use crate::traits::{KeyValueStore, WISHLIST_KEY};

/// Saved listings, at most one per id, in the order they were added.
///
/// Every mutation writes the complete resulting set to storage before it
/// returns. The in-memory set only changes once that write has succeeded.
pub struct WishlistStore {
    items: Vec<WishlistItem>,
    storage: Arc<dyn KeyValueStore>,
}

impl WishlistStore {
    /// Rehydrate from storage. Missing or unreadable state starts an empty wishlist.
    pub async fn load(storage: Arc<dyn KeyValueStore>) -> Self {
        let items = match storage.get(WISHLIST_KEY).await {
            Ok(Some(json)) => match serde_json::from_str::<Vec<WishlistItem>>(&json) {
                Ok(items) => dedupe(items),
                Err(e) => {
                    warn!("Stored wishlist is corrupt, starting empty: {}", e);
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!("Could not read stored wishlist, starting empty: {:#}", e);
                Vec::new()
            }
        };

        info!("Wishlist loaded with {} items", items.len());
        Self { items, storage }
    }

    pub fn items(&self) -> &[WishlistItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.items.iter().any(|item| item.id == id)
    }

    pub fn total_price(&self) -> f64 {
        self.items.iter().map(|item| item.price).sum()
    }

    /// Returns `false` without writing when the id is already saved
    pub async fn add(&mut self, item: WishlistItem) -> Result<bool> {
        if self.contains(&item.id) {
            return Ok(false);
        }

        let mut next = self.items.clone();
        info!("Adding {} to wishlist", item.title);
        next.push(item);
        self.commit(next).await?;
        Ok(true)
    }

    /// Returns `false` when nothing was saved under `id`
    pub async fn remove(&mut self, id: &str) -> Result<bool> {
        if !self.contains(id) {
            return Ok(false);
        }

        let next = self
            .items
            .iter()
            .filter(|item| item.id != id)
            .cloned()
            .collect();
        info!("Removing {} from wishlist", id);
        self.commit(next).await?;
        Ok(true)
    }

    pub async fn clear(&mut self) -> Result<()> {
        info!("Clearing wishlist");
        self.commit(Vec::new()).await
    }

    async fn commit(&mut self, next: Vec<WishlistItem>) -> Result<()> {
        let json = serde_json::to_string(&next)?;
        self.storage
            .set(WISHLIST_KEY, &json)
            .await
            .context("failed to persist wishlist")?;

        self.items = next;
        Ok(())
    }
}

fn dedupe(items: Vec<WishlistItem>) -> Vec<WishlistItem> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.id.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;
    use crate::models::Condition;
    use anyhow::bail;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;

    fn item(id: &str, price: f64) -> WishlistItem {
        WishlistItem {
            id: id.to_string(),
            title: format!("Book {id}"),
            author: "Someone".to_string(),
            price,
            image: None,
            condition: Condition::Good,
        }
    }

    /// Reads back whatever was written but refuses new writes
    struct ReadOnlyStore(MemoryStore);

    #[async_trait]
    impl KeyValueStore for ReadOnlyStore {
        async fn get(&self, key: &str) -> Result<Option<String>> {
            self.0.get(key).await
        }

        async fn set(&self, _key: &str, _value: &str) -> Result<()> {
            bail!("disk full")
        }

        async fn remove(&self, _key: &str) -> Result<()> {
            bail!("disk full")
        }
    }

    #[tokio::test]
    async fn add_is_idempotent() {
        let storage = Arc::new(MemoryStore::new());
        let mut wishlist = WishlistStore::load(storage.clone()).await;

        assert!(wishlist.add(item("1", 4.0)).await.unwrap());
        assert!(!wishlist.add(item("1", 4.0)).await.unwrap());

        assert_eq!(wishlist.len(), 1);
        let stored = storage.get(WISHLIST_KEY).await.unwrap().unwrap();
        assert_eq!(serde_json::from_str::<Vec<WishlistItem>>(&stored).unwrap(), vec![item("1", 4.0)]);
    }

    #[tokio::test]
    async fn remove_of_non_member_is_a_no_op() {
        let mut wishlist = WishlistStore::load(Arc::new(MemoryStore::new())).await;
        wishlist.add(item("1", 4.0)).await.unwrap();
        wishlist.add(item("2", 6.0)).await.unwrap();

        assert!(!wishlist.remove("3").await.unwrap());
        assert_eq!(wishlist.items(), &[item("1", 4.0), item("2", 6.0)]);

        assert!(wishlist.remove("1").await.unwrap());
        assert_eq!(wishlist.items(), &[item("2", 6.0)]);
    }

    #[tokio::test]
    async fn rehydrates_in_insertion_order() {
        let storage: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        {
            let mut wishlist = WishlistStore::load(storage.clone()).await;
            wishlist.add(item("b", 1.0)).await.unwrap();
            wishlist.add(item("a", 2.5)).await.unwrap();
        }

        let wishlist = WishlistStore::load(storage).await;
        let ids: Vec<&str> = wishlist.items().iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
        assert_eq!(wishlist.total_price(), 3.5);
    }

    #[tokio::test]
    async fn clear_persists_empty_set() {
        let storage = Arc::new(MemoryStore::new());
        let mut wishlist = WishlistStore::load(storage.clone()).await;
        wishlist.add(item("1", 1.0)).await.unwrap();

        wishlist.clear().await.unwrap();

        assert!(wishlist.is_empty());
        assert_eq!(storage.get(WISHLIST_KEY).await.unwrap().as_deref(), Some("[]"));
    }

    #[tokio::test]
    async fn corrupt_state_loads_empty() {
        let storage = Arc::new(MemoryStore::new());
        storage.set(WISHLIST_KEY, "{not json").await.unwrap();

        let wishlist = WishlistStore::load(storage).await;
        assert!(wishlist.is_empty());
    }

    #[tokio::test]
    async fn duplicate_ids_in_storage_collapse() {
        let storage = Arc::new(MemoryStore::new());
        let json = serde_json::to_string(&vec![item("1", 1.0), item("1", 9.0), item("2", 2.0)]).unwrap();
        storage.set(WISHLIST_KEY, &json).await.unwrap();

        let wishlist = WishlistStore::load(storage).await;
        assert_eq!(wishlist.items(), &[item("1", 1.0), item("2", 2.0)]);
    }

    #[tokio::test]
    async fn failed_write_keeps_previous_state() {
        let inner = MemoryStore::new();
        let json = serde_json::to_string(&vec![item("1", 1.0)]).unwrap();
        inner.set(WISHLIST_KEY, &json).await.unwrap();

        let mut wishlist = WishlistStore::load(Arc::new(ReadOnlyStore(inner))).await;

        assert!(wishlist.add(item("2", 2.0)).await.is_err());
        assert!(wishlist.clear().await.is_err());
        assert_eq!(wishlist.items(), &[item("1", 1.0)]);
    }
}

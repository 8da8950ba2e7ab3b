//! Session stub: remembers one signed-in user between runs.
//!
//! Nothing here authenticates anyone. Credentials go to an
//! [`IdentityProvider`] and whatever user it returns is stored as-is.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use chrono::Utc;
use tracing::{info, warn};

use crate::models::User;
use crate::traits::{IdentityProvider, KeyValueStore, TOKEN_KEY, USER_KEY};

pub const DEFAULT_AVATAR: &str = "/placeholder.svg?height=40&width=40";

/// Identity backend that accepts any non-empty credentials after a fixed delay
#[derive(Debug, Clone)]
pub struct MockIdentityProvider {
    delay: Duration,
}

impl MockIdentityProvider {
    pub const fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

fn require(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        bail!("{field} is required");
    }
    Ok(())
}

#[async_trait]
impl IdentityProvider for MockIdentityProvider {
    async fn login(&self, email: &str, password: &str) -> Result<User> {
        require("email", email)?;
        require("password", password)?;
        tokio::time::sleep(self.delay).await;

        Ok(User {
            id: "user-1".to_string(),
            name: "John Doe".to_string(),
            email: email.to_string(),
            avatar: Some(DEFAULT_AVATAR.to_string()),
        })
    }

    async fn register(&self, name: &str, email: &str, password: &str) -> Result<User> {
        require("name", name)?;
        require("email", email)?;
        require("password", password)?;
        tokio::time::sleep(self.delay).await;

        Ok(User {
            id: format!("user-{}", Utc::now().timestamp_millis()),
            name: name.to_string(),
            email: email.to_string(),
            avatar: Some(DEFAULT_AVATAR.to_string()),
        })
    }
}

pub struct SessionStore {
    user: Option<User>,
    storage: Arc<dyn KeyValueStore>,
    provider: Arc<dyn IdentityProvider>,
}

impl SessionStore {
    pub async fn load(storage: Arc<dyn KeyValueStore>, provider: Arc<dyn IdentityProvider>) -> Self {
        let user = match storage.get(USER_KEY).await {
            Ok(Some(json)) => serde_json::from_str::<User>(&json)
                .map_err(|e| warn!("Stored user is corrupt, starting signed out: {}", e))
                .ok(),
            Ok(None) => None,
            Err(e) => {
                warn!("Could not read stored user, starting signed out: {:#}", e);
                None
            }
        };

        Self {
            user,
            storage,
            provider,
        }
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    /// Bearer token left in storage by a real backend, if any
    pub async fn token(&self) -> Option<String> {
        self.storage.get(TOKEN_KEY).await.ok().flatten()
    }

    pub async fn login(&mut self, email: &str, password: &str) -> Result<&User> {
        let user = self.provider.login(email, password).await?;
        self.sign_in(user).await
    }

    pub async fn register(&mut self, name: &str, email: &str, password: &str) -> Result<&User> {
        let user = self.provider.register(name, email, password).await?;
        self.sign_in(user).await
    }

    pub async fn logout(&mut self) -> Result<()> {
        self.storage
            .remove(USER_KEY)
            .await
            .context("failed to clear stored user")?;

        if let Some(user) = self.user.take() {
            info!("{} signed out", user.email);
        }
        Ok(())
    }

    async fn sign_in(&mut self, user: User) -> Result<&User> {
        let json = serde_json::to_string(&user)?;
        self.storage
            .set(USER_KEY, &json)
            .await
            .context("failed to persist user")?;

        info!("Signed in as {} ({})", user.name, user.id);
        Ok(self.user.insert(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;

    fn provider() -> Arc<dyn IdentityProvider> {
        Arc::new(MockIdentityProvider::new(Duration::ZERO))
    }

    #[tokio::test]
    async fn login_persists_and_logout_clears() {
        let storage: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let mut session = SessionStore::load(storage.clone(), provider()).await;
        assert!(!session.is_authenticated());

        let user = session.login("jane@example.com", "secret").await.unwrap();
        assert_eq!(user.id, "user-1");
        assert_eq!(user.email, "jane@example.com");

        let restored = SessionStore::load(storage.clone(), provider()).await;
        assert_eq!(restored.user().map(|u| u.email.as_str()), Some("jane@example.com"));

        session.logout().await.unwrap();
        assert!(!session.is_authenticated());
        assert_eq!(storage.get(USER_KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn register_uses_given_name() {
        let mut session = SessionStore::load(Arc::new(MemoryStore::new()), provider()).await;

        let user = session.register("Ana", "ana@example.com", "pw").await.unwrap();

        assert_eq!(user.name, "Ana");
        assert!(user.id.starts_with("user-"));
        assert_eq!(user.avatar.as_deref(), Some(DEFAULT_AVATAR));
    }

    #[tokio::test]
    async fn empty_credentials_are_rejected() {
        let mut session = SessionStore::load(Arc::new(MemoryStore::new()), provider()).await;

        assert!(session.login("", "pw").await.is_err());
        assert!(session.register("Ana", "ana@example.com", " ").await.is_err());
        assert!(!session.is_authenticated());
    }

    #[tokio::test]
    async fn corrupt_user_loads_signed_out() {
        let storage = Arc::new(MemoryStore::new());
        storage.set(USER_KEY, "nope").await.unwrap();
        storage.set(TOKEN_KEY, "abc").await.unwrap();

        let session = SessionStore::load(storage, provider()).await;

        assert!(session.user().is_none());
        assert_eq!(session.token().await.as_deref(), Some("abc"));
    }
}

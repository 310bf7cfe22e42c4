//! User lookups needed by authentication.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use common::AppResult;
use domain::User;
use records_service_lib::infra::DocumentStore;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Trait for user operations needed by the auth service.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Every user whose normalized username equals the normalized input
    async fn find_by_username(&self, username: &str) -> AppResult<Vec<User>>;

    async fn find_by_id(&self, id: u64) -> AppResult<Option<User>>;
}

/// Directory over the shared document store.
pub struct StoreDirectory {
    store: Arc<DocumentStore>,
}

impl StoreDirectory {
    pub fn new(store: Arc<DocumentStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl UserDirectory for StoreDirectory {
    async fn find_by_username(&self, username: &str) -> AppResult<Vec<User>> {
        let doc = self.store.snapshot().await;
        let found: Vec<User> = doc
            .users
            .iter()
            .filter(|u| u.matches_username(username))
            .cloned()
            .collect();
        debug!(candidates = found.len(), "Username lookup");
        Ok(found)
    }

    async fn find_by_id(&self, id: u64) -> AppResult<Option<User>> {
        Ok(self.store.snapshot().await.user(id).cloned())
    }
}

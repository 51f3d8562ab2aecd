//! In-process account store for development runs and tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::AccountStore;
use crate::error::AppResult;
use crate::models::{Account, NewAccount, Profile};

#[derive(Default)]
struct Inner {
    accounts: HashMap<Uuid, Account>,
    /// normalized email -> id
    by_email: HashMap<String, Uuid>,
}

/// `AccountStore` kept in memory; contents are lost on restart.
#[derive(Clone, Default)]
pub struct InMemoryAccountStore {
    inner: Arc<RwLock<Inner>>,
}

impl InMemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.accounts.len()
    }
}

#[async_trait]
impl AccountStore for InMemoryAccountStore {
    async fn insert(&self, account: NewAccount) -> AppResult<Option<Account>> {
        let mut inner = self.inner.write().await;
        if inner.by_email.contains_key(&account.email) {
            return Ok(None);
        }
        let account = account.into_account();
        inner.by_email.insert(account.email.clone(), account.id);
        inner.accounts.insert(account.id, account.clone());
        Ok(Some(account))
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<Account>> {
        let inner = self.inner.read().await;
        Ok(inner
            .by_email
            .get(email)
            .and_then(|id| inner.accounts.get(id))
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Account>> {
        Ok(self.inner.read().await.accounts.get(&id).cloned())
    }

    async fn set_password(
        &self,
        id: Uuid,
        password_hash: &str,
        changed_at: DateTime<Utc>,
    ) -> AppResult<bool> {
        let mut inner = self.inner.write().await;
        let Some(account) = inner.accounts.get_mut(&id) else {
            return Ok(false);
        };
        account.password_hash = password_hash.to_string();
        account.password_changed_at = changed_at;
        account.updated_at = changed_at;
        Ok(true)
    }

    async fn record_login(&self, id: Uuid, at: DateTime<Utc>) -> AppResult<bool> {
        let mut inner = self.inner.write().await;
        let Some(account) = inner.accounts.get_mut(&id) else {
            return Ok(false);
        };
        account.last_login_at = Some(at);
        Ok(true)
    }

    async fn record_logout(&self, id: Uuid, at: DateTime<Utc>) -> AppResult<bool> {
        let mut inner = self.inner.write().await;
        let Some(account) = inner.accounts.get_mut(&id) else {
            return Ok(false);
        };
        account.last_logout_at = Some(at);
        Ok(true)
    }

    async fn update_profile(
        &self,
        id: Uuid,
        profile: Profile,
        at: DateTime<Utc>,
    ) -> AppResult<Option<Account>> {
        let mut inner = self.inner.write().await;
        let Some(account) = inner.accounts.get_mut(&id) else {
            return Ok(None);
        };
        account.profile.merge(profile);
        account.updated_at = at;
        Ok(Some(account.clone()))
    }
}

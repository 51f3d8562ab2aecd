//! Credential store abstraction.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::{Account, NewAccount, Profile};

/// Persistence for accounts. Every method is a single atomic write or read;
/// concurrent writers to the same account resolve last-write-wins.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Insert a new account. `Ok(None)` when the email is already taken.
    async fn insert(&self, account: NewAccount) -> AppResult<Option<Account>>;

    /// Lookup by normalized email.
    async fn find_by_email(&self, email: &str) -> AppResult<Option<Account>>;

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Account>>;

    /// Replace the hash and stamp `password_changed_at`. `false` if no such account.
    async fn set_password(
        &self,
        id: Uuid,
        password_hash: &str,
        changed_at: DateTime<Utc>,
    ) -> AppResult<bool>;

    async fn record_login(&self, id: Uuid, at: DateTime<Utc>) -> AppResult<bool>;

    async fn record_logout(&self, id: Uuid, at: DateTime<Utc>) -> AppResult<bool>;

    /// Merge the present fields of `profile` into the stored one.
    async fn update_profile(
        &self,
        id: Uuid,
        profile: Profile,
        at: DateTime<Utc>,
    ) -> AppResult<Option<Account>>;
}

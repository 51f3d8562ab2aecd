//! Account lifecycle: register, login, change password, logout, self lookup.

use chrono::Utc;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::auth::{Identity, JwtSecret, PasswordHasher, MAX_PASSWORD_BYTES};
use crate::db::AccountStore;
use crate::error::{AppError, AppResult};
use crate::models::{normalize_email, Account, NewAccount, Profile};

pub const MIN_PASSWORD_LEN: usize = 6;

/// Same message for unknown email and wrong password.
pub const INVALID_CREDENTIALS: &str = "Invalid email or password";

/// Validated registration input.
#[derive(Debug, Clone)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub profile: Profile,
}

/// A freshly issued token and the account it was issued for.
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub account: Account,
}

/// Orchestrates the credential store, password hasher and token signer.
#[derive(Clone)]
pub struct AccountService {
    store: Arc<dyn AccountStore>,
    hasher: PasswordHasher,
    jwt: JwtSecret,
    /// Verified against on unknown-email logins so both failures cost a hash.
    dummy_hash: Arc<OnceCell<String>>,
}

impl AccountService {
    pub fn new(store: Arc<dyn AccountStore>, hasher: PasswordHasher, jwt: JwtSecret) -> Self {
        Self {
            store,
            hasher,
            jwt,
            dummy_hash: Arc::new(OnceCell::new()),
        }
    }

    pub fn jwt(&self) -> &JwtSecret {
        &self.jwt
    }

    pub async fn register(&self, registration: Registration) -> AppResult<Session> {
        let email = normalize_email(&registration.email);
        check_password_len(&registration.password)?;

        if self.store.find_by_email(&email).await?.is_some() {
            debug!("registration rejected: email taken");
            return Err(AppError::Conflict("Email already registered".to_string()));
        }

        let password_hash = self.hasher.hash_blocking(registration.password).await?;
        let new_account = NewAccount {
            id: Uuid::new_v4(),
            email,
            password_hash,
            profile: registration.profile.normalized(),
            created_at: Utc::now(),
        };
        // A concurrent registration may win between the lookup and the insert.
        let account = self
            .store
            .insert(new_account)
            .await?
            .ok_or_else(|| AppError::Conflict("Email already registered".to_string()))?;

        let token = self.jwt.issue(account.id, &account.email)?;
        info!(account_id = %account.id, "account registered");
        Ok(Session { token, account })
    }

    pub async fn login(&self, email: &str, password: &str) -> AppResult<Session> {
        let email = normalize_email(email);
        let Some(mut account) = self.store.find_by_email(&email).await? else {
            let dummy = self
                .dummy_hash
                .get_or_try_init(|| self.hasher.hash_blocking("not-a-real-password".to_string()))
                .await?;
            self.hasher
                .verify_blocking(password.to_string(), dummy.clone())
                .await?;
            warn!("login failed");
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        };

        let verified = self
            .hasher
            .verify_blocking(password.to_string(), account.password_hash.clone())
            .await?;
        if !verified {
            warn!(account_id = %account.id, "login failed");
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        }

        let now = Utc::now();
        self.store.record_login(account.id, now).await?;
        account.last_login_at = Some(now);

        let token = self.jwt.issue(account.id, &account.email)?;
        info!(account_id = %account.id, "login");
        Ok(Session { token, account })
    }

    pub async fn change_password(
        &self,
        account_id: Uuid,
        new_password: String,
        confirm_password: &str,
    ) -> AppResult<()> {
        if new_password != confirm_password {
            return Err(AppError::Validation("Passwords do not match".to_string()));
        }
        check_password_len(&new_password)?;

        let password_hash = self.hasher.hash_blocking(new_password).await?;
        if !self
            .store
            .set_password(account_id, &password_hash, Utc::now())
            .await?
        {
            return Err(account_not_found());
        }
        info!(account_id = %account_id, "password changed");
        Ok(())
    }

    /// Stamps `last_logout_at`. Outstanding tokens stay valid until expiry.
    pub async fn logout(&self, account_id: Uuid) -> AppResult<()> {
        if !self.store.record_logout(account_id, Utc::now()).await? {
            return Err(account_not_found());
        }
        info!(account_id = %account_id, "logout");
        Ok(())
    }

    pub async fn me(&self, account_id: Uuid) -> AppResult<Account> {
        self.store
            .find_by_id(account_id)
            .await?
            .ok_or_else(account_not_found)
    }

    /// Merge profile fields; credentials are never touched here.
    pub async fn update_profile(&self, account_id: Uuid, profile: Profile) -> AppResult<Account> {
        self.store
            .update_profile(account_id, profile.normalized(), Utc::now())
            .await?
            .ok_or_else(account_not_found)
    }

    /// Verify a bearer token and reject it when it predates the account's
    /// last password change.
    pub async fn authenticate(&self, token: &str) -> AppResult<Identity> {
        let identity = self.jwt.verify(token)?;
        if let Some(account) = self.store.find_by_id(identity.account_id).await? {
            if !identity.issued_since(account.password_changed_at) {
                debug!(account_id = %account.id, "token predates password change");
                return Err(AppError::Unauthorized(
                    "Password was changed, please log in again".to_string(),
                ));
            }
        }
        Ok(identity)
    }
}

/// Minimum counts characters; maximum counts UTF-8 bytes.
fn check_password_len(password: &str) -> AppResult<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::Validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    if password.len() > MAX_PASSWORD_BYTES {
        return Err(AppError::Validation(format!(
            "Password must be at most {} bytes",
            MAX_PASSWORD_BYTES
        )));
    }
    Ok(())
}

fn account_not_found() -> AppError {
    AppError::NotFound("Account not found".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{HashScheme, TokenError};
    use crate::db::InMemoryAccountStore;
    use chrono::Duration;

    fn service() -> AccountService {
        AccountService::new(
            Arc::new(InMemoryAccountStore::new()),
            PasswordHasher::new(HashScheme::Bcrypt { cost: 4 }),
            JwtSecret::new("unit-test-secret-that-is-32-bytes!!", Duration::days(7)),
        )
    }

    fn registration(email: &str, password: &str) -> Registration {
        Registration {
            email: email.to_string(),
            password: password.to_string(),
            profile: Profile::default(),
        }
    }

    fn message(err: AppError) -> String {
        match err {
            AppError::Unauthorized(m)
            | AppError::Validation(m)
            | AppError::Conflict(m)
            | AppError::NotFound(m) => m,
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn register_login_change_password_scenario() {
        let svc = service();
        let registered = svc.register(registration("a@b.com", "secret1")).await.unwrap();
        assert_ne!(registered.account.password_hash, "secret1");

        let session = svc.login("a@b.com", "secret1").await.unwrap();
        let identity = svc.jwt().verify(&session.token).unwrap();
        assert_eq!(identity.account_id, registered.account.id);
        assert_eq!(identity.email, "a@b.com");
        assert!(session.account.last_login_at.is_some());

        svc.change_password(registered.account.id, "secret2".into(), "secret2")
            .await
            .unwrap();
        assert!(matches!(
            svc.login("a@b.com", "secret1").await,
            Err(AppError::Unauthorized(_))
        ));
        assert!(svc.login("a@b.com", "secret2").await.is_ok());
    }

    #[tokio::test]
    async fn email_is_case_insensitive() {
        let svc = service();
        svc.register(registration(" A@B.com", "secret1")).await.unwrap();
        assert!(svc.login("a@b.COM", "secret1").await.is_ok());
        let err = svc
            .register(registration("a@b.com", "other-pass"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn duplicate_registration_leaves_account_untouched() {
        let svc = service();
        let first = svc.register(registration("a@b.com", "secret1")).await.unwrap();
        assert!(matches!(
            svc.register(registration("a@b.com", "another1")).await,
            Err(AppError::Conflict(_))
        ));
        let stored = svc.me(first.account.id).await.unwrap();
        assert_eq!(stored.password_hash, first.account.password_hash);
        assert!(svc.login("a@b.com", "secret1").await.is_ok());
    }

    #[tokio::test]
    async fn unknown_email_and_wrong_password_look_the_same() {
        let svc = service();
        svc.register(registration("a@b.com", "secret1")).await.unwrap();
        let wrong_password = message(svc.login("a@b.com", "nope123").await.unwrap_err());
        let unknown_email = message(svc.login("x@b.com", "secret1").await.unwrap_err());
        assert_eq!(wrong_password, unknown_email);
        assert_eq!(wrong_password, INVALID_CREDENTIALS);
    }

    #[tokio::test]
    async fn change_password_validates_input() {
        let svc = service();
        let session = svc.register(registration("a@b.com", "secret1")).await.unwrap();
        let id = session.account.id;

        let err = svc.change_password(id, "secret2".into(), "secret3").await.unwrap_err();
        assert_eq!(message(err), "Passwords do not match");

        let err = svc.change_password(id, "abc".into(), "abc").await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let err = svc
            .change_password(Uuid::new_v4(), "secret2".into(), "secret2")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn short_password_is_rejected_at_registration() {
        let svc = service();
        let err = svc.register(registration("a@b.com", "12345")).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn token_issued_before_password_change_is_rejected() {
        let svc = service();
        let session = svc.register(registration("a@b.com", "secret1")).await.unwrap();
        let id = session.account.id;
        let old_token = svc
            .jwt()
            .issue_at(id, "a@b.com", Utc::now() - Duration::seconds(10))
            .unwrap();

        svc.change_password(id, "secret2".into(), "secret2").await.unwrap();
        assert!(matches!(
            svc.authenticate(&old_token).await,
            Err(AppError::Unauthorized(_))
        ));

        let fresh = svc.login("a@b.com", "secret2").await.unwrap();
        assert_eq!(svc.authenticate(&fresh.token).await.unwrap().account_id, id);
    }

    #[tokio::test]
    async fn token_issued_moments_before_password_change_is_rejected() {
        let svc = service();
        let session = svc.register(registration("a@b.com", "secret1")).await.unwrap();
        let id = session.account.id;
        let old_token = svc
            .jwt()
            .issue_at(id, "a@b.com", Utc::now() - Duration::milliseconds(300))
            .unwrap();

        svc.change_password(id, "secret2".into(), "secret2").await.unwrap();
        assert!(matches!(
            svc.authenticate(&old_token).await,
            Err(AppError::Unauthorized(_))
        ));
    }

    #[tokio::test]
    async fn password_over_72_bytes_is_rejected() {
        let svc = service();
        let prefix = "a".repeat(MAX_PASSWORD_BYTES);
        let err = svc
            .register(registration("long@b.com", &format!("{}X", prefix)))
            .await
            .unwrap_err();
        assert_eq!(message(err), "Password must be at most 72 bytes");

        let session = svc.register(registration("a@b.com", &prefix)).await.unwrap();
        let err = svc
            .login("a@b.com", &format!("{}Y", prefix))
            .await
            .unwrap_err();
        assert_eq!(message(err), INVALID_CREDENTIALS);
        assert!(svc.login("a@b.com", &prefix).await.is_ok());

        // 36 two-byte characters fit; 37 do not.
        let wide = "é".repeat(37);
        let err = svc
            .change_password(session.account.id, wide.clone(), &wide)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        let fits = "é".repeat(36);
        svc.change_password(session.account.id, fits.clone(), &fits)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn unknown_email_still_runs_a_password_check() {
        let svc = service();
        assert!(svc.dummy_hash.get().is_none());
        let err = svc.login("nobody@b.com", "secret1").await.unwrap_err();
        assert_eq!(message(err), INVALID_CREDENTIALS);
        let dummy = svc.dummy_hash.get().cloned().unwrap();
        assert!(dummy.starts_with("$2b$04$"));

        // The dummy hash is computed once and reused.
        svc.login("other@b.com", "secret1").await.unwrap_err();
        assert_eq!(svc.dummy_hash.get(), Some(&dummy));
    }

    #[tokio::test]
    async fn logout_does_not_revoke_token() {
        let svc = service();
        let session = svc.register(registration("a@b.com", "secret1")).await.unwrap();
        svc.logout(session.account.id).await.unwrap();
        assert!(svc.me(session.account.id).await.unwrap().last_logout_at.is_some());
        assert!(svc.authenticate(&session.token).await.is_ok());
    }

    #[tokio::test]
    async fn expired_token_fails_authentication() {
        let svc = service();
        let session = svc.register(registration("a@b.com", "secret1")).await.unwrap();
        let token = svc
            .jwt()
            .issue_at(session.account.id, "a@b.com", Utc::now() - Duration::days(8))
            .unwrap();
        assert!(matches!(
            svc.authenticate(&token).await,
            Err(AppError::Token(TokenError::Expired))
        ));
    }

    #[tokio::test]
    async fn profile_update_keeps_credentials() {
        let svc = service();
        let session = svc.register(registration("a@b.com", "secret1")).await.unwrap();
        let updated = svc
            .update_profile(
                session.account.id,
                Profile {
                    full_name: Some(" Ada ".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.profile.full_name.as_deref(), Some("Ada"));
        assert_eq!(updated.password_hash, session.account.password_hash);
        assert_eq!(updated.password_changed_at, session.account.password_changed_at);
    }
}

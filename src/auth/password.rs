//! Password hashing and verification (bcrypt by default, argon2id optional).

use crate::error::{AppError, AppResult};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, SaltString},
    Argon2, PasswordHasher as _, PasswordVerifier as _,
};

/// Work factor of the hashes already on disk.
pub const DEFAULT_BCRYPT_COST: u32 = 10;

/// bcrypt only reads this many bytes of input.
pub const MAX_PASSWORD_BYTES: usize = 72;

/// Scheme used when writing new hashes. Verification accepts either.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashScheme {
    Bcrypt { cost: u32 },
    Argon2,
}

impl Default for HashScheme {
    fn default() -> Self {
        HashScheme::Bcrypt {
            cost: DEFAULT_BCRYPT_COST,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PasswordHasher {
    scheme: HashScheme,
}

impl PasswordHasher {
    pub fn new(scheme: HashScheme) -> Self {
        Self { scheme }
    }

    /// Salted one-way hash; a fresh salt is drawn on every call.
    pub fn hash(&self, password: &str) -> AppResult<String> {
        match self.scheme {
            HashScheme::Bcrypt { .. } if password.len() > MAX_PASSWORD_BYTES => Err(
                AppError::Validation(format!(
                    "Password must be at most {} bytes",
                    MAX_PASSWORD_BYTES
                )),
            ),
            HashScheme::Bcrypt { cost } => bcrypt::hash(password, cost)
                .map_err(|e| AppError::Internal(anyhow::anyhow!("bcrypt hash: {}", e))),
            HashScheme::Argon2 => {
                let salt = SaltString::generate(&mut OsRng);
                let hash = Argon2::default()
                    .hash_password(password.as_bytes(), &salt)
                    .map_err(|e| AppError::Internal(anyhow::anyhow!("argon2 hash: {}", e)))?
                    .to_string();
                Ok(hash)
            }
        }
    }

    /// `Ok(false)` on mismatch; errors when `stored` is not a usable hash.
    /// The cost and salt come from `stored`, not from the configured scheme.
    pub fn verify(&self, password: &str, stored: &str) -> AppResult<bool> {
        if stored.starts_with("$argon2") {
            let parsed = PasswordHash::new(stored)
                .map_err(|e| AppError::Internal(anyhow::anyhow!("parse hash: {}", e)))?;
            return match Argon2::default().verify_password(password.as_bytes(), &parsed) {
                Ok(()) => Ok(true),
                Err(argon2::password_hash::Error::Password) => Ok(false),
                Err(e) => Err(AppError::Internal(anyhow::anyhow!("argon2 verify: {}", e))),
            };
        }
        // Longer input would be truncated and match its 72-byte prefix.
        if password.len() > MAX_PASSWORD_BYTES {
            stored
                .parse::<bcrypt::HashParts>()
                .map_err(|e| AppError::Internal(anyhow::anyhow!("parse hash: {}", e)))?;
            return Ok(false);
        }
        bcrypt::verify(password, stored)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("parse hash: {}", e)))
    }

    /// [`hash`](Self::hash) on the blocking pool.
    pub async fn hash_blocking(self, password: String) -> AppResult<String> {
        tokio::task::spawn_blocking(move || self.hash(&password))
            .await
            .map_err(|e| AppError::Internal(e.into()))?
    }

    /// [`verify`](Self::verify) on the blocking pool.
    pub async fn verify_blocking(self, password: String, stored: String) -> AppResult<bool> {
        tokio::task::spawn_blocking(move || self.verify(&password, &stored))
            .await
            .map_err(|e| AppError::Internal(e.into()))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_bcrypt() -> PasswordHasher {
        PasswordHasher::new(HashScheme::Bcrypt { cost: 4 })
    }

    #[test]
    fn hash_and_verify_password() {
        let hasher = fast_bcrypt();
        let hash = hasher.hash("mypassword").unwrap();
        assert_ne!(hash, "mypassword");
        assert!(hasher.verify("mypassword", &hash).unwrap());
        assert!(!hasher.verify("wrong", &hash).unwrap());
    }

    #[test]
    fn same_password_hashes_differently() {
        let hasher = fast_bcrypt();
        let a = hasher.hash("secret1").unwrap();
        let b = hasher.hash("secret1").unwrap();
        assert_ne!(a, b);
        assert!(hasher.verify("secret1", &a).unwrap());
        assert!(hasher.verify("secret1", &b).unwrap());
    }

    #[test]
    fn default_scheme_writes_cost_ten_bcrypt() {
        let hash = PasswordHasher::default().hash("secret1").unwrap();
        assert!(hash.starts_with("$2b$10$"), "unexpected hash prefix: {}", hash);
    }

    #[test]
    fn verify_reads_cost_from_stored_hash() {
        let old = PasswordHasher::new(HashScheme::Bcrypt { cost: 5 })
            .hash("secret1")
            .unwrap();
        assert!(fast_bcrypt().verify("secret1", &old).unwrap());
    }

    #[test]
    fn argon2_and_bcrypt_hashes_both_verify() {
        let argon = PasswordHasher::new(HashScheme::Argon2);
        let argon_hash = argon.hash("secret1").unwrap();
        assert!(argon_hash.starts_with("$argon2"));

        let bcrypt_hash = fast_bcrypt().hash("secret1").unwrap();
        assert!(argon.verify("secret1", &bcrypt_hash).unwrap());
        assert!(fast_bcrypt().verify("secret1", &argon_hash).unwrap());
        assert!(!fast_bcrypt().verify("secret2", &argon_hash).unwrap());
    }

    #[test]
    fn malformed_stored_hash_is_an_error() {
        let hasher = fast_bcrypt();
        assert!(hasher.verify("secret1", "plaintext").is_err());
        assert!(hasher.verify("secret1", "$argon2id$garbage").is_err());
    }

    #[test]
    fn argon2_hash_with_unusable_params_is_an_error() {
        let stored = "$argon2id$v=19$m=1,t=1,p=1$c29tZXNhbHQ$aGFzaGhhc2hoYXNoaGFzaA";
        assert!(PasswordHash::new(stored).is_ok());
        assert!(fast_bcrypt().verify("secret1", stored).is_err());
    }

    #[test]
    fn bcrypt_does_not_match_past_72_bytes() {
        let hasher = fast_bcrypt();
        let prefix = "a".repeat(MAX_PASSWORD_BYTES);
        let hash = hasher.hash(&prefix).unwrap();
        assert!(hasher.verify(&prefix, &hash).unwrap());
        assert!(!hasher.verify(&format!("{}X", prefix), &hash).unwrap());
        assert!(!hasher.verify(&format!("{}Y", prefix), &hash).unwrap());
    }

    #[test]
    fn bcrypt_refuses_to_hash_past_72_bytes() {
        let long = "é".repeat(37);
        assert_eq!(long.chars().count(), 37);
        assert!(matches!(
            fast_bcrypt().hash(&long),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn blocking_helpers_match_sync_results() {
        let hasher = fast_bcrypt();
        let stored = tokio_test::block_on(hasher.hash_blocking("secret1".to_string())).unwrap();
        assert!(tokio_test::block_on(hasher.verify_blocking("secret1".to_string(), stored)).unwrap());
    }
}

//! JWT issue and verification.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // account id
    pub email: String,
    pub iat: i64,
    /// `iat` in milliseconds, for comparison against password changes.
    pub iat_ms: i64,
    pub exp: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("token expired")]
    Expired,
    #[error("invalid token")]
    Invalid,
    #[error("token error: {0}")]
    Other(String),
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::ExpiredSignature => TokenError::Expired,
            ErrorKind::InvalidToken
            | ErrorKind::InvalidSignature
            | ErrorKind::InvalidAlgorithm
            | ErrorKind::ImmatureSignature
            | ErrorKind::MissingRequiredClaim(_)
            | ErrorKind::Base64(_)
            | ErrorKind::Json(_)
            | ErrorKind::Utf8(_) => TokenError::Invalid,
            _ => TokenError::Other(err.to_string()),
        }
    }
}

/// Decoded identity carried by a valid token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub account_id: Uuid,
    pub email: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Identity {
    /// True when the token was issued no earlier than `changed_at`, to the millisecond.
    pub fn issued_since(&self, changed_at: DateTime<Utc>) -> bool {
        self.issued_at.timestamp_millis() >= changed_at.timestamp_millis()
    }
}

/// HS256 signer/verifier for account bearer tokens.
#[derive(Clone)]
pub struct JwtSecret {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl JwtSecret {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    pub fn issue(&self, account_id: Uuid, email: &str) -> Result<String, TokenError> {
        self.issue_at(account_id, email, Utc::now())
    }

    /// Issue a token as if signed at `now`.
    pub fn issue_at(
        &self,
        account_id: Uuid,
        email: &str,
        now: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let claims = Claims {
            sub: account_id.to_string(),
            email: email.to_string(),
            iat: now.timestamp(),
            iat_ms: now.timestamp_millis(),
            exp: (now + self.ttl).timestamp(),
        };
        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?)
    }

    pub fn verify(&self, token: &str) -> Result<Identity, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "iat", "sub"]);

        let claims = decode::<Claims>(token, &self.decoding, &validation)?.claims;
        let account_id = Uuid::parse_str(&claims.sub).map_err(|_| TokenError::Invalid)?;
        if claims.iat_ms.div_euclid(1000) != claims.iat {
            return Err(TokenError::Invalid);
        }
        let issued_at =
            DateTime::from_timestamp_millis(claims.iat_ms).ok_or(TokenError::Invalid)?;
        let expires_at = DateTime::from_timestamp(claims.exp, 0).ok_or(TokenError::Invalid)?;

        Ok(Identity {
            account_id,
            email: claims.email,
            issued_at,
            expires_at,
        })
    }
}

//! Credential primitives
//!
//! - [`SecretHasher`]: bcrypt hashing and verification, run on the blocking
//!   thread pool so the async executor never stalls on the key schedule
//! - [`TokenIssuer`]: HS256 JWTs carrying the account e-mail and id

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::CredentialConfig;
use crate::services::ControllerError;

/// bcrypt secret hashing
#[derive(Debug, Clone, Copy)]
pub struct SecretHasher {
    cost: u32,
}

impl Default for SecretHasher {
    fn default() -> Self {
        Self::new(bcrypt::DEFAULT_COST)
    }
}

impl SecretHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    /// Hash a plaintext secret with a fresh salt
    pub async fn hash(&self, secret: &str) -> Result<String, ControllerError> {
        let secret = secret.to_owned();
        let cost = self.cost;

        tokio::task::spawn_blocking(move || bcrypt::hash(secret, cost))
            .await
            .map_err(|e| ControllerError::hashing(e.to_string()))?
            .map_err(|e| ControllerError::hashing(e.to_string()))
    }

    /// Check a plaintext secret against a stored hash
    ///
    /// A malformed stored hash counts as a mismatch.
    pub async fn verify(&self, secret: &str, hash: &str) -> Result<bool, ControllerError> {
        let secret = secret.to_owned();
        let hash = hash.to_owned();

        let outcome = tokio::task::spawn_blocking(move || bcrypt::verify(secret, &hash))
            .await
            .map_err(|e| ControllerError::hashing(e.to_string()))?;

        match outcome {
            Ok(matches) => Ok(matches),
            Err(e) => {
                tracing::warn!(error = %e, "stored secret hash is not valid bcrypt");
                Ok(false)
            }
        }
    }
}

/// Claims encoded in an access token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    pub email: String,
    pub id: i64,
    /// Issued at (seconds since epoch)
    pub iat: u64,
    /// Expiry (seconds since epoch)
    pub exp: u64,
}

/// HS256 token issuing and verification
#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_secs: u64,
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("ttl_secs", &self.ttl_secs)
            .finish_non_exhaustive()
    }
}

impl TokenIssuer {
    pub fn new(secret: &str, ttl_secs: u64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl_secs,
        }
    }

    pub fn from_config(config: &CredentialConfig) -> Self {
        Self::new(&config.token_secret, config.token_ttl_secs)
    }

    /// Sign a token for an account
    pub fn issue(&self, email: &str, id: i64) -> Result<String, ControllerError> {
        let now = Utc::now().timestamp().max(0) as u64;
        let claims = TokenClaims {
            email: email.to_string(),
            id,
            iat: now,
            exp: now + self.ttl_secs,
        };

        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?)
    }

    /// Validate signature and expiry, returning the claims
    pub fn verify(&self, token: &str) -> Result<TokenClaims, ControllerError> {
        let validation = Validation::new(Algorithm::HS256);
        let data = decode::<TokenClaims>(token, &self.decoding, &validation)?;
        Ok(data.claims)
    }
}

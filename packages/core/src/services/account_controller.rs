//! Account controller with credential handling
//!
//! Accounts are created with a hashed secret and authenticate with e-mail
//! plus secret. Unknown e-mails and wrong secrets produce the same
//! [`LoginOutcome::Unauthorized`], so callers cannot probe which accounts
//! exist.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tracing::instrument;

use crate::config::CredentialConfig;
use crate::db::DataContext;
use crate::models::{
    record_from, Record, RecordExt, ACCOUNT, EMAIL_FIELD, EXCLUDED_FIELD, SECRET_FIELD,
};
use crate::services::credentials::{SecretHasher, TokenIssuer};
use crate::services::{ControllerError, ResourceController, ResourceHandler};

/// Message returned for every rejected login
pub const INVALID_CREDENTIALS: &str = "Invalid e-mail or password";

/// Result of a login attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum LoginOutcome {
    Authorized { token: String },
    Unauthorized { message: String },
}

impl LoginOutcome {
    fn unauthorized() -> Self {
        Self::Unauthorized {
            message: INVALID_CREDENTIALS.to_string(),
        }
    }

    pub fn is_authorized(&self) -> bool {
        matches!(self, Self::Authorized { .. })
    }
}

/// Accounts and their credentials
#[derive(Debug)]
pub struct AccountController {
    resource: ResourceController,
    hasher: SecretHasher,
    tokens: TokenIssuer,
}

impl AccountController {
    pub fn new(context: &DataContext, hasher: SecretHasher, tokens: TokenIssuer) -> Self {
        Self {
            resource: ResourceController::new(context, &ACCOUNT),
            hasher,
            tokens,
        }
    }

    pub fn from_config(context: &DataContext, config: &CredentialConfig) -> Self {
        Self::new(
            context,
            SecretHasher::new(config.hash_cost),
            TokenIssuer::from_config(config),
        )
    }

    /// Issuer used to sign login tokens, shared with request authentication
    pub fn tokens(&self) -> &TokenIssuer {
        &self.tokens
    }

    /// Create an account, hashing its secret
    pub async fn register(&self, item: Record) -> Result<Record, ControllerError> {
        ResourceHandler::create(self, item).await
    }

    /// Replace the plaintext secret in `item` with its hash
    async fn hash_secret(&self, item: &mut Record) -> Result<(), ControllerError> {
        let secret = match item.get(SECRET_FIELD).and_then(Value::as_str) {
            Some(secret) if !secret.is_empty() => secret.to_owned(),
            _ => return Err(ControllerError::missing_parameter("secret")),
        };

        let hashed = self.hasher.hash(&secret).await?;
        item.insert(SECRET_FIELD.to_string(), Value::String(hashed));
        Ok(())
    }

    /// Authenticate with e-mail and secret
    ///
    /// Excluded accounts cannot log in.
    #[instrument(skip(self, secret))]
    pub async fn login(&self, email: &str, secret: &str) -> Result<LoginOutcome, ControllerError> {
        let query = record_from([
            (EMAIL_FIELD, Value::from(email)),
            (EXCLUDED_FIELD, Value::Bool(false)),
        ]);
        let accounts = self.resource.read(Some(query)).await?;

        let account = match accounts.first() {
            Some(account) => account,
            None => {
                tracing::warn!("login rejected: unknown e-mail");
                return Ok(LoginOutcome::unauthorized());
            }
        };

        let stored = account.get_str(SECRET_FIELD).unwrap_or_default();
        if !self.hasher.verify(secret, stored).await? {
            tracing::warn!("login rejected: secret mismatch");
            return Ok(LoginOutcome::unauthorized());
        }

        let id = account
            .id()
            .ok_or_else(|| ControllerError::missing_parameter("id"))?;
        let token = self.tokens.issue(email, id)?;

        tracing::info!(account_id = id, "login accepted");
        Ok(LoginOutcome::Authorized { token })
    }
}

#[async_trait]
impl ResourceHandler for AccountController {
    fn resource(&self) -> &ResourceController {
        &self.resource
    }

    async fn create(&self, mut item: Record) -> Result<Record, ControllerError> {
        self.hash_secret(&mut item).await?;
        self.resource.create(item).await
    }

    /// A new secret in the update is hashed like at creation
    async fn update(&self, id: i64, mut item: Record) -> Result<u64, ControllerError> {
        if item.contains_key(SECRET_FIELD) {
            self.hash_secret(&mut item).await?;
        }
        self.resource.update(id, item).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use serde_json::json;
    use std::sync::Arc;

    fn controller() -> AccountController {
        let context = DataContext::new(Arc::new(MemoryStore::new()));
        AccountController::new(&context, SecretHasher::new(4), TokenIssuer::new("k", 60))
    }

    fn account(email: &str, secret: &str) -> Record {
        record_from([
            ("name", json!("Ana")),
            ("email", json!(email)),
            ("secret", json!(secret)),
        ])
    }

    #[tokio::test]
    async fn test_register_stores_hash() {
        let accounts = controller();
        let created = accounts.register(account("ana@example.com", "pw")).await.unwrap();

        let stored = created.get_str("secret").unwrap();
        assert_ne!(stored, "pw");
        assert!(stored.starts_with("$2"));
    }

    #[tokio::test]
    async fn test_register_requires_secret() {
        let accounts = controller();
        let mut item = account("ana@example.com", "");
        let result = accounts.register(item.clone()).await;
        assert!(matches!(
            result,
            Err(ControllerError::MissingParameter { name: "secret" })
        ));

        item.remove("secret");
        assert!(accounts.register(item).await.is_err());
    }

    #[tokio::test]
    async fn test_secret_change_is_hashed() {
        let accounts = controller();
        let created = accounts.register(account("ana@example.com", "pw")).await.unwrap();
        let id = created.id().unwrap();

        let affected = accounts
            .update(id, record_from([("secret", json!("new-pw"))]))
            .await
            .unwrap();
        assert_eq!(affected, 1);

        let stored = accounts.read_by_id(id).await.unwrap();
        assert_ne!(stored[0].get_str("secret"), Some("new-pw"));
        assert!(accounts.login("ana@example.com", "new-pw").await.unwrap().is_authorized());
        assert!(!accounts.login("ana@example.com", "pw").await.unwrap().is_authorized());

        let result = accounts.update(id, record_from([("secret", json!(""))])).await;
        assert!(matches!(
            result,
            Err(ControllerError::MissingParameter { name: "secret" })
        ));
    }

    #[tokio::test]
    async fn test_excluded_account_cannot_login() {
        let accounts = controller();
        let created = accounts.register(account("ana@example.com", "pw")).await.unwrap();
        accounts.soft_delete(created.id().unwrap()).await.unwrap();

        let outcome = accounts.login("ana@example.com", "pw").await.unwrap();
        assert_eq!(
            outcome,
            LoginOutcome::Unauthorized {
                message: INVALID_CREDENTIALS.to_string()
            }
        );
    }
}

//! Environment-driven configuration
//!
//! # Environment Variables
//!
//! - `TASKBOARD_DATABASE`: backend name (default: `libsql`)
//! - `TASKBOARD_DATABASE_PATH`: local libsql file (default: `./data/taskboard.db`)
//! - `TASKBOARD_DATABASE_URL`: remote libsql URL, overrides the path when set
//! - `TASKBOARD_DATABASE_TOKEN`: auth token for the remote URL (default: empty)
//! - `TASKBOARD_SECRET`: JWT signing secret (required)
//! - `TASKBOARD_TOKEN_TTL_SECS`: token lifetime in seconds (default: 86400)
//! - `TASKBOARD_HASH_COST`: bcrypt cost, 4..=31 (default: `bcrypt::DEFAULT_COST`)
//! - `TASKBOARD_PORT`: HTTP port (default: 3001)
//!
//! Every loader has a `from_lookup` variant taking a closure, so tests never
//! touch the process environment.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

pub const DATABASE_VAR: &str = "TASKBOARD_DATABASE";
pub const DATABASE_PATH_VAR: &str = "TASKBOARD_DATABASE_PATH";
pub const DATABASE_URL_VAR: &str = "TASKBOARD_DATABASE_URL";
pub const DATABASE_TOKEN_VAR: &str = "TASKBOARD_DATABASE_TOKEN";
pub const SECRET_VAR: &str = "TASKBOARD_SECRET";
pub const TOKEN_TTL_VAR: &str = "TASKBOARD_TOKEN_TTL_SECS";
pub const HASH_COST_VAR: &str = "TASKBOARD_HASH_COST";
pub const PORT_VAR: &str = "TASKBOARD_PORT";

pub const DEFAULT_DATABASE: &str = "libsql";
pub const DEFAULT_DATABASE_PATH: &str = "./data/taskboard.db";
pub const DEFAULT_TOKEN_TTL_SECS: u64 = 86_400;
pub const DEFAULT_PORT: u16 = 3001;

/// Configuration errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Environment variable {var} is required")]
    Missing { var: &'static str },

    #[error("Invalid value '{value}' for {var}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

impl ConfigError {
    fn invalid(var: &'static str, value: &str, reason: impl fmt::Display) -> Self {
        Self::Invalid {
            var,
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Where the libsql backend keeps its data
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseLocation {
    /// Embedded database file (`:memory:` for a private in-memory database)
    Local(PathBuf),

    /// Remote libsql/Turso endpoint
    Remote { url: String, auth_token: String },
}

impl fmt::Display for DatabaseLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // The token never appears in logs
            Self::Local(path) => write!(f, "{}", path.display()),
            Self::Remote { url, .. } => write!(f, "{}", url),
        }
    }
}

/// Storage settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    /// Backend registry name (`libsql`, `sqlite`, `memory`)
    pub backend: String,
    pub location: DatabaseLocation,
}

impl DatabaseConfig {
    /// In-process backend with no file behind it
    pub fn memory() -> Self {
        Self {
            backend: "memory".to_string(),
            location: DatabaseLocation::Local(PathBuf::from(":memory:")),
        }
    }

    /// libsql backend on a local file
    pub fn libsql(path: impl Into<PathBuf>) -> Self {
        Self {
            backend: DEFAULT_DATABASE.to_string(),
            location: DatabaseLocation::Local(path.into()),
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let backend = lookup(DATABASE_VAR).unwrap_or_else(|| DEFAULT_DATABASE.to_string());

        let location = match lookup(DATABASE_URL_VAR).filter(|url| !url.is_empty()) {
            Some(url) => DatabaseLocation::Remote {
                url,
                auth_token: lookup(DATABASE_TOKEN_VAR).unwrap_or_default(),
            },
            None => DatabaseLocation::Local(PathBuf::from(
                lookup(DATABASE_PATH_VAR).unwrap_or_else(|| DEFAULT_DATABASE_PATH.to_string()),
            )),
        };

        Ok(Self { backend, location })
    }
}

/// Password hashing and token settings
#[derive(Clone, PartialEq, Eq)]
pub struct CredentialConfig {
    /// HS256 signing secret
    pub token_secret: String,
    pub token_ttl_secs: u64,
    pub hash_cost: u32,
}

impl fmt::Debug for CredentialConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialConfig")
            .field("token_secret", &"<redacted>")
            .field("token_ttl_secs", &self.token_ttl_secs)
            .field("hash_cost", &self.hash_cost)
            .finish()
    }
}

impl CredentialConfig {
    /// Settings with the given secret and default lifetime and cost
    pub fn new(token_secret: impl Into<String>) -> Self {
        Self {
            token_secret: token_secret.into(),
            token_ttl_secs: DEFAULT_TOKEN_TTL_SECS,
            hash_cost: bcrypt::DEFAULT_COST,
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let token_secret = lookup(SECRET_VAR)
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::Missing { var: SECRET_VAR })?;

        let token_ttl_secs = parse_or(&lookup, TOKEN_TTL_VAR, DEFAULT_TOKEN_TTL_SECS)?;
        if token_ttl_secs == 0 {
            return Err(ConfigError::invalid(TOKEN_TTL_VAR, "0", "must be positive"));
        }

        let hash_cost = parse_or(&lookup, HASH_COST_VAR, bcrypt::DEFAULT_COST)?;
        if !(4..=31).contains(&hash_cost) {
            return Err(ConfigError::invalid(
                HASH_COST_VAR,
                &hash_cost.to_string(),
                "bcrypt cost must be between 4 and 31",
            ));
        }

        Ok(Self {
            token_secret,
            token_ttl_secs,
            hash_cost,
        })
    }
}

/// Complete application settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub credentials: CredentialConfig,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            database: DatabaseConfig::from_lookup(&lookup)?,
            credentials: CredentialConfig::from_lookup(&lookup)?,
            port: parse_or(&lookup, PORT_VAR, DEFAULT_PORT)?,
        })
    }
}

fn parse_or<F, T>(lookup: &F, var: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: fmt::Display,
{
    match lookup(var) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| ConfigError::invalid(var, &raw, e)),
        None => Ok(default),
    }
}

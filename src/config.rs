use std::env;
use std::fmt;

use crate::error::ConfigError;

pub const ACCESS_KEY_VAR: &str = "AWS_ACCESS_KEY_ID";
pub const SECRET_KEY_VAR: &str = "AWS_SECRET_ACCESS_KEY";
pub const SESSION_TOKEN_VAR: &str = "AWS_SESSION_TOKEN";
pub const CLIENT_REGION_VAR: &str = "AWS_REGION";

/// Explicit connection settings for the facade.
///
/// Both keys are required and must be non-empty; everything else is optional.
#[derive(Clone, PartialEq, Eq)]
pub struct AwsConfig {
    access_key_id: String,
    secret_access_key: String,
    session_token: Option<String>,
    region: Option<String>,
}

impl AwsConfig {
    pub fn new(
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let access_key_id = access_key_id.into();
        let secret_access_key = secret_access_key.into();
        if access_key_id.is_empty() {
            return Err(ConfigError::EmptyCredential(ACCESS_KEY_VAR));
        }
        if secret_access_key.is_empty() {
            return Err(ConfigError::EmptyCredential(SECRET_KEY_VAR));
        }
        Ok(Self {
            access_key_id,
            secret_access_key,
            session_token: None,
            region: None,
        })
    }

    pub fn with_session_token(mut self, token: impl Into<String>) -> Self {
        self.session_token = Some(token.into());
        self
    }

    /// region used for the SDK clients (not the bucket/report region)
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Read the settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build the settings from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let access_key = lookup(ACCESS_KEY_VAR).ok_or(ConfigError::MissingCredential(ACCESS_KEY_VAR))?;
        let secret_key = lookup(SECRET_KEY_VAR).ok_or(ConfigError::MissingCredential(SECRET_KEY_VAR))?;

        let mut config = Self::new(access_key, secret_key)?;
        if let Some(token) = lookup(SESSION_TOKEN_VAR).filter(|t| !t.is_empty()) {
            config = config.with_session_token(token);
        }
        if let Some(region) = lookup(CLIENT_REGION_VAR).filter(|r| !r.is_empty()) {
            config = config.with_region(region);
        }
        Ok(config)
    }

    pub fn access_key_id(&self) -> &str {
        &self.access_key_id
    }

    pub fn secret_access_key(&self) -> &str {
        &self.secret_access_key
    }

    pub fn session_token(&self) -> Option<&str> {
        self.session_token.as_deref()
    }

    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }
}

// keep secrets out of log lines
impl fmt::Debug for AwsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AwsConfig")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"** redacted **")
            .field("session_token", &self.session_token.as_ref().map(|_| "** redacted **"))
            .field("region", &self.region)
            .finish()
    }
}

/// Value of an environment variable, or `default` when it is not set.
pub fn env_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_owned())
}

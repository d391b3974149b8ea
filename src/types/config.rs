//! Configuration Types
//!
//! OAuth2 client configuration types.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use url::Url;

use crate::error::ConfigurationError;

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT_MS: u64 = 30000;

/// Grant type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GrantType {
    #[serde(rename = "password")]
    Password,
    #[serde(rename = "client_credentials")]
    ClientCredentials,
    #[serde(rename = "refresh_token")]
    RefreshToken,
}

impl GrantType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Password => "password",
            Self::ClientCredentials => "client_credentials",
            Self::RefreshToken => "refresh_token",
        }
    }
}

impl fmt::Display for GrantType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GrantType {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "password" => Ok(Self::Password),
            "client_credentials" => Ok(Self::ClientCredentials),
            "refresh_token" => Ok(Self::RefreshToken),
            other => Err(ConfigurationError::UnsupportedGrantType {
                grant_type: other.to_string(),
            }),
        }
    }
}

/// Immutable OAuth2 client configuration.
///
/// Built with [`crate::builders::OAuth2ConfigBuilder`]. A refresh is expressed
/// by deriving a new configuration with [`OAuth2Config::for_refresh`].
#[derive(Clone)]
pub struct OAuth2Config {
    pub(crate) grant_type: GrantType,
    pub(crate) client_id: String,
    pub(crate) client_secret: SecretString,
    pub(crate) username: Option<String>,
    pub(crate) password: Option<SecretString>,
    pub(crate) scope: Option<String>,
    pub(crate) token_endpoint: Url,
    pub(crate) timeout: Duration,
}

impl OAuth2Config {
    pub fn grant_type(&self) -> GrantType {
        self.grant_type
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn client_secret(&self) -> &str {
        self.client_secret.expose_secret()
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    pub fn password(&self) -> Option<&str> {
        self.password.as_ref().map(|p| p.expose_secret().as_str())
    }

    /// Requested scope, free-form space or comma separated.
    pub fn scope(&self) -> Option<&str> {
        self.scope.as_deref()
    }

    pub fn token_endpoint(&self) -> &Url {
        &self.token_endpoint
    }

    /// Timeout handed to the transport for each request.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Same endpoint, client and user identity, with the refresh grant.
    pub fn for_refresh(&self) -> Self {
        Self {
            grant_type: GrantType::RefreshToken,
            ..self.clone()
        }
    }
}

impl fmt::Debug for OAuth2Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuth2Config")
            .field("grant_type", &self.grant_type)
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("scope", &self.scope)
            .field("token_endpoint", &self.token_endpoint.as_str())
            .field("timeout", &self.timeout)
            .finish()
    }
}

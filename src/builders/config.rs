//! Configuration Builder
//!
//! Fluent builder for OAuth2 configuration.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use url::Url;

use crate::error::{ConfigurationError, OAuth2Error};
use crate::types::{GrantType, OAuth2Config, DEFAULT_TIMEOUT_MS};

/// OAuth2 configuration builder.
pub struct OAuth2ConfigBuilder {
    grant_type: Option<GrantType>,
    client_id: Option<String>,
    client_secret: Option<SecretString>,
    username: Option<String>,
    password: Option<SecretString>,
    scope: Option<String>,
    token_endpoint: Option<String>,
    timeout: Duration,
}

impl OAuth2ConfigBuilder {
    /// Create new configuration builder.
    pub fn new() -> Self {
        Self {
            grant_type: None,
            client_id: None,
            client_secret: None,
            username: None,
            password: None,
            scope: None,
            token_endpoint: None,
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
        }
    }

    /// Start from an existing configuration.
    pub fn from_config(config: &OAuth2Config) -> Self {
        Self {
            grant_type: Some(config.grant_type),
            client_id: Some(config.client_id.clone()),
            client_secret: Some(config.client_secret.clone()),
            username: config.username.clone(),
            password: config.password.clone(),
            scope: config.scope.clone(),
            token_endpoint: Some(config.token_endpoint.to_string()),
            timeout: config.timeout,
        }
    }

    /// Set grant type.
    pub fn grant_type(mut self, grant_type: GrantType) -> Self {
        self.grant_type = Some(grant_type);
        self
    }

    /// Set client ID.
    pub fn client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    /// Set client secret.
    pub fn client_secret(mut self, client_secret: impl Into<String>) -> Self {
        self.client_secret = Some(SecretString::new(client_secret.into()));
        self
    }

    /// Set resource owner credentials.
    pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(SecretString::new(password.into()));
        self
    }

    /// Set requested scope.
    pub fn scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    /// Set token endpoint.
    pub fn token_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.token_endpoint = Some(endpoint.into());
        self
    }

    /// Set request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build the OAuth2 configuration.
    pub fn build(self) -> Result<OAuth2Config, OAuth2Error> {
        let grant_type = self.grant_type.ok_or_else(|| missing("grant_type"))?;
        let client_id = self.client_id.ok_or_else(|| missing("client_id"))?;
        let client_secret = self.client_secret.ok_or_else(|| missing("client_secret"))?;
        let endpoint = self.token_endpoint.ok_or_else(|| missing("token_endpoint"))?;

        let token_endpoint = Url::parse(&endpoint).map_err(|e| {
            OAuth2Error::Configuration(ConfigurationError::InvalidEndpoint {
                url: endpoint.clone(),
                message: e.to_string(),
            })
        })?;

        if self.timeout.is_zero() {
            return Err(OAuth2Error::Configuration(ConfigurationError::InvalidValue {
                field: "timeout".to_string(),
                message: "must be greater than zero".to_string(),
            }));
        }

        if client_id.is_empty() {
            return Err(missing("client_id"));
        }
        if client_secret.expose_secret().is_empty() {
            return Err(missing("client_secret"));
        }

        // Resource owner credentials are mandatory for the password grant only.
        if grant_type == GrantType::Password {
            if self.username.is_none() {
                return Err(missing("username"));
            }
            if self.password.is_none() {
                return Err(missing("password"));
            }
        }

        Ok(OAuth2Config {
            grant_type,
            client_id,
            client_secret,
            username: self.username,
            password: self.password,
            scope: self.scope,
            token_endpoint,
            timeout: self.timeout,
        })
    }
}

fn missing(field: &str) -> OAuth2Error {
    OAuth2Error::Configuration(ConfigurationError::MissingField {
        field: field.to_string(),
    })
}

impl Default for OAuth2ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Create a new OAuth2 configuration builder.
pub fn oauth2_config() -> OAuth2ConfigBuilder {
    OAuth2ConfigBuilder::new()
}

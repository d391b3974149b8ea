//! OAuth2 Client
//!
//! High-level OAuth2 client that combines configuration, transport and flows.

use std::sync::Arc;

use crate::builders::oauth2_config;
use crate::core::{
    ContentNegotiator, HttpTransport, ReqwestHttpTransport, DEFAULT_MAX_RESPONSE_SIZE,
};
use crate::error::OAuth2Error;
use crate::flows::{fetch_protected_resource, TokenFlow, TokenFlowImpl};
use crate::types::{AccessToken, GrantType, OAuth2Config};

/// OAuth2 client for token acquisition and protected resource access.
///
/// Holds no token state; every call is independent and the client can be
/// shared between tasks.
pub struct OAuth2Client<T: HttpTransport = ReqwestHttpTransport> {
    config: OAuth2Config,
    transport: Arc<T>,
    flow: TokenFlowImpl<T>,
}

impl OAuth2Client<ReqwestHttpTransport> {
    /// Create a client with the default reqwest transport.
    pub fn new(config: OAuth2Config) -> Result<Self, OAuth2Error> {
        let transport =
            ReqwestHttpTransport::with_options(config.timeout(), DEFAULT_MAX_RESPONSE_SIZE)?;
        Ok(Self::with_transport(config, transport))
    }

    /// Client for the resource owner password grant.
    pub fn password(
        token_endpoint: &str,
        client_id: &str,
        client_secret: &str,
        username: &str,
        password: &str,
        scope: Option<&str>,
    ) -> Result<Self, OAuth2Error> {
        let mut builder = oauth2_config()
            .grant_type(GrantType::Password)
            .token_endpoint(token_endpoint)
            .client_id(client_id)
            .client_secret(client_secret)
            .credentials(username, password);
        if let Some(scope) = scope {
            builder = builder.scope(scope);
        }
        Self::new(builder.build()?)
    }

    /// Client for the client credentials grant.
    pub fn client_credentials(
        token_endpoint: &str,
        client_id: &str,
        client_secret: &str,
        scope: Option<&str>,
    ) -> Result<Self, OAuth2Error> {
        let mut builder = oauth2_config()
            .grant_type(GrantType::ClientCredentials)
            .token_endpoint(token_endpoint)
            .client_id(client_id)
            .client_secret(client_secret);
        if let Some(scope) = scope {
            builder = builder.scope(scope);
        }
        Self::new(builder.build()?)
    }
}

impl<T: HttpTransport> OAuth2Client<T> {
    /// Create a client with a custom transport.
    pub fn with_transport(config: OAuth2Config, transport: T) -> Self {
        let transport = Arc::new(transport);
        let flow = TokenFlowImpl::new(transport.clone(), ContentNegotiator::new());
        Self {
            config,
            transport,
            flow,
        }
    }

    /// Get the OAuth2 configuration.
    pub fn config(&self) -> &OAuth2Config {
        &self.config
    }

    /// Get the underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Obtain an access token with the configured grant.
    pub async fn access_token(&self) -> Result<AccessToken, OAuth2Error> {
        self.flow.acquire_token(&self.config).await
    }

    /// Exchange the refresh token carried by `token` for a new access token.
    pub async fn refresh(&self, token: &AccessToken) -> Result<AccessToken, OAuth2Error> {
        self.flow.refresh_token(&self.config, token).await
    }

    /// Fetch a protected resource with `token` as bearer credential.
    pub async fn get_resource(&self, token: &AccessToken, url: &str) -> Result<String, OAuth2Error> {
        fetch_protected_resource(
            self.transport.as_ref(),
            token,
            url,
            Some(self.config.timeout()),
        )
        .await
    }
}

/// Create a client with the default transport.
pub fn oauth2_client(config: OAuth2Config) -> Result<OAuth2Client, OAuth2Error> {
    OAuth2Client::new(config)
}

//! Token Acquisition Flow
//!
//! Password, client credentials and refresh token grants (RFC 6749 Sections
//! 4.3, 4.4 and 6), each run through the credential ladder.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, error, instrument, warn};

use crate::core::request::token_request;
use crate::core::{ContentNegotiator, HttpResponse, HttpTransport};
use crate::error::{classify_status, OAuth2Error};
use crate::flows::CredentialPlacement;
use crate::types::{AccessToken, OAuth2Config};

/// Token acquisition interface.
#[async_trait]
pub trait TokenFlow: Send + Sync {
    /// Obtain a new access token with the configured grant.
    async fn acquire_token(&self, config: &OAuth2Config) -> Result<AccessToken, OAuth2Error>;

    /// Exchange the refresh token carried by `token` for a new access token.
    async fn refresh_token(
        &self,
        config: &OAuth2Config,
        token: &AccessToken,
    ) -> Result<AccessToken, OAuth2Error>;
}

/// Token acquisition over an [`HttpTransport`].
///
/// Each ladder step is a complete request; the next step is only sent after
/// the previous response has been read in full.
pub struct TokenFlowImpl<T: HttpTransport> {
    transport: Arc<T>,
    negotiator: ContentNegotiator,
}

impl<T: HttpTransport> TokenFlowImpl<T> {
    /// Create new token flow.
    pub fn new(transport: Arc<T>, negotiator: ContentNegotiator) -> Self {
        Self {
            transport,
            negotiator,
        }
    }

    async fn run_ladder(
        &self,
        config: &OAuth2Config,
        refresh_token: Option<&str>,
    ) -> Result<AccessToken, OAuth2Error> {
        let mut placement = CredentialPlacement::FIRST;

        loop {
            debug!(placement = %placement, "Requesting access token");

            let request = token_request(config, refresh_token, placement.authorization(config));
            let response = self.transport.send(request).await?;

            if response.is_success() {
                return self.token_from_response(&response);
            }

            match placement.next() {
                Some(next) => {
                    warn!(
                        placement = %placement,
                        status = response.status,
                        next = %next,
                        "Token request rejected, trying next credential placement"
                    );
                    placement = next;
                }
                None => {
                    error!(
                        placement = %placement,
                        status = response.status,
                        "Token request rejected for every credential placement"
                    );
                    return Err(classify_status(response.status, response.body_text()));
                }
            }
        }
    }

    fn token_from_response(&self, response: &HttpResponse) -> Result<AccessToken, OAuth2Error> {
        let parsed = self.negotiator.negotiate_response(response)?;
        let token = AccessToken::from_parsed(&parsed, &response.body_text())?;
        debug!(
            family = %parsed.family(),
            token_type = token.token_type(),
            expires_in = token.expires_in(),
            "Access token issued"
        );
        Ok(token)
    }
}

#[async_trait]
impl<T: HttpTransport> TokenFlow for TokenFlowImpl<T> {
    #[instrument(
        skip(self, config),
        fields(grant_type = %config.grant_type(), client_id = config.client_id())
    )]
    async fn acquire_token(&self, config: &OAuth2Config) -> Result<AccessToken, OAuth2Error> {
        self.run_ladder(config, None).await
    }

    #[instrument(skip(self, config, token), fields(client_id = config.client_id()))]
    async fn refresh_token(
        &self,
        config: &OAuth2Config,
        token: &AccessToken,
    ) -> Result<AccessToken, OAuth2Error> {
        if !token.has_refresh_token() {
            warn!("Refreshing a token that carries no refresh token");
        }
        let refresh_config = config.for_refresh();
        self.run_ladder(&refresh_config, token.refresh_token()).await
    }
}

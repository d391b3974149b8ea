//! Protected Resource Access
//!
//! Bearer-authenticated `GET` of a protected resource.

use std::time::Duration;
use tracing::{debug, instrument, warn};

use crate::core::request::resource_request;
use crate::core::HttpTransport;
use crate::error::{classify_status, OAuth2Error};
use crate::types::AccessToken;

/// Fetch `url` with `Authorization: Bearer <token>` and return the body text.
///
/// A failure status is classified and returned as is. The token is never
/// refreshed here and no other credential placement is tried.
#[instrument(skip(transport, token))]
pub async fn fetch_protected_resource<T: HttpTransport + ?Sized>(
    transport: &T,
    token: &AccessToken,
    url: &str,
    timeout: Option<Duration>,
) -> Result<String, OAuth2Error> {
    if token.is_expired() {
        debug!("Using an access token past its expiry");
    }

    let response = transport.send(resource_request(token, url, timeout)).await?;

    if !response.is_success() {
        warn!(status = response.status, "Protected resource request rejected");
        return Err(classify_status(response.status, response.body_text()));
    }

    Ok(response.body_text())
}

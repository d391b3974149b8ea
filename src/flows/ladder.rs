//! Credential Ladder
//!
//! Token endpoints disagree on where client and user credentials belong, so
//! a token request is tried with each placement in turn:
//!
//! | Step | Placement | Authorization header |
//! |------|-----------|----------------------|
//! | A | [`CredentialPlacement::BodyOnly`] | none |
//! | B | [`CredentialPlacement::ResourceOwnerBasic`] | `Basic base64(username:password)` |
//! | C | [`CredentialPlacement::ClientBasic`] | `Basic base64(client_id:client_secret)` |
//!
//! The form body is the same at every step.

use std::fmt;

use crate::core::request::basic_authorization;
use crate::types::OAuth2Config;

/// Where credentials go for one attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CredentialPlacement {
    /// Credentials in the form body only.
    BodyOnly,
    /// Resource owner credentials in a Basic header.
    ResourceOwnerBasic,
    /// Client credentials in a Basic header.
    ClientBasic,
}

impl CredentialPlacement {
    /// First placement tried.
    pub const FIRST: CredentialPlacement = CredentialPlacement::BodyOnly;

    /// Placement tried after this one was rejected, if any.
    pub fn next(self) -> Option<Self> {
        match self {
            Self::BodyOnly => Some(Self::ResourceOwnerBasic),
            Self::ResourceOwnerBasic => Some(Self::ClientBasic),
            Self::ClientBasic => None,
        }
    }

    /// Full ladder in order.
    pub fn ladder() -> impl Iterator<Item = CredentialPlacement> {
        std::iter::successors(Some(Self::FIRST), |placement| placement.next())
    }

    /// Authorization header value for this placement.
    ///
    /// Missing resource owner credentials are encoded as empty strings.
    pub fn authorization(self, config: &OAuth2Config) -> Option<String> {
        match self {
            Self::BodyOnly => None,
            Self::ResourceOwnerBasic => Some(basic_authorization(
                config.username().unwrap_or_default(),
                config.password().unwrap_or_default(),
            )),
            Self::ClientBasic => Some(basic_authorization(
                config.client_id(),
                config.client_secret(),
            )),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BodyOnly => "body_only",
            Self::ResourceOwnerBasic => "resource_owner_basic",
            Self::ClientBasic => "client_basic",
        }
    }
}

impl fmt::Display for CredentialPlacement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::oauth2_config;
    use crate::types::GrantType;

    #[test]
    fn test_ladder_order_and_termination() {
        let ladder: Vec<_> = CredentialPlacement::ladder().collect();
        assert_eq!(
            ladder,
            vec![
                CredentialPlacement::BodyOnly,
                CredentialPlacement::ResourceOwnerBasic,
                CredentialPlacement::ClientBasic,
            ]
        );
        assert_eq!(CredentialPlacement::ClientBasic.next(), None);
    }

    #[test]
    fn test_authorization_per_placement() {
        let config = oauth2_config()
            .grant_type(GrantType::Password)
            .client_id("client1id")
            .client_secret("client1secret")
            .credentials("oauth_user", "oauth_user_password")
            .token_endpoint("http://localhost/token")
            .build()
            .unwrap();

        assert_eq!(CredentialPlacement::BodyOnly.authorization(&config), None);
        assert_eq!(
            CredentialPlacement::ResourceOwnerBasic.authorization(&config),
            Some("Basic b2F1dGhfdXNlcjpvYXV0aF91c2VyX3Bhc3N3b3Jk".to_string())
        );
        assert_eq!(
            CredentialPlacement::ClientBasic.authorization(&config),
            Some("Basic Y2xpZW50MWlkOmNsaWVudDFzZWNyZXQ=".to_string())
        );
    }

    #[test]
    fn test_resource_owner_basic_without_user() {
        let config = oauth2_config()
            .grant_type(GrantType::ClientCredentials)
            .client_id("client1id")
            .client_secret("client1secret")
            .token_endpoint("http://localhost/token")
            .build()
            .unwrap();

        assert_eq!(
            CredentialPlacement::ResourceOwnerBasic.authorization(&config),
            Some("Basic Og==".to_string())
        );
    }
}

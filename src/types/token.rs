//! Token Types
//!
//! The access token value object and the token response fields it is built from.

use chrono::{DateTime, Duration, Utc};
use secrecy::{ExposeSecret, SecretString};

use crate::error::{OAuth2Error, OAuth2Result};
use crate::types::ParsedResponse;

pub const ACCESS_TOKEN: &str = "access_token";
pub const TOKEN_TYPE: &str = "token_type";
pub const EXPIRES_IN: &str = "expires_in";
pub const REFRESH_TOKEN: &str = "refresh_token";

/// Token endpoint response fields.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub refresh_token: Option<String>,
}

impl TokenResponse {
    /// Extract the token fields from a parsed response.
    ///
    /// `access_token`, `token_type` and `expires_in` are required; `expires_in`
    /// may be a number or an integer string (URL-encoded and XML bodies).
    pub fn from_parsed(parsed: &ParsedResponse) -> Result<Self, String> {
        let access_token = parsed
            .get_str(ACCESS_TOKEN)
            .ok_or_else(|| format!("missing or invalid field: {}", ACCESS_TOKEN))?;
        let token_type = parsed
            .get_str(TOKEN_TYPE)
            .ok_or_else(|| format!("missing or invalid field: {}", TOKEN_TYPE))?;
        let expires_in = parsed
            .get_i64(EXPIRES_IN)
            .ok_or_else(|| format!("missing or invalid field: {}", EXPIRES_IN))?;

        Ok(Self {
            access_token,
            token_type,
            expires_in,
            refresh_token: parsed.get_str(REFRESH_TOKEN),
        })
    }
}

/// Bearer access token.
///
/// `expires_at` is fixed at construction from the local clock; a refreshed
/// token is always a new value.
#[derive(Clone)]
pub struct AccessToken {
    value: SecretString,
    token_type: String,
    refresh_token: Option<SecretString>,
    expires_in: i64,
    expires_at: DateTime<Utc>,
}

impl AccessToken {
    /// Create new access token expiring `expires_in` seconds from now.
    pub fn new(
        value: impl Into<String>,
        token_type: impl Into<String>,
        refresh_token: Option<String>,
        expires_in: i64,
    ) -> Self {
        Self::issued_at(value, token_type, refresh_token, expires_in, Utc::now())
    }

    /// Create a token as if it had been issued at `issued_at`.
    pub fn issued_at(
        value: impl Into<String>,
        token_type: impl Into<String>,
        refresh_token: Option<String>,
        expires_in: i64,
        issued_at: DateTime<Utc>,
    ) -> Self {
        Self {
            value: SecretString::new(value.into()),
            token_type: token_type.into(),
            refresh_token: refresh_token.map(SecretString::new),
            expires_in,
            expires_at: expiry_instant(issued_at, expires_in),
        }
    }

    /// Build a token from a successful token endpoint response.
    ///
    /// `body` is only used for the error when a required field is missing.
    pub fn from_parsed(parsed: &ParsedResponse, body: &str) -> OAuth2Result<Self> {
        let response = TokenResponse::from_parsed(parsed).map_err(|message| {
            tracing::error!(
                family = %parsed.family(),
                error = %message,
                "Token response incomplete"
            );
            OAuth2Error::parse(parsed.family(), body, message)
        })?;
        Ok(Self::from(response))
    }

    /// Get token value (for Authorization header).
    pub fn secret(&self) -> &str {
        self.value.expose_secret()
    }

    pub fn token_type(&self) -> &str {
        &self.token_type
    }

    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh_token
            .as_ref()
            .map(|token| token.expose_secret().as_str())
    }

    pub fn has_refresh_token(&self) -> bool {
        self.refresh_token.is_some()
    }

    /// Lifetime in seconds as reported by the server.
    pub fn expires_in(&self) -> i64 {
        self.expires_in
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// `now >= expires_at`, with no safety margin.
    ///
    /// May be false for a token the server already revoked, and may turn true
    /// slightly before the server-side expiry because of clock skew.
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }

    /// Check if the token expires within `margin` from now.
    pub fn is_expiring_within(&self, margin: std::time::Duration) -> bool {
        match Duration::from_std(margin)
            .ok()
            .and_then(|margin| Utc::now().checked_add_signed(margin))
        {
            Some(deadline) => deadline >= self.expires_at,
            None => true,
        }
    }

    /// Format as Authorization header value.
    pub fn authorization_header(&self) -> String {
        format!("Bearer {}", self.value.expose_secret())
    }
}

// Saturates instead of panicking on out-of-range server values.
fn expiry_instant(issued_at: DateTime<Utc>, expires_in: i64) -> DateTime<Utc> {
    Duration::try_seconds(expires_in)
        .and_then(|lifetime| issued_at.checked_add_signed(lifetime))
        .unwrap_or(if expires_in < 0 {
            DateTime::<Utc>::MIN_UTC
        } else {
            DateTime::<Utc>::MAX_UTC
        })
}

impl From<TokenResponse> for AccessToken {
    fn from(response: TokenResponse) -> Self {
        Self::new(
            response.access_token,
            response.token_type,
            response.refresh_token,
            response.expires_in,
        )
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessToken")
            .field("value", &"[REDACTED]")
            .field("token_type", &self.token_type)
            .field(
                "refresh_token",
                &self.refresh_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("expires_in", &self.expires_in)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

//! OAuth2 Error Types
//!
//! Closed error taxonomy for token acquisition, resource access and response parsing.

use std::time::Duration;
use thiserror::Error;

use crate::types::ContentFamily;

/// Boxed parser failure carried by [`OAuth2Error::ParseError`].
pub type ParseCause = Box<dyn std::error::Error + Send + Sync>;

/// Root error type for OAuth2 operations.
#[derive(Error, Debug)]
pub enum OAuth2Error {
    /// HTTP 400: malformed or missing request parameter.
    #[error("Invalid request (HTTP {status}): {body}")]
    InvalidRequest { status: u16, body: String },

    /// HTTP 401: credentials rejected for the chosen placement.
    #[error("Unauthorized (HTTP {status}): {body}")]
    Unauthorized { status: u16, body: String },

    /// HTTP 404: the endpoint does not exist.
    #[error("Resource not found (HTTP {status}): {body}")]
    ResourceNotFound { status: u16, body: String },

    /// HTTP 500. The body is kept for inspection but left out of the message.
    #[error("An error occurred on the authorization server (HTTP {status})")]
    ServerError { status: u16, body: String },

    #[error(
        "Cannot handle {content_type} content type. Supported content types include JSON, XML and URLEncoded"
    )]
    UnsupportedContentType { content_type: String },

    #[error("Error parsing content of type {family}: {source}")]
    ParseError {
        family: ContentFamily,
        body: String,
        #[source]
        source: ParseCause,
    },

    #[error("Transport error: {0}")]
    Transport(#[from] NetworkError),

    /// Any other status `>= 400`.
    #[error("Unexpected HTTP status {status}: {body}")]
    Generic { status: u16, body: String },

    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),
}

impl OAuth2Error {
    /// Create a parse error for the given family.
    pub fn parse(family: ContentFamily, body: impl Into<String>, source: impl Into<ParseCause>) -> Self {
        Self::ParseError {
            family,
            body: body.into(),
            source: source.into(),
        }
    }

    /// Get error code for telemetry.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidRequest { .. } => "OAUTH2_INVALID_REQUEST",
            Self::Unauthorized { .. } => "OAUTH2_UNAUTHORIZED",
            Self::ResourceNotFound { .. } => "OAUTH2_NOT_FOUND",
            Self::ServerError { .. } => "OAUTH2_SERVER_ERROR",
            Self::UnsupportedContentType { .. } => "OAUTH2_UNSUPPORTED_CONTENT",
            Self::ParseError { .. } => "OAUTH2_PARSE",
            Self::Transport(_) => "OAUTH2_TRANSPORT",
            Self::Generic { .. } => "OAUTH2_HTTP",
            Self::Configuration(_) => "OAUTH2_CONFIG",
        }
    }

    /// HTTP status of the response that caused this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::InvalidRequest { status, .. }
            | Self::Unauthorized { status, .. }
            | Self::ResourceNotFound { status, .. }
            | Self::ServerError { status, .. }
            | Self::Generic { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Raw response body, for status errors and parse errors.
    pub fn body(&self) -> Option<&str> {
        match self {
            Self::InvalidRequest { body, .. }
            | Self::Unauthorized { body, .. }
            | Self::ResourceNotFound { body, .. }
            | Self::ServerError { body, .. }
            | Self::Generic { body, .. }
            | Self::ParseError { body, .. } => Some(body),
            _ => None,
        }
    }

    /// RFC 6749 error object carried in a JSON status-error body.
    pub fn error_response(&self) -> Option<OAuth2ErrorResponse> {
        match self {
            Self::ParseError { .. } => None,
            _ => self.body().and_then(parse_error_response),
        }
    }
}

/// Configuration error.
#[derive(Error, Debug)]
pub enum ConfigurationError {
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Invalid endpoint URL {url}: {message}")]
    InvalidEndpoint { url: String, message: String },

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("Unsupported grant type: {grant_type}")]
    UnsupportedGrantType { grant_type: String },

    #[error("Failed to build HTTP client: {message}")]
    HttpClient { message: String },
}

/// Network/transport error.
#[derive(Error, Debug)]
pub enum NetworkError {
    #[error("Connection failed: {message}")]
    ConnectionFailed { message: String },

    #[error("Request timeout after {timeout:?}")]
    Timeout { timeout: Duration },

    #[error("Failed to read response body: {message}")]
    BodyRead { message: String },

    #[error("Response too large: {size} bytes")]
    ResponseTooLarge { size: usize },
}

/// Result type for OAuth2 operations.
pub type OAuth2Result<T> = Result<T, OAuth2Error>;

/// OAuth2 error response from provider.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
pub struct OAuth2ErrorResponse {
    pub error: String,
    #[serde(default)]
    pub error_description: Option<String>,
    #[serde(default)]
    pub error_uri: Option<String>,
}

/// Parse error response from HTTP body.
pub fn parse_error_response(body: &str) -> Option<OAuth2ErrorResponse> {
    serde_json::from_str(body).ok()
}

/// Map a failure status (`>= 400`) to its error kind.
pub fn classify_status(status: u16, body: impl Into<String>) -> OAuth2Error {
    let body = body.into();
    match status {
        400 => OAuth2Error::InvalidRequest { status, body },
        401 => OAuth2Error::Unauthorized { status, body },
        404 => OAuth2Error::ResourceNotFound { status, body },
        500 => OAuth2Error::ServerError { status, body },
        _ => OAuth2Error::Generic { status, body },
    }
}

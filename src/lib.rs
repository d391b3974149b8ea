//! OAuth2 Credential-Fallback Client
//!
//! OAuth2 token acquisition that tolerates token endpoints disagreeing on
//! where credentials belong.
//!
//! # Features
//!
//! - Resource Owner Password Credentials grant (RFC 6749 Section 4.3)
//! - Client Credentials grant (RFC 6749 Section 4.4)
//! - Token Refresh (RFC 6749 Section 6)
//! - Credential ladder: form body only, then resource owner Basic
//!   authentication, then client Basic authentication
//! - JSON, URL-encoded and XML token responses
//! - Status-based error classification
//!
//! # Example
//!
//! ```rust,ignore
//! use oauth2_fallback::{oauth2_config, GrantType, OAuth2Client};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = oauth2_config()
//!         .grant_type(GrantType::Password)
//!         .client_id("my-client-id")
//!         .client_secret("my-client-secret")
//!         .credentials("user", "password")
//!         .token_endpoint("https://provider.com/oauth/token")
//!         .build()?;
//!
//!     let client = OAuth2Client::new(config)?;
//!     let token = client.access_token().await?;
//!     let profile = client
//!         .get_resource(&token, "https://provider.com/api/me")
//!         .await?;
//!
//!     println!("{}", profile);
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - `types`: configuration, token and parsed response types
//! - `error`: error kinds and status classification
//! - `core`: HTTP transport, content negotiation and request construction
//! - `flows`: credential ladder, token acquisition and resource access
//! - `builders`: fluent configuration builder
//! - `client`: high-level client combining all of the above

pub mod builders;
pub mod client;
pub mod core;
pub mod error;
pub mod flows;
pub mod types;

// Re-export main client
pub use client::{oauth2_client, OAuth2Client};

// Re-export builders
pub use builders::{oauth2_config, OAuth2ConfigBuilder};

// Re-export errors
pub use error::{
    classify_status, parse_error_response, ConfigurationError, NetworkError, OAuth2Error,
    OAuth2ErrorResponse, OAuth2Result,
};

// Re-export types
pub use types::{
    // Config
    GrantType, OAuth2Config,
    // Token
    AccessToken, TokenResponse,
    // Content
    ContentFamily, ParsedResponse,
};

// Re-export core components
pub use core::{
    ContentNegotiator, HttpMethod, HttpRequest, HttpResponse, HttpTransport, MockHttpTransport,
    ReqwestHttpTransport,
};

// Re-export flows
pub use flows::{fetch_protected_resource, CredentialPlacement, TokenFlow, TokenFlowImpl};

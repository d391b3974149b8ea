//! OAuth2 Flows
//!
//! - **Password** (RFC 6749 Section 4.3)
//! - **Client Credentials** (RFC 6749 Section 4.4)
//! - **Refresh Token** (RFC 6749 Section 6)
//!
//! Every token request runs through the credential ladder in [`ladder`].

pub mod ladder;
pub mod resource;
pub mod token;

pub use ladder::CredentialPlacement;
pub use resource::fetch_protected_resource;
pub use token::{TokenFlow, TokenFlowImpl};

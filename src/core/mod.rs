//! OAuth2 Core Components
//!
//! Transport, content negotiation and request construction.

pub mod negotiation;
pub mod request;
pub mod transport;

pub use negotiation::*;
pub use transport::*;

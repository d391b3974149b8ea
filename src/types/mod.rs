//! OAuth2 Types
//!
//! Configuration, token and parsed-response types.

pub mod config;
pub mod content;
pub mod token;

pub use config::*;
pub use content::*;
pub use token::*;

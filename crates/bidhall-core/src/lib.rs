//! # Bidhall Core
//!
//! Core types, configuration, and session state for Bidhall.
//!
//! This crate provides:
//! - Configuration loading and validation (JSON5 format)
//! - The explicit user session (bearer token, cached API key, user record)
//! - Typed views over auction API payloads
//! - Form validation for login, registration, listings, bids and profiles
//! - Secrets handling that keeps credentials out of logs

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod auction;
pub mod config;
pub mod secrets;
pub mod session;
pub mod types;
pub mod validation;

pub use config::{Config, ConfigError};
pub use secrets::{ApiKey, BearerToken, scrub_secrets};
pub use session::{FileSessionStore, MemorySessionStore, Session, SessionError, SessionStore, UserRecord};
pub use types::{Bid, Bidder, Listing, Media, MediaRef, Profile};
pub use validation::ValidationError;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::secrets::{ApiKey, BearerToken};
    pub use crate::session::{Session, SessionStore, UserRecord};
    pub use crate::types::*;
    pub use crate::validation::ValidationError;
}

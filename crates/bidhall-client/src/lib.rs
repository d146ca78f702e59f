//! # Bidhall Client
//!
//! Authenticated access to the Noroff auction API.
//!
//! The [`Gateway`] owns the session store, provisions the per-account API
//! key on first use, attaches credentials to every call and unwraps the
//! `{data, errors, message}` envelope. Auth, listing and profile operations
//! are methods on the gateway.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod auth;
pub mod envelope;
mod error;
mod gateway;
mod listings;
mod profiles;

pub use error::ApiError;
pub use gateway::{Gateway, RequestOptions};
pub use listings::{FEED_LIMIT, ListingQuery};

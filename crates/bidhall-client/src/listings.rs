//! Listing feed, detail, CRUD and bidding.

use chrono::{DateTime, Utc};
use reqwest::{Method, Url};
use tracing::info;

use bidhall_core::auction::highest_bid;
use bidhall_core::validation::{ListingForm, ListingUpdateForm, parse_bid};
use bidhall_core::{Listing, ValidationError};

use crate::error::ApiError;
use crate::gateway::{Gateway, RequestOptions, decode};

/// Page size used for the feed and for bid history.
pub const FEED_LIMIT: u32 = 100;

/// Query parameters for listing reads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListingQuery {
    /// Embed the seller profile (`_seller=true`).
    pub seller: bool,
    /// Embed bids (`_bids=true`).
    pub bids: bool,
    /// Sort by creation time, newest first.
    pub newest_first: bool,
    /// Maximum number of listings.
    pub limit: Option<u32>,
}

impl ListingQuery {
    /// The main feed: seller and bids embedded, newest first.
    #[must_use]
    pub const fn feed() -> Self {
        Self {
            seller: true,
            bids: true,
            newest_first: true,
            limit: Some(FEED_LIMIT),
        }
    }

    /// Bids only, for a user's bid history.
    #[must_use]
    pub const fn with_bids() -> Self {
        Self {
            seller: false,
            bids: true,
            newest_first: false,
            limit: Some(FEED_LIMIT),
        }
    }

    /// A single listing with seller and bids.
    #[must_use]
    pub const fn detail() -> Self {
        Self {
            seller: true,
            bids: true,
            newest_first: false,
            limit: None,
        }
    }

    /// Append the query to `url`.
    pub fn apply(&self, url: &mut Url) {
        let mut pairs = Vec::new();
        if self.seller {
            pairs.push(("_seller", "true".to_string()));
        }
        if self.bids {
            pairs.push(("_bids", "true".to_string()));
        }
        if self.newest_first {
            pairs.push(("sort", "created".to_string()));
            pairs.push(("sortOrder", "desc".to_string()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }

        if !pairs.is_empty() {
            url.query_pairs_mut().extend_pairs(pairs);
        }
    }
}

fn listing_id(id: &str) -> Result<&str, ApiError> {
    let id = id.trim();
    if id.is_empty() {
        return Err(ValidationError::MissingListingId.into());
    }
    Ok(id)
}

impl Gateway {
    /// Fetch listings matching `query`.
    ///
    /// # Errors
    ///
    /// Any gateway error, or `Contract` if the answer is not a list.
    pub async fn listings(&self, query: ListingQuery) -> Result<Vec<Listing>, ApiError> {
        let mut url = self.endpoint(&["auction", "listings"])?;
        query.apply(&mut url);

        let payload = self.request(Method::GET, url, RequestOptions::new()).await?;
        match payload {
            None => Ok(Vec::new()),
            some => decode(some),
        }
    }

    /// The newest listings, with seller and bids.
    ///
    /// # Errors
    ///
    /// See [`Self::listings`].
    pub async fn feed(&self) -> Result<Vec<Listing>, ApiError> {
        self.listings(ListingQuery::feed()).await
    }

    /// Load one listing without credentials.
    ///
    /// # Errors
    ///
    /// `Invalid` for a blank ID, `Api` when the API refuses the read and
    /// `Contract("Listing not found.")` when the answer has no listing.
    pub async fn listing(&self, id: &str) -> Result<Listing, ApiError> {
        let id = listing_id(id)?;
        let mut url = self.endpoint(&["auction", "listings", id])?;
        ListingQuery::detail().apply(&mut url);

        let payload = self
            .public_request(Method::GET, url, None, "Failed to load listing")
            .await?;
        let has_id = payload
            .as_ref()
            .and_then(|p| p.get("id"))
            .is_some_and(|v| !v.is_null() && v.as_str() != Some(""));
        if !has_id {
            return Err(ApiError::Contract("Listing not found.".to_string()));
        }

        decode(payload)
    }

    /// Create a listing. Returns the created listing when the API echoes it.
    ///
    /// # Errors
    ///
    /// `Invalid` when the form is rejected locally, otherwise any gateway
    /// error.
    pub async fn create_listing(
        &self,
        form: &ListingForm,
        now: DateTime<Utc>,
    ) -> Result<Option<Listing>, ApiError> {
        let body = form.validate(now)?;
        let url = self.endpoint(&["auction", "listings"])?;

        let payload = self
            .request(Method::POST, url, RequestOptions::json(&body)?)
            .await?;
        let created = payload.map(|p| decode::<Listing>(Some(p))).transpose()?;

        info!(
            id = created.as_ref().map_or("", |l| l.id.as_str()),
            "Listing created"
        );
        Ok(created)
    }

    /// Update a listing's title, description and media.
    ///
    /// # Errors
    ///
    /// `Invalid` for a blank ID or a rejected form, otherwise any gateway
    /// error.
    pub async fn update_listing(
        &self,
        id: &str,
        form: &ListingUpdateForm,
    ) -> Result<Listing, ApiError> {
        let id = listing_id(id)?;
        let body = form.validate()?;
        let url = self.endpoint(&["auction", "listings", id])?;

        let payload = self
            .request(Method::PUT, url, RequestOptions::json(&body)?)
            .await?;

        info!(%id, "Listing updated");
        decode(payload)
    }

    /// Delete a listing. An empty answer is success.
    ///
    /// # Errors
    ///
    /// `Invalid` for a blank ID, otherwise any gateway error.
    pub async fn delete_listing(&self, id: &str) -> Result<(), ApiError> {
        let id = listing_id(id)?;
        let url = self.endpoint(&["auction", "listings", id])?;

        self.request(Method::DELETE, url, RequestOptions::new())
            .await?;

        info!(%id, "Listing deleted");
        Ok(())
    }

    /// Bid on `listing`. The amount is checked against the current highest
    /// bid before anything is sent.
    ///
    /// # Errors
    ///
    /// `Invalid` for a bad or too-low amount, otherwise any gateway error.
    pub async fn place_bid(&self, listing: &Listing, amount: &str) -> Result<(), ApiError> {
        let id = listing_id(&listing.id)?;
        let body = parse_bid(amount, highest_bid(&listing.bids))?;
        let url = self.endpoint(&["auction", "listings", id, "bids"])?;

        self.request(Method::POST, url, RequestOptions::json(&body)?)
            .await?;

        info!(%id, amount = body.amount, "Bid placed");
        Ok(())
    }
}

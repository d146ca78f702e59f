//! The logged-in user's profile and bid history.

use reqwest::Method;
use serde_json::Value;
use tracing::{debug, info};

use bidhall_core::auction::{BidActivity, bid_activity};
use bidhall_core::validation::ProfileUpdateForm;
use bidhall_core::{Profile, UserRecord};

use crate::error::ApiError;
use crate::gateway::{Gateway, RequestOptions, decode};
use crate::listings::ListingQuery;

impl Gateway {
    /// Name of the logged-in user, or `NotAuthenticated`.
    async fn current_user_name(&self) -> Result<String, ApiError> {
        let session = self.session().await?;
        if session.token().is_none() {
            return Err(ApiError::NotAuthenticated);
        }
        session
            .user()
            .map(|u| u.name.clone())
            .filter(|n| !n.is_empty())
            .ok_or(ApiError::NotAuthenticated)
    }

    /// Load the logged-in user's profile and refresh the cached user record.
    ///
    /// # Errors
    ///
    /// `NotAuthenticated` without a token or user name, `Contract` when
    /// the answer carries no profile, otherwise any gateway error.
    pub async fn my_profile(&self) -> Result<Profile, ApiError> {
        let name = self.current_user_name().await?;
        let mut url = self.endpoint(&["auction", "profiles", &name])?;
        url.query_pairs_mut()
            .append_pair("_listings", "true")
            .append_pair("_bids", "true");

        let payload = self.request(Method::GET, url, RequestOptions::new()).await?;
        let has_name = payload
            .as_ref()
            .and_then(|p| p.get("name"))
            .and_then(Value::as_str)
            .is_some_and(|n| !n.is_empty());
        if !has_name {
            return Err(ApiError::Contract(
                "Profile data is missing or invalid.".to_string(),
            ));
        }
        let profile: Profile = decode(payload)?;

        // Reload: the call may have cached a fresh API key.
        let mut session = self.session().await?;
        let mut user = UserRecord::from_profile(&profile);
        if user.email.is_empty() {
            if let Some(previous) = session.user() {
                user.email.clone_from(&previous.email);
            }
        }
        session.set_user(user);
        self.store().save(&session).await?;
        debug!(user = %profile.name, credits = profile.credits, "User record refreshed");

        Ok(profile)
    }

    /// Update bio, avatar and banner, then merge them into the cached user.
    ///
    /// `current` is the profile as last shown, used to detect a no-op edit.
    ///
    /// # Errors
    ///
    /// `NotAuthenticated` when logged out, `Invalid` when the form is
    /// rejected locally, otherwise any gateway error.
    pub async fn update_profile(
        &self,
        current: &Profile,
        form: &ProfileUpdateForm,
    ) -> Result<Profile, ApiError> {
        let name = self.current_user_name().await?;
        let body = form.validate(current.bio.as_deref())?;
        let url = self.endpoint(&["auction", "profiles", &name])?;

        let payload = self
            .request(Method::PUT, url, RequestOptions::json(&body)?)
            .await?;
        let updated: Profile = decode(payload)?;

        let mut session = self.session().await?;
        if let Some(user) = session.user_mut() {
            user.merge_profile_update(&updated);
        }
        self.store().save(&session).await?;

        info!(user = %name, "Profile updated");
        Ok(updated)
    }

    /// Listings the logged-in user has bid on. Empty when logged out or
    /// when the listings answer is not a list.
    ///
    /// # Errors
    ///
    /// Any gateway error from loading the listings.
    pub async fn bid_activity(&self) -> Result<Vec<BidActivity>, ApiError> {
        let session = self.session().await?;
        let Some(name) = session
            .user()
            .map(|u| u.name.clone())
            .filter(|n| !n.is_empty())
        else {
            return Ok(Vec::new());
        };

        let mut url = self.endpoint(&["auction", "listings"])?;
        ListingQuery::with_bids().apply(&mut url);

        let listings = match self.request(Method::GET, url, RequestOptions::new()).await? {
            Some(payload @ Value::Array(_)) => decode(Some(payload))?,
            _ => {
                debug!("Listings answer is not a list");
                Vec::new()
            }
        };
        Ok(bid_activity(listings, &name))
    }
}

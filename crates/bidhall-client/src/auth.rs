//! Login, registration and logout.

use reqwest::Method;
use serde::Deserialize;
use tracing::{info, warn};

use bidhall_core::types::{MediaRef, lenient_credits};
use bidhall_core::validation::{LoginForm, RegisterForm};
use bidhall_core::{BearerToken, Profile, Session, UserRecord};

use crate::error::ApiError;
use crate::gateway::{Gateway, decode};

/// Payload of a successful `POST /auth/login`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginResponse {
    #[serde(default)]
    access_token: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    email: String,
    #[serde(default, deserialize_with = "lenient_credits")]
    credits: i64,
    #[serde(default)]
    avatar: Option<MediaRef>,
    #[serde(default)]
    banner: Option<MediaRef>,
    #[serde(default)]
    bio: Option<String>,
}

impl LoginResponse {
    fn user(&self) -> UserRecord {
        let url = |media: &Option<MediaRef>| {
            media
                .as_ref()
                .and_then(MediaRef::url)
                .filter(|u| !u.is_empty())
                .map(str::to_string)
        };

        UserRecord {
            name: self.name.clone(),
            email: self.email.clone(),
            credits: self.credits,
            avatar: url(&self.avatar),
            banner: url(&self.banner),
            bio: self.bio.clone(),
        }
    }
}

impl Gateway {
    /// Log in and start a new session.
    ///
    /// Any previously cached API key is discarded.
    ///
    /// # Errors
    ///
    /// `Invalid` when the form is rejected locally, `Api` when the API
    /// refuses the credentials, `Contract` when no token comes back.
    pub async fn login(&self, form: &LoginForm) -> Result<UserRecord, ApiError> {
        let body = serde_json::to_value(form.validate()?).map_err(ApiError::Encode)?;
        let url = self.endpoint(&["auth", "login"])?;

        let payload = self
            .public_request(Method::POST, url, Some(body), "Login failed")
            .await?;
        let response: LoginResponse = decode(payload)?;
        if response.access_token.is_empty() {
            return Err(ApiError::Contract(
                "Login succeeded but no access token was returned.".to_string(),
            ));
        }

        let user = response.user();
        let token = BearerToken::new(response.access_token);
        self.store().save(&Session::start(token, user.clone())).await?;

        info!(user = %user.name, "Logged in");
        Ok(user)
    }

    /// Register a new account. Does not log in.
    ///
    /// # Errors
    ///
    /// `Invalid` when the form is rejected locally, `Api` when the API
    /// refuses the registration.
    pub async fn register(&self, form: &RegisterForm) -> Result<Profile, ApiError> {
        let body = serde_json::to_value(form.validate()?).map_err(ApiError::Encode)?;
        let url = self.endpoint(&["auth", "register"])?;

        let payload = self
            .public_request(Method::POST, url, Some(body), "Register failed")
            .await?;
        let profile: Profile = decode(payload)?;

        info!(user = %profile.name, "Registered");
        Ok(profile)
    }

    /// Clear the session: token, API key and user record.
    ///
    /// Best-effort; a failing store is logged, not reported.
    pub async fn logout(&self) {
        match self.store().clear().await {
            Ok(()) => info!("Logged out"),
            Err(e) => warn!(error = %e, "Failed to clear session"),
        }
    }
}

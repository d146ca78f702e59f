//! Authenticated request gateway.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, Method, StatusCode, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use bidhall_core::config::ApiConfig;
use bidhall_core::secrets::{COMMON_SECRET_PATTERNS, scrub_secrets};
use bidhall_core::{ApiKey, Session, SessionStore};

use crate::envelope::{error_message, parse_body, unwrap_data};
use crate::error::ApiError;

const CREATE_API_KEY_PATH: &[&str] = &["auth", "create-api-key"];
const CALL_CONTEXT: &str = "Network error while calling API";
const PROVISION_CONTEXT: &str = "Network error while creating API key";

/// Per-call options: JSON body and extra headers.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    body: Option<Value>,
    headers: Vec<(String, String)>,
}

impl RequestOptions {
    /// Options with no body.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Options carrying `body` serialized as JSON.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Encode` if serialization fails.
    pub fn json<T: Serialize + ?Sized>(body: &T) -> Result<Self, ApiError> {
        Ok(Self {
            body: Some(serde_json::to_value(body).map_err(ApiError::Encode)?),
            headers: Vec::new(),
        })
    }

    /// Add a header. Caller headers override the gateway's defaults.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// Session/request gateway for the auction API.
#[derive(Debug, Clone)]
pub struct Gateway {
    client: Client,
    base_url: Url,
    api_key_header: String,
    store: Arc<dyn SessionStore>,
}

impl Gateway {
    /// Create a gateway from configuration.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Config` for an unusable base URL or HTTP client.
    pub fn new(config: &ApiConfig, store: Arc<dyn SessionStore>) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ApiError::Config(e.to_string()))?;

        Ok(Self {
            client,
            base_url: parse_base_url(&config.base_url)?,
            api_key_header: config.api_key_header.clone(),
            store,
        })
    }

    /// Create a gateway with default settings and a custom base URL.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Config` for an unusable base URL.
    pub fn with_base_url(
        base_url: impl AsRef<str>,
        store: Arc<dyn SessionStore>,
    ) -> Result<Self, ApiError> {
        let config = ApiConfig {
            base_url: base_url.as_ref().to_string(),
            ..ApiConfig::default()
        };
        Self::new(&config, store)
    }

    /// Build an endpoint URL from path segments. Each segment is percent-encoded.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Config` if the base URL cannot take a path.
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::Config(format!("Base URL cannot be a base: {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// The session store this gateway reads and writes.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn SessionStore> {
        &self.store
    }

    /// Load the current session.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Session` if the store fails.
    pub async fn session(&self) -> Result<Session, ApiError> {
        Ok(self.store.load().await?)
    }

    /// Return the cached API key, provisioning one if there is none.
    ///
    /// # Errors
    ///
    /// `NotAuthenticated` without a bearer token, `Network` if the call
    /// cannot complete, `Api` for a non-2xx answer and `Contract` when the
    /// answer carries no key.
    pub async fn ensure_api_key(&self) -> Result<ApiKey, ApiError> {
        let mut session = self.session().await?;
        if let Some(key) = session.api_key() {
            return Ok(key.clone());
        }

        let token = session.token().ok_or(ApiError::NotAuthenticated)?;
        let url = self.endpoint(CREATE_API_KEY_PATH)?;
        debug!(url = %url, "Provisioning API key");

        let headers = vec![
            ("Content-Type".to_string(), "application/json".to_string()),
            ("Authorization".to_string(), token.authorization()),
        ];
        let empty = Value::Object(serde_json::Map::new());
        let (status, text) = self
            .send(Method::POST, url, headers, Some(empty), PROVISION_CONTEXT)
            .await?;
        let payload = parse_body(&text).map_err(|e| ApiError::network(PROVISION_CONTEXT, &e))?;
        let payload = check_status(status, &text, payload, "Failed to create API key")?;

        let key = payload
            .as_ref()
            .and_then(|data| data.get("key"))
            .and_then(Value::as_str)
            .filter(|k| !k.is_empty())
            .map(|k| ApiKey::new(k.to_string()))
            .ok_or_else(|| {
                ApiError::Contract("API key creation succeeded but no key was returned.".to_string())
            })?;

        session.set_api_key(key.clone());
        self.store.save(&session).await?;
        debug!("API key provisioned and cached");

        Ok(key)
    }

    /// Perform an authenticated call and unwrap the envelope.
    ///
    /// Returns `None` for an empty body, otherwise `data` if present or the
    /// whole parsed body.
    ///
    /// # Errors
    ///
    /// `NotAuthenticated` before any I/O when there is no bearer token;
    /// provisioning errors from [`Self::ensure_api_key`]; `Network` when the
    /// call or the parse fails; `Api` for non-2xx answers.
    pub async fn request(
        &self,
        method: Method,
        url: Url,
        options: RequestOptions,
    ) -> Result<Option<Value>, ApiError> {
        let session = self.session().await?;
        let token = session.token().ok_or(ApiError::NotAuthenticated)?;
        let api_key = self.ensure_api_key().await?;

        let headers = merge_headers(
            vec![
                ("Content-Type".to_string(), "application/json".to_string()),
                ("Authorization".to_string(), token.authorization()),
                (self.api_key_header.clone(), api_key.expose().to_string()),
            ],
            options.headers,
        );

        let (status, text) = self
            .send(method, url, headers, options.body, CALL_CONTEXT)
            .await?;
        let payload = parse_body(&text).map_err(|e| ApiError::network(CALL_CONTEXT, &e))?;
        check_status(status, &text, payload, "Request failed")
    }

    /// Perform an unauthenticated call with the same envelope rules.
    ///
    /// Used for login, registration and public listing reads. A body that
    /// does not parse is treated as empty.
    ///
    /// # Errors
    ///
    /// `Network` when the call fails, `Api` for non-2xx answers, with
    /// `fallback` naming the operation in the generic message.
    pub async fn public_request(
        &self,
        method: Method,
        url: Url,
        body: Option<Value>,
        fallback: &str,
    ) -> Result<Option<Value>, ApiError> {
        let headers = vec![("Content-Type".to_string(), "application/json".to_string())];
        let (status, text) = self.send(method, url, headers, body, CALL_CONTEXT).await?;
        check_status(status, &text, parse_body(&text).unwrap_or(None), fallback)
    }

    async fn send(
        &self,
        method: Method,
        url: Url,
        headers: Vec<(String, String)>,
        body: Option<Value>,
        context: &'static str,
    ) -> Result<(StatusCode, String), ApiError> {
        debug!(%method, url = %url, "API call");

        let mut builder = self.client.request(method, url);
        for (name, value) in headers {
            builder = builder.header(name, value);
        }
        if let Some(body) = body {
            builder = builder.body(body.to_string());
        }

        let response = builder
            .send()
            .await
            .map_err(|e| ApiError::network(context, &e))?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ApiError::network(context, &e))?;

        Ok((status, text))
    }
}

/// Turn a non-2xx answer into `ApiError::Api`, otherwise unwrap the envelope.
fn check_status(
    status: StatusCode,
    text: &str,
    payload: Option<Value>,
    fallback: &str,
) -> Result<Option<Value>, ApiError> {
    if !status.is_success() {
        let message = error_message(payload.as_ref(), || {
            format!("{fallback} (HTTP {})", status.as_u16())
        });
        debug!(status = status.as_u16(), %message, "API call failed");
        return Err(ApiError::Api {
            status: status.as_u16(),
            message,
            body: (!text.is_empty()).then(|| scrub_secrets(text, COMMON_SECRET_PATTERNS)),
        });
    }

    Ok(payload.map(unwrap_data))
}

/// Decode an unwrapped payload into a typed record.
pub(crate) fn decode<T: DeserializeOwned>(payload: Option<Value>) -> Result<T, ApiError> {
    serde_json::from_value(payload.unwrap_or(Value::Null))
        .map_err(|e| ApiError::Contract(format!("Unexpected response from API: {e}")))
}

/// Overlay caller headers on the defaults, matching names case-insensitively.
fn merge_headers(
    mut base: Vec<(String, String)>,
    overrides: Vec<(String, String)>,
) -> Vec<(String, String)> {
    for (name, value) in overrides {
        base.retain(|(existing, _)| !existing.eq_ignore_ascii_case(&name));
        base.push((name, value));
    }
    base
}

fn parse_base_url(base_url: &str) -> Result<Url, ApiError> {
    let url = Url::parse(base_url.trim())
        .map_err(|e| ApiError::Config(format!("Invalid API base URL '{base_url}': {e}")))?;
    if url.cannot_be_a_base() {
        return Err(ApiError::Config(format!("Base URL cannot be a base: {base_url}")));
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bidhall_core::MemorySessionStore;
    use pretty_assertions::assert_eq;

    fn gateway(base: &str) -> Gateway {
        Gateway::with_base_url(base, Arc::new(MemorySessionStore::new())).unwrap()
    }

    #[test]
    fn test_endpoint_encodes_segments() {
        let gw = gateway("https://v2.api.noroff.dev");
        let url = gw.endpoint(&["auction", "listings", "a b/c"]).unwrap();
        assert_eq!(url.as_str(), "https://v2.api.noroff.dev/auction/listings/a%20b%2Fc");
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let gw = gateway("http://localhost:8080/api/");
        let url = gw.endpoint(&["auth", "login"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/api/auth/login");
    }

    #[test]
    fn test_invalid_base_url() {
        let result = Gateway::with_base_url("not a url", Arc::new(MemorySessionStore::new()));
        assert!(matches!(result, Err(ApiError::Config(_))));
    }

    #[test]
    fn test_merge_headers_caller_wins() {
        let merged = merge_headers(
            vec![
                ("Content-Type".to_string(), "application/json".to_string()),
                ("Authorization".to_string(), "Bearer t".to_string()),
            ],
            vec![("content-type".to_string(), "text/plain".to_string())],
        );
        assert_eq!(
            merged,
            vec![
                ("Authorization".to_string(), "Bearer t".to_string()),
                ("content-type".to_string(), "text/plain".to_string()),
            ]
        );
    }

    #[test]
    fn test_decode_contract_error() {
        let result: Result<bidhall_core::Listing, _> = decode(None);
        assert!(matches!(result, Err(ApiError::Contract(_))));
    }
}

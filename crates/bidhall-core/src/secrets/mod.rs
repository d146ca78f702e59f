//! Credential wrappers that keep secrets out of logs.
//!
//! - `BearerToken`: the access token returned by login
//! - `ApiKey`: the per-account key provisioned by the auction API
//! - `scrub_secrets`: Redact secrets from error messages

use secrecy::{ExposeSecret, SecretBox};

/// Bearer token wrapper that prevents accidental logging.
///
/// The inner value is wrapped with `secrecy::SecretBox` so that it is
/// not printed by `Debug` or `Display`.
#[derive(Clone)]
pub struct BearerToken(SecretBox<str>);

impl BearerToken {
    /// Create a new bearer token.
    #[must_use]
    pub fn new(token: String) -> Self {
        Self(SecretBox::new(token.into_boxed_str()))
    }

    /// Expose the secret for the `Authorization` header.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }

    /// Render the `Authorization` header value.
    #[must_use]
    pub fn authorization(&self) -> String {
        format!("Bearer {}", self.expose())
    }
}

impl std::fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "BearerToken([REDACTED])")
    }
}

impl std::fmt::Display for BearerToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[REDACTED]")
    }
}

/// API key wrapper that prevents accidental logging.
#[derive(Clone)]
pub struct ApiKey(SecretBox<str>);

impl ApiKey {
    /// Create a new API key.
    #[must_use]
    pub fn new(key: String) -> Self {
        Self(SecretBox::new(key.into_boxed_str()))
    }

    /// Expose the secret for actual API calls.
    ///
    /// Use sparingly - only when actually sending to an API.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ApiKey([REDACTED])")
    }
}

impl std::fmt::Display for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[REDACTED]")
    }
}

/// Scrub secrets from error messages and logs.
///
/// Replaces values after known secret patterns with `[REDACTED]`.
///
/// # Arguments
///
/// * `text` - Text to scrub
/// * `patterns` - Patterns to look for (e.g., `["accessToken\":\"", "key\":\""]`)
#[must_use]
pub fn scrub_secrets(text: &str, patterns: &[&str]) -> String {
    let mut result = text.to_string();

    for pattern in patterns {
        let mut search_start = 0;
        while let Some(start) = result[search_start..].find(pattern) {
            let abs_start = search_start + start + pattern.len();

            // Value ends at whitespace, a quote, or a separator
            let end = result[abs_start..]
                .find(|c: char| c.is_whitespace() || c == '"' || c == '\'' || c == '&' || c == ',')
                .map_or(result.len(), |e| abs_start + e);

            result.replace_range(abs_start..end, "[REDACTED]");

            search_start = abs_start + "[REDACTED]".len();
        }
    }

    result
}

/// Secret patterns that appear in auction API traffic.
pub const COMMON_SECRET_PATTERNS: &[&str] = &[
    "\"accessToken\":\"",
    "\"key\":\"",
    "\"password\":\"",
    "Authorization: Bearer ",
    "X-Noroff-API-Key: ",
    "token=",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_token_redaction() {
        let token = BearerToken::new("eyJhbGciOi.secret".to_string());

        assert_eq!(format!("{token:?}"), "BearerToken([REDACTED])");
        assert_eq!(format!("{token}"), "[REDACTED]");
        assert_eq!(token.authorization(), "Bearer eyJhbGciOi.secret");
    }

    #[test]
    fn test_api_key_redaction() {
        let key = ApiKey::new("8c4f-secret".to_string());

        assert_eq!(format!("{key:?}"), "ApiKey([REDACTED])");
        assert_eq!(format!("{key}"), "[REDACTED]");
        assert_eq!(key.expose(), "8c4f-secret");
    }

    #[test]
    fn test_scrub_login_payload() {
        let text = r#"{"data":{"name":"kari","accessToken":"eyJ.abc.def","credits":1000}}"#;
        let scrubbed = scrub_secrets(text, COMMON_SECRET_PATTERNS);
        assert!(scrubbed.contains("[REDACTED]"));
        assert!(!scrubbed.contains("eyJ.abc.def"));
        assert!(scrubbed.contains("\"name\":\"kari\""));
    }

    #[test]
    fn test_scrub_header_line() {
        let text = "sent X-Noroff-API-Key: abc-123 with Authorization: Bearer tok";
        let scrubbed = scrub_secrets(text, COMMON_SECRET_PATTERNS);
        assert_eq!(
            scrubbed,
            "sent X-Noroff-API-Key: [REDACTED] with Authorization: Bearer [REDACTED]"
        );
    }
}

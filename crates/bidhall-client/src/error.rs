//! Client errors.

use bidhall_core::{SessionError, ValidationError};
use thiserror::Error;

/// Every failure the client surfaces.
///
/// `Display` is the message meant for the user. Callers that only care
/// whether a call failed can treat all variants alike.
#[derive(Error, Debug)]
pub enum ApiError {
    /// No bearer token (or no logged-in user) when one is required.
    #[error("Not authenticated. Please log in again.")]
    NotAuthenticated,

    /// The request could not be completed: DNS, connect, body read or JSON parse.
    #[error("{context}: {message}")]
    Network {
        /// What the client was doing.
        context: &'static str,
        /// Original error text.
        message: String,
    },

    /// The API answered with a non-2xx status.
    #[error("{message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Message picked from the error envelope.
        message: String,
        /// Raw response text, kept for diagnostics.
        body: Option<String>,
    },

    /// A 2xx response without a field the client needs.
    #[error("{0}")]
    Contract(String),

    /// Local validation rejected the input before any request.
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    /// Reading or writing the session failed.
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    /// A request body could not be encoded.
    #[error("Could not encode request body: {0}")]
    Encode(#[source] serde_json::Error),

    /// Invalid client configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl ApiError {
    pub(crate) fn network(context: &'static str, error: &impl std::fmt::Display) -> Self {
        Self::Network {
            context,
            message: error.to_string(),
        }
    }

    /// HTTP status for API-reported failures.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Raw response text for API-reported failures.
    #[must_use]
    pub fn body(&self) -> Option<&str> {
        match self {
            Self::Api { body, .. } => body.as_deref(),
            _ => None,
        }
    }

    /// The message followed by the raw response text, when there is one.
    #[must_use]
    pub fn detail(&self) -> String {
        match self.body() {
            Some(body) => format!("{self}\n{body}"),
            None => self.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display_is_message_only() {
        let err = ApiError::Api {
            status: 400,
            message: "Title is required".to_string(),
            body: Some(r#"{"errors":[{"message":"Title is required"}]}"#.to_string()),
        };
        assert_eq!(err.to_string(), "Title is required");
        assert_eq!(err.status(), Some(400));
        assert_eq!(
            err.detail(),
            "Title is required\n{\"errors\":[{\"message\":\"Title is required\"}]}"
        );
    }

    #[test]
    fn test_network_error_keeps_original() {
        let err = ApiError::network("Network error while calling API", &"connection refused");
        assert_eq!(err.to_string(), "Network error while calling API: connection refused");
        assert_eq!(err.detail(), err.to_string());
    }

    #[test]
    fn test_validation_error_is_transparent() {
        let err = ApiError::from(ValidationError::TitleRequired);
        assert_eq!(err.to_string(), "Title is required.");
    }
}

//! Catalog Store errors.

use thiserror::Error;

use crate::session::AuthError;

/// Errors that can occur when talking to the Catalog Store.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Transport failure: connection refused, timeout, TLS, body read.
    #[error("Catalog Store request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The Catalog Store rejected the bearer token.
    #[error("Unauthorized{}", detail(.message.as_deref()))]
    Unauthorized {
        /// Server-provided reason, if any.
        message: Option<String>,
    },

    /// Non-success status other than 401.
    #[error("Catalog Store returned HTTP {status}{}", detail(.message.as_deref()))]
    Status {
        /// HTTP status code.
        status: u16,
        /// `message` (or `error`) field of the response body, if any.
        message: Option<String>,
    },

    /// Response body did not have the expected shape.
    #[error("Invalid Catalog Store response: {0}")]
    Parse(#[from] serde_json::Error),

    /// Endpoint URL could not be built.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// No usable session for an authenticated call.
    #[error(transparent)]
    Auth(#[from] AuthError),
}

fn detail(message: Option<&str>) -> String {
    message.map(|m| format!(": {m}")).unwrap_or_default()
}

impl CatalogError {
    /// HTTP status of the failed response, when there was one.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            Self::Unauthorized { .. } => Some(401),
            Self::Status { status, .. } => Some(*status),
            Self::Parse(_) | Self::Url(_) | Self::Auth(_) => None,
        }
    }

    /// Whether the endpoint is missing (404) or does not accept the method
    /// (405). Toggles retry these once against the generic update endpoint.
    #[must_use]
    pub fn is_fallback_eligible(&self) -> bool {
        matches!(self.status(), Some(404 | 405))
    }

    /// Whether the caller has to log in (again) before retrying.
    #[must_use]
    pub const fn requires_login(&self) -> bool {
        matches!(
            self,
            Self::Unauthorized { .. } | Self::Auth(AuthError::MissingToken | AuthError::Expired)
        )
    }

    /// Message supplied by the Catalog Store in the error body.
    #[must_use]
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Unauthorized { message } | Self::Status { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    /// Text to show the operator.
    ///
    /// Preference order: the server's message, then the transport error,
    /// then `default`.
    #[must_use]
    pub fn user_message(&self, default: &str) -> String {
        if let Some(message) = self.server_message() {
            return message.to_string();
        }
        match self {
            Self::Http(e) => e.to_string(),
            Self::Auth(e) => e.to_string(),
            _ => default.to_string(),
        }
    }
}

/// Extract `message`, falling back to `error`, from an error response body.
pub(crate) fn message_from_body(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    ["message", "error"].iter().find_map(|key| {
        value
            .get(key)
            .and_then(serde_json::Value::as_str)
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(str::to_string)
    })
}

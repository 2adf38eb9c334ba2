//! Unified error handling for the admin services.

use thiserror::Error;

use crate::catalog::CatalogError;
use crate::config::ConfigError;
use crate::session::AuthError;

/// Error type returned by the admin services.
#[derive(Debug, Error)]
pub enum AdminError {
    /// A Catalog Store call failed during `context`.
    #[error("{context}: {source}")]
    Catalog {
        /// Operator-facing description of what was attempted, e.g.
        /// "Unable to update positions". Used as the default message.
        context: &'static str,
        #[source]
        source: CatalogError,
    },

    /// Session could not be established.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Configuration is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Referenced entity is not in the loaded data.
    #[error("Not found: {0}")]
    NotFound(String),
}

impl From<CatalogError> for AdminError {
    fn from(source: CatalogError) -> Self {
        source.during("Catalog Store request failed")
    }
}

impl CatalogError {
    /// Attach the operator-facing context of the failed operation.
    #[must_use]
    pub const fn during(self, context: &'static str) -> AdminError {
        AdminError::Catalog {
            context,
            source: self,
        }
    }
}

impl AdminError {
    /// Text to show the operator.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Catalog { context, source } => source.user_message(context),
            Self::Auth(e) => e.to_string(),
            Self::Config(e) => e.to_string(),
            Self::NotFound(_) => self.to_string(),
        }
    }

    /// Whether the operator has to log in (again).
    #[must_use]
    pub const fn requires_login(&self) -> bool {
        match self {
            Self::Catalog { source, .. } => source.requires_login(),
            Self::Auth(e) => matches!(e, AuthError::MissingToken | AuthError::Expired),
            Self::Config(_) | Self::NotFound(_) => false,
        }
    }

    /// Whether this is a fault on the Catalog Store side or in transport,
    /// as opposed to operator input or an expired session.
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        match self {
            Self::Catalog { source, .. } => match source {
                CatalogError::Http(_) | CatalogError::Parse(_) => true,
                CatalogError::Status { status, .. } => *status >= 500,
                _ => false,
            },
            _ => false,
        }
    }

    /// Log the error, sending server-side faults to Sentry.
    pub fn report(&self) {
        if self.is_server_error() {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Admin operation failed"
            );
        } else {
            tracing::warn!(error = %self, "Admin operation failed");
        }
    }
}

//! Admin session: the bearer token and where it is kept.
//!
//! A [`Session`] is injected into the catalog client; the token never leaves
//! it except through [`Session::bearer`], which refuses expired tokens.
//! [`TokenFile`] is the persisted storage written by `login`.

pub mod jwt;

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use tracing::{debug, info};

/// Session and login errors.
#[derive(Debug, Error)]
pub enum AuthError {
    /// No token in the environment or the token file.
    #[error("Not logged in")]
    MissingToken,

    /// Token has no readable `exp` claim or it has passed.
    #[error("Session expired, please log in again")]
    Expired,

    /// The Catalog Store refused the credentials.
    #[error("Login failed: {0}")]
    LoginFailed(String),

    /// Token file could not be read or written.
    #[error("Session storage error: {0}")]
    Storage(#[from] std::io::Error),
}

/// Bearer-token holder.
#[derive(Clone, Default)]
pub struct Session {
    token: Option<SecretString>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("expires_at", &self.expires_at())
            .finish()
    }
}

impl Session {
    /// Session carrying `token`.
    #[must_use]
    pub const fn new(token: SecretString) -> Self {
        Self { token: Some(token) }
    }

    /// Session without a token. Only the login endpoint accepts it.
    #[must_use]
    pub const fn anonymous() -> Self {
        Self { token: None }
    }

    /// Whether a token is present (expired or not).
    #[must_use]
    pub const fn has_token(&self) -> bool {
        self.token.is_some()
    }

    /// When the token expires, if it says.
    #[must_use]
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        let exp = jwt::expiry(self.token.as_ref()?.expose_secret())?;
        #[allow(clippy::cast_possible_truncation)] // sub-second precision is irrelevant
        DateTime::from_timestamp(exp as i64, 0)
    }

    /// The token, if present and unexpired now.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingToken` or `AuthError::Expired`.
    pub fn bearer(&self) -> Result<&SecretString, AuthError> {
        self.bearer_at(Utc::now().timestamp())
    }

    /// The token, if present and unexpired at `now` (Unix seconds).
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingToken` or `AuthError::Expired`.
    pub fn bearer_at(&self, now: i64) -> Result<&SecretString, AuthError> {
        let token = self.token.as_ref().ok_or(AuthError::MissingToken)?;
        if jwt::is_expired_at(token.expose_secret(), now) {
            return Err(AuthError::Expired);
        }
        Ok(token)
    }

    /// Resolve the session to use for authenticated calls.
    ///
    /// A token from the environment wins over the token file. An expired
    /// token read from the file is deleted so the next run starts clean.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingToken` when neither source has a token,
    /// `AuthError::Expired` when the chosen token has expired, or
    /// `AuthError::Storage` if the file cannot be read or cleared.
    pub async fn restore(
        override_token: Option<SecretString>,
        file: &TokenFile,
    ) -> Result<Self, AuthError> {
        if let Some(token) = override_token {
            let session = Self::new(token);
            session.bearer()?;
            debug!("Using admin token from environment");
            return Ok(session);
        }

        let token = file.load().await?.ok_or(AuthError::MissingToken)?;
        let session = Self::new(token);
        if let Err(e) = session.bearer() {
            info!(path = %file.path().display(), "Stored admin token expired, removing it");
            file.clear().await?;
            return Err(e);
        }
        Ok(session)
    }
}

/// File holding the admin token between runs.
#[derive(Debug, Clone)]
pub struct TokenFile {
    path: PathBuf,
}

impl TokenFile {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored token. A missing or blank file means "no token".
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Storage` on any I/O error other than not-found.
    pub async fn load(&self) -> Result<Option<SecretString>, AuthError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => {
                let token = contents.trim();
                Ok((!token.is_empty()).then(|| SecretString::from(token.to_string())))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Store `token`, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Storage` if the file cannot be written.
    pub async fn save(&self, token: &SecretString) -> Result<(), AuthError> {
        tokio::fs::write(&self.path, token.expose_secret()).await?;
        Ok(())
    }

    /// Remove the stored token. Removing an absent file succeeds.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Storage` if the file exists but cannot be removed.
    pub async fn clear(&self) -> Result<(), AuthError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::jwt::test_tokens::token_expiring;
    use super::*;

    fn temp_file(name: &str) -> TokenFile {
        let path = std::env::temp_dir().join(format!(
            "u1r-session-{name}-{}-{}",
            std::process::id(),
            Utc::now().timestamp_nanos_opt().unwrap_or_default()
        ));
        TokenFile::new(path)
    }

    #[test]
    fn test_bearer_checks_expiry() {
        let session = Session::new(SecretString::from(token_expiring(2_000)));
        assert!(session.bearer_at(1_999).is_ok());
        assert!(matches!(session.bearer_at(2_000), Err(AuthError::Expired)));
        assert!(matches!(
            Session::anonymous().bearer_at(0),
            Err(AuthError::MissingToken)
        ));
    }

    #[test]
    fn test_debug_redacts_token() {
        let token = token_expiring(4_102_444_800);
        let session = Session::new(SecretString::from(token.clone()));
        let debug = format!("{session:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains(&token));
        assert!(debug.contains("2100-01-01"));
    }

    #[tokio::test]
    async fn test_token_file_round_trip_and_clear() {
        let file = temp_file("roundtrip");
        assert!(file.load().await.unwrap().is_none());

        let token = SecretString::from(token_expiring(4_102_444_800));
        file.save(&token).await.unwrap();
        let loaded = file.load().await.unwrap().unwrap();
        assert_eq!(loaded.expose_secret(), token.expose_secret());

        file.clear().await.unwrap();
        assert!(file.load().await.unwrap().is_none());
        file.clear().await.unwrap();
    }

    #[tokio::test]
    async fn test_restore_removes_expired_stored_token() {
        let file = temp_file("expired");
        file.save(&SecretString::from(token_expiring(1_000))).await.unwrap();

        let result = Session::restore(None, &file).await;

        assert!(matches!(result, Err(AuthError::Expired)));
        assert!(!file.path().exists());
    }

    #[tokio::test]
    async fn test_restore_prefers_environment_token() {
        let file = temp_file("override");
        file.save(&SecretString::from("stale-garbage".to_string()))
            .await
            .unwrap();
        let env_token = token_expiring(4_102_444_800);

        let session = Session::restore(Some(SecretString::from(env_token.clone())), &file)
            .await
            .unwrap();

        assert_eq!(session.bearer().unwrap().expose_secret(), env_token);
        assert!(file.path().exists());
        file.clear().await.unwrap();
    }

    #[tokio::test]
    async fn test_restore_without_any_token() {
        let file = temp_file("missing");
        assert!(matches!(
            Session::restore(None, &file).await,
            Err(AuthError::MissingToken)
        ));
    }
}

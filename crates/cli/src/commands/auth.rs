//! Session commands.
//!
//! # Usage
//!
//! ```bash
//! U1R_ADMIN_PASSWORD=... u1r login -e admin@u1rfoods.com
//! echo "$PASSWORD" | u1r login -e admin@u1rfoods.com
//! u1r logout
//! ```

use secrecy::SecretString;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader};
use u1r_admin::Session;
use u1r_core::Email;

use super::Context;

/// Errors specific to the login command.
#[derive(Debug, Error)]
pub enum LoginError {
    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] u1r_core::EmailError),

    #[error("No password given: set U1R_ADMIN_PASSWORD or pipe it on stdin")]
    MissingPassword,

    #[error("Could not read password: {0}")]
    Io(#[from] std::io::Error),
}

/// Exchange credentials for a token and store it.
pub async fn login(ctx: &Context, email: &str) -> Result<(), Box<dyn std::error::Error>> {
    let email = Email::parse(email).map_err(LoginError::from)?;
    let password = read_password().await?;

    let token = ctx
        .anonymous_client()?
        .login(&email, &password)
        .await
        .map_err(|e| ctx.fail(e.during("Login failed")))?;

    let file = ctx.token_file();
    file.save(&token).await?;

    let session = Session::new(token);
    match session.expires_at() {
        Some(expires_at) => tracing::info!(%email, %expires_at, "Logged in"),
        None => tracing::info!(%email, "Logged in"),
    }
    if ctx.config.token.is_some() {
        tracing::warn!("U1R_ADMIN_TOKEN is set and takes precedence over the stored session");
    }
    Ok(())
}

/// Remove the stored token.
pub async fn logout(ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
    let file = ctx.token_file();
    file.clear().await?;
    tracing::info!(path = %file.path().display(), "Logged out");
    Ok(())
}

async fn read_password() -> Result<SecretString, LoginError> {
    if let Some(password) = std::env::var("U1R_ADMIN_PASSWORD")
        .ok()
        .filter(|p| !p.is_empty())
    {
        return Ok(SecretString::from(password));
    }

    let mut line = String::new();
    BufReader::new(tokio::io::stdin()).read_line(&mut line).await?;
    let password = line.trim_end_matches(['\r', '\n']);
    if password.is_empty() {
        return Err(LoginError::MissingPassword);
    }
    Ok(SecretString::from(password.to_string()))
}

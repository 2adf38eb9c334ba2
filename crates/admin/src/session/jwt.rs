//! Reading the `exp` claim of an admin JWT.
//!
//! The signature is not verified: the Catalog Store does that. The console
//! only needs to know whether a stored token is still worth sending.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;

/// Decode the payload (second) segment of a JWT.
///
/// Accepts both base64 alphabets, with or without padding. Returns `None`
/// for anything that is not a dot-separated token with a JSON payload.
#[must_use]
pub fn decode_payload(token: &str) -> Option<serde_json::Value> {
    let payload = token.split('.').nth(1)?;
    let normalized: String = payload
        .trim_end_matches('=')
        .chars()
        .map(|c| match c {
            '+' => '-',
            '/' => '_',
            other => other,
        })
        .collect();
    let bytes = URL_SAFE_NO_PAD.decode(normalized).ok()?;
    serde_json::from_slice(&bytes).ok()
}

/// The numeric `exp` claim, in seconds since the Unix epoch.
#[must_use]
pub fn expiry(token: &str) -> Option<f64> {
    decode_payload(token)?.get("exp")?.as_f64()
}

/// Whether the token should be treated as expired at `now` (Unix seconds).
///
/// Tokens without a readable numeric `exp` count as expired.
#[must_use]
#[allow(clippy::cast_precision_loss)] // Unix seconds fit in f64 exactly
pub fn is_expired_at(token: &str, now: i64) -> bool {
    expiry(token).is_none_or(|exp| exp <= now as f64)
}

//! Image URL resolution.

use url::Url;

/// Resolve an image reference from the Catalog Store against `base`.
///
/// - Relative paths (with or without a leading `/`, Windows separators
///   tolerated) are joined onto the base.
/// - Absolute `http(s)` URLs whose path starts with `/uploads/` are rebased
///   onto the base, keeping path and query.
/// - Any other absolute URL is returned as is.
///
/// Blank input yields `None`.
#[must_use]
pub fn resolve_asset_url(base: &Url, raw: &str) -> Option<String> {
    let cleaned = raw.trim().replace('\\', "/");
    if cleaned.is_empty() {
        return None;
    }

    let lower = cleaned.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        let Ok(parsed) = Url::parse(&cleaned) else {
            return Some(cleaned);
        };
        if !parsed.path().starts_with("/uploads/") {
            return Some(cleaned);
        }
        let mut rebased = base.join(parsed.path().trim_start_matches('/')).ok()?;
        rebased.set_query(parsed.query());
        return Some(rebased.into());
    }

    base.join(cleaned.trim_start_matches('/'))
        .ok()
        .map(Into::into)
}

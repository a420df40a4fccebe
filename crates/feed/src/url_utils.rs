// ABOUTME: URL normalization and relative-link resolution for feed content.
// ABOUTME: Rewrites podcast pseudo-schemes, enforces a scheme whitelist, and joins against xml:base.

use url::Url;

/// Schemes a stored URL may use after normalization.
const ALLOWED_SCHEMES: &[&str] = &["http", "https", "ftp", "file"];

/// Pseudo-schemes used by podcast directories that really mean http.
const HTTP_ALIASES: &[&str] = &["feed", "itpc", "itms"];

/// Normalizes a feed or media URL.
///
/// Trims whitespace, assumes `http://` when no scheme is given, lower-cases
/// scheme and host, turns an empty path into `/`, rewrites `feed`, `itpc` and
/// `itms` to `http`, and drops an empty query or fragment. Returns None for
/// inputs shorter than 8 characters or schemes outside the whitelist.
pub fn normalize_feed_url(url: &str) -> Option<String> {
    let url = url.trim();
    if url.chars().count() < 8 {
        return None;
    }

    let url = if url.contains("://") {
        url.to_string()
    } else {
        format!("http://{}", url)
    };

    let (scheme, rest) = url.split_once("://")?;
    let mut scheme = scheme.to_ascii_lowercase();
    if HTTP_ALIASES.contains(&scheme.as_str()) {
        scheme = "http".to_string();
    }
    if !ALLOWED_SCHEMES.contains(&scheme.as_str()) {
        return None;
    }

    let mut parsed = match Url::parse(&format!("{}://{}", scheme, rest)) {
        Ok(parsed) => parsed,
        Err(err) => {
            tracing::debug!(url = %url, error = %err, "rejecting unparseable URL");
            return None;
        }
    };

    if parsed.query() == Some("") {
        parsed.set_query(None);
    }
    if parsed.fragment() == Some("") {
        parsed.set_fragment(None);
    }

    Some(parsed.into())
}

/// Joins a possibly relative reference against a base URL.
/// When the base is not an absolute URL the reference is returned unchanged.
pub fn join_url(base: &str, reference: &str) -> String {
    match Url::parse(base).and_then(|base| base.join(reference)) {
        Ok(joined) => joined.into(),
        Err(_) => reference.to_string(),
    }
}

/// Resolves a reference against a base URL and normalizes the result.
/// Empty references resolve to nothing.
pub fn resolve_url(base: &str, reference: &str) -> Option<String> {
    let reference = reference.trim();
    if reference.is_empty() {
        return None;
    }
    normalize_feed_url(&join_url(base, reference))
}

/// Returns the last path segment of a URL or path without its extension.
///
/// A leading dot does not start an extension, so `.hidden` stays `.hidden`.
pub fn file_basename_no_extension(path: &str) -> String {
    let base = path.rsplit('/').next().unwrap_or(path);
    let leading_dots = base.len() - base.trim_start_matches('.').len();
    match base.rfind('.') {
        Some(idx) if idx >= leading_dots => base[..idx].to_string(),
        _ => base.to_string(),
    }
}

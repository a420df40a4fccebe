// ABOUTME: Enclosure attribute parsing for byte lengths and MIME types.
// ABOUTME: Substitutes -1 and application/octet-stream for missing or malformed values.

/// MIME type used when a feed gives none or an unusable one.
pub const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

/// Parses an enclosure length in bytes.
/// Absent, zero, or non-numeric values yield -1 (unknown).
pub fn parse_length(text: Option<&str>) -> i64 {
    let Some(text) = text else {
        return -1;
    };
    match text.trim().parse::<i64>() {
        Ok(0) | Err(_) => -1,
        Ok(length) => length,
    }
}

/// Normalizes a MIME type; anything without a `/` becomes the default.
pub fn parse_type(text: Option<&str>) -> String {
    match text {
        Some(mime) if mime.contains('/') => mime.to_string(),
        _ => DEFAULT_MIME_TYPE.to_string(),
    }
}

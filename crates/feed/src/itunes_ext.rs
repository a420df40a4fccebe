// ABOUTME: Closed vocabularies of the iTunes and podcast namespaces.
// ABOUTME: Maps explicit flags, show and episode types, season/episode numbers, and keyword lists.

use crate::models::{EpisodeType, PodcastType};

/// Maps an explicit-style flag to a boolean.
///
/// Case-insensitive: "yes", "explicit" and "true" are true; "no", "clean"
/// and "false" are false. Anything else is None and leaves the field alone.
pub fn parse_explicit(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "yes" | "explicit" | "true" => Some(true),
        "no" | "clean" | "false" => Some(false),
        _ => None,
    }
}

/// Reads `itunes:type`. Only the exact values "episodic" and "serial" count.
pub fn parse_podcast_type(value: &str) -> Option<PodcastType> {
    match value {
        "episodic" => Some(PodcastType::Episodic),
        "serial" => Some(PodcastType::Serial),
        _ => None,
    }
}

/// Reads `itunes:episodeType`, case-insensitively.
pub fn parse_episode_type(value: &str) -> Option<EpisodeType> {
    match value.to_lowercase().as_str() {
        "full" => Some(EpisodeType::Full),
        "trailer" => Some(EpisodeType::Trailer),
        "bonus" => Some(EpisodeType::Bonus),
        _ => None,
    }
}

/// Reads `itunes:season`; anything that is not an integer is season 0.
pub fn parse_season(value: &str) -> i64 {
    value.trim().parse().unwrap_or(0)
}

/// Reads `itunes:episode`; only positive integers are kept.
pub fn parse_episode_number(value: &str) -> Option<i64> {
    value.trim().parse().ok().filter(|number: &i64| *number > 0)
}

/// Splits `itunes:keywords` on commas into a set, keeping first-seen order.
pub fn parse_keywords(value: &str) -> Vec<String> {
    let mut keywords: Vec<String> = Vec::new();
    for keyword in value.split(',').map(str::trim).filter(|k| !k.is_empty()) {
        if !keywords.iter().any(|seen| seen == keyword) {
            keywords.push(keyword.to_string());
        }
    }
    keywords
}

// ABOUTME: Record types produced by the podcast parser.
// ABOUTME: Podcast, Episode, Enclosure, Chapter, Person, and ItunesOwner with explicit optional fields.

use serde::{Deserialize, Serialize};

use crate::url_utils::file_basename_no_extension;

/// Publishing model declared by `itunes:type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PodcastType {
    Episodic,
    Serial,
}

/// Episode classification declared by `itunes:episodeType`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EpisodeType {
    Full,
    Trailer,
    Bonus,
}

/// A downloadable media file attached to an episode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enclosure {
    pub url: String,
    /// Size in bytes, -1 when unknown.
    pub file_size: i64,
    pub mime_type: String,
}

/// A Podlove Simple Chapters entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chapter {
    /// Offset into the episode in seconds.
    pub start: i64,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// A `podcast:person` credit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub name: String,
    pub role: String,
    pub group: String,
    pub href: Option<String>,
    pub img: Option<String>,
}

impl Default for Person {
    fn default() -> Self {
        Self {
            name: String::new(),
            role: "host".to_string(),
            group: "cast".to_string(),
            href: None,
            img: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItunesOwner {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// A validated episode. `guid` and `title` are never empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Episode {
    pub title: String,
    pub link: String,
    pub guid: String,
    /// Plain text; never contains markup.
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description_html: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    /// Unix timestamp, 0 when unknown.
    pub published: i64,
    /// Duration in seconds, 0 when unknown.
    pub total_time: i64,
    pub season: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<i64>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub episode_type: Option<EpisodeType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explicit: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub episode_art_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transcript_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chapters_json_url: Option<String>,
    pub enclosures: Vec<Enclosure>,
    /// Present only when at least one chapter was parsed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chapters: Option<Vec<Chapter>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persons: Option<Vec<Person>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub itunes_author: Option<String>,
}

/// The normalized record for one feed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Podcast {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generator: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub funding_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub import_prohibited: Option<bool>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub podcast_type: Option<PodcastType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub itunes_author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub itunes_owner: Option<ItunesOwner>,
    /// Rows of `[category, subcategory?, subsubcategory?]`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub itunes_categories: Vec<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub itunes_keywords: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paged_feed_first: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paged_feed_next: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explicit: Option<bool>,
    pub episodes: Vec<Episode>,
}

impl Podcast {
    /// Creates an empty record whose title falls back to the basename of `url`.
    pub fn new(url: &str) -> Self {
        Self {
            title: file_basename_no_extension(url),
            ..Self::default()
        }
    }
}

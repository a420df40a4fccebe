// ABOUTME: Document state built up while a feed streams through the dispatcher.
// ABOUTME: Holds the podcast record, the open episode draft, xml:base scopes, and episode validation.

use std::collections::HashSet;

use crate::html_utils::{is_html, remove_html_tags};
use crate::models::{Chapter, Enclosure, Episode, EpisodeType, Person, Podcast, PodcastType};
use crate::url_utils::{file_basename_no_extension, join_url, normalize_feed_url, resolve_url};

/// True when an optional text slot holds a non-empty value.
pub(crate) fn is_set(slot: &Option<String>) -> bool {
    slot.as_deref().is_some_and(|value| !value.is_empty())
}

/// Stores `value` in a text slot.
///
/// With `overwrite` off an already non-empty slot is kept. An empty value
/// never replaces an existing one, but does mark an unset slot as present.
pub(crate) fn write_text(slot: &mut Option<String>, value: String, overwrite: bool) {
    if !overwrite && is_set(slot) {
        return;
    }
    if !value.is_empty() || slot.is_none() {
        *slot = Some(value);
    }
}

/// An episode while its element is still open.
///
/// Every field is optional so that "never seen" and "seen but empty" stay
/// distinguishable until [`EpisodeDraft::finish`] decides what to keep.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct EpisodeDraft {
    pub title: Option<String>,
    pub link: Option<String>,
    pub guid: Option<String>,
    pub description: Option<String>,
    pub description_html: Option<String>,
    pub subtitle: Option<String>,
    pub published: Option<i64>,
    pub total_time: Option<i64>,
    pub season: Option<i64>,
    pub number: Option<i64>,
    pub episode_type: Option<EpisodeType>,
    pub explicit: Option<bool>,
    pub payment_url: Option<String>,
    pub episode_art_url: Option<String>,
    pub transcript_url: Option<String>,
    pub chapters_json_url: Option<String>,
    pub enclosures: Vec<Enclosure>,
    pub chapters: Vec<Chapter>,
    pub persons: Option<Vec<Person>>,
    pub itunes_author: Option<String>,
    /// Set from `isPermaLink` when the guid element opens.
    pub guid_is_permalink: bool,
    /// `type` attribute of the Atom content element currently open.
    pub atom_content_type: Option<String>,
}

impl EpisodeDraft {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates and repairs the draft.
    ///
    /// Returns None when the episode cannot be identified: it has no guid,
    /// no link, and not exactly one distinct enclosure URL; or it has no title
    /// and not exactly one enclosure to name it after.
    pub fn finish(self) -> Option<Episode> {
        let EpisodeDraft {
            title,
            link,
            guid,
            description,
            description_html,
            subtitle,
            published,
            total_time,
            season,
            number,
            episode_type,
            explicit,
            payment_url,
            episode_art_url,
            transcript_url,
            chapters_json_url,
            enclosures,
            chapters,
            persons,
            itunes_author,
            guid_is_permalink,
            atom_content_type: _,
        } = self;

        let mut description = description.unwrap_or_default();
        let mut description_html = description_html.filter(|html| !html.is_empty());

        if is_html(&description) {
            if description_html.is_none() {
                description_html = Some(description.clone());
            }
            description.clear();
        }

        if description.is_empty() {
            if let Some(html) = &description_html {
                description = remove_html_tags(html);
            }
        }

        let link = link
            .map(|link| link.trim().to_string())
            .filter(|link| !link.is_empty());

        let guid = match guid.map(|guid| guid.trim().to_string()).filter(|g| !g.is_empty()) {
            Some(guid) => guid,
            None => match &link {
                Some(link) => link.clone(),
                None => {
                    let urls: HashSet<&str> =
                        enclosures.iter().map(|enclosure| enclosure.url.as_str()).collect();
                    if urls.len() != 1 {
                        return None;
                    }
                    enclosures[0].url.clone()
                }
            },
        };

        let title = match title.map(|title| title.trim().to_string()).filter(|t| !t.is_empty()) {
            Some(title) => title,
            None => {
                if enclosures.len() != 1 {
                    return None;
                }
                let derived = file_basename_no_extension(&enclosures[0].url);
                if derived.is_empty() {
                    return None;
                }
                derived
            }
        };

        let link = match link {
            Some(link) => link,
            None if guid_is_permalink => normalize_feed_url(&guid).unwrap_or_default(),
            None => String::new(),
        };

        Some(Episode {
            title,
            link,
            guid,
            description,
            description_html,
            subtitle,
            published: published.unwrap_or(0),
            total_time: total_time.unwrap_or(0),
            season: season.unwrap_or(0),
            number,
            episode_type,
            explicit,
            payment_url,
            episode_art_url,
            transcript_url,
            chapters_json_url,
            enclosures,
            chapters: if chapters.is_empty() { None } else { Some(chapters) },
            persons,
            itunes_author,
        })
    }
}

/// Mutable state of one parse: the podcast under construction and the
/// episode currently open, plus the `xml:base` of every open element.
#[derive(Debug)]
pub struct Accumulator {
    url: String,
    max_episodes: usize,
    podcast: Podcast,
    draft: Option<EpisodeDraft>,
    bases: Vec<Option<String>>,
}

impl Accumulator {
    pub fn new(url: &str, max_episodes: usize) -> Self {
        Self {
            url: url.to_string(),
            max_episodes,
            podcast: Podcast::new(url),
            draft: None,
            bases: Vec::new(),
        }
    }

    /// Enters an element, resolving its `xml:base` against the enclosing base.
    pub fn enter_element(&mut self, xml_base: Option<&str>) {
        let base = xml_base.map(|base| join_url(self.base(), base.trim()));
        self.bases.push(base);
    }

    pub fn leave_element(&mut self) {
        self.bases.pop();
    }

    /// The innermost `xml:base` in scope, or the feed URL.
    pub fn base(&self) -> &str {
        self.bases
            .iter()
            .rev()
            .find_map(|base| base.as_deref())
            .unwrap_or(&self.url)
    }

    /// Resolves a reference against the current base and normalizes it.
    pub fn resolve(&self, reference: &str) -> Option<String> {
        resolve_url(self.base(), reference)
    }

    /// Joins a reference against the current base without normalizing it.
    pub fn join(&self, reference: &str) -> String {
        join_url(self.base(), reference)
    }

    pub fn podcast(&self) -> &Podcast {
        &self.podcast
    }

    pub fn podcast_mut(&mut self) -> &mut Podcast {
        &mut self.podcast
    }

    pub fn episode_mut(&mut self) -> Option<&mut EpisodeDraft> {
        self.draft.as_mut()
    }

    /// Starts a fresh episode draft.
    pub fn open_episode(&mut self) {
        if self.draft.is_some() {
            tracing::debug!("episode opened before the previous one closed");
            self.close_episode();
        }
        self.draft = Some(EpisodeDraft::new());
    }

    /// Validates the open draft and appends it to the podcast if it survives.
    /// A rejected draft is dropped here and nowhere else.
    pub fn close_episode(&mut self) {
        let Some(draft) = self.draft.take() else {
            return;
        };
        match draft.finish() {
            Some(episode) => self.podcast.episodes.push(episode),
            None => tracing::debug!("dropping episode without guid or title"),
        }
    }

    /// Orders episodes newest first (oldest first for serial shows) and
    /// applies the episode limit.
    pub fn finish_podcast(&mut self) {
        let episodes = &mut self.podcast.episodes;
        if self.podcast.podcast_type == Some(PodcastType::Serial) {
            episodes.sort_by_key(|episode| episode.published);
        } else {
            episodes.sort_by(|a, b| b.published.cmp(&a.published));
        }
        if self.max_episodes > 0 {
            episodes.truncate(self.max_episodes);
        }
    }

    pub fn into_podcast(self) -> Podcast {
        self.podcast
    }
}

// ABOUTME: Element handlers and the canonical-path registry that selects them.
// ABOUTME: Each handler reacts to element open (attributes) and close (buffered text).

use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};

use crate::accumulator::{is_set, write_text, Accumulator, EpisodeDraft};
use crate::attributes::Attributes;
use crate::duration_parse::parse_time;
use crate::html_utils::{is_html, squash_whitespace, squash_whitespace_not_nl};
use crate::itunes_ext::{
    parse_episode_number, parse_episode_type, parse_explicit, parse_keywords, parse_podcast_type,
    parse_season,
};
use crate::media_utils::{parse_length, parse_type};
use crate::models::{Chapter, Enclosure, ItunesOwner, Person, Podcast};
use crate::time_parse::parse_pubdate;

/// Chapter format versions known to be compatible.
const SUPPORTED_CHAPTER_VERSIONS: &[&str] = &["1.1", "1.2"];

/// Normalization applied to element text before it is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextFilter {
    Trim,
    Squash,
    SquashKeepNewlines,
}

impl TextFilter {
    pub fn apply(self, text: &str) -> String {
        match self {
            TextFilter::Trim => text.trim().to_string(),
            TextFilter::Squash => squash_whitespace(text),
            TextFilter::SquashKeepNewlines => squash_whitespace_not_nl(text),
        }
    }
}

/// Optional text fields of the podcast record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PodcastField {
    Link,
    Description,
    CoverUrl,
    Language,
    Generator,
    FundingUrl,
    NewUrl,
    ItunesAuthor,
}

impl PodcastField {
    fn slot(self, podcast: &mut Podcast) -> &mut Option<String> {
        match self {
            PodcastField::Link => &mut podcast.link,
            PodcastField::Description => &mut podcast.description,
            PodcastField::CoverUrl => &mut podcast.cover_url,
            PodcastField::Language => &mut podcast.language,
            PodcastField::Generator => &mut podcast.generator,
            PodcastField::FundingUrl => &mut podcast.funding_url,
            PodcastField::NewUrl => &mut podcast.new_url,
            PodcastField::ItunesAuthor => &mut podcast.itunes_author,
        }
    }
}

/// Boolean podcast fields fed by the explicit-flag vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PodcastFlag {
    Explicit,
    ImportProhibited,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnerField {
    Name,
    Email,
}

/// Optional text fields of an episode draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EpisodeField {
    Title,
    Guid,
    Link,
    Description,
    DescriptionHtml,
    Subtitle,
    ItunesAuthor,
    EpisodeArtUrl,
    TranscriptUrl,
    ChaptersJsonUrl,
}

impl EpisodeField {
    fn slot(self, draft: &mut EpisodeDraft) -> &mut Option<String> {
        match self {
            EpisodeField::Title => &mut draft.title,
            EpisodeField::Guid => &mut draft.guid,
            EpisodeField::Link => &mut draft.link,
            EpisodeField::Description => &mut draft.description,
            EpisodeField::DescriptionHtml => &mut draft.description_html,
            EpisodeField::Subtitle => &mut draft.subtitle,
            EpisodeField::ItunesAuthor => &mut draft.itunes_author,
            EpisodeField::EpisodeArtUrl => &mut draft.episode_art_url,
            EpisodeField::TranscriptUrl => &mut draft.transcript_url,
            EpisodeField::ChaptersJsonUrl => &mut draft.chapters_json_url,
        }
    }
}

/// What to do when a particular element opens and closes.
///
/// Handlers are shared by every element on the same path, so they carry
/// configuration only. Anything that must survive from open to close lives
/// on the [`Accumulator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handler {
    /// `rss` itself; present so that it counts as a feed root.
    Root,
    /// The channel or Atom feed element: orders and trims episodes on close.
    PodcastRoot,
    PodcastTitle,
    PodcastText {
        field: PodcastField,
        filter: TextFilter,
        overwrite: bool,
    },
    /// Element text is a URL relative to the current base.
    PodcastUrlText { field: PodcastField },
    /// An attribute holds a URL relative to the current base.
    PodcastUrlAttr {
        field: PodcastField,
        attribute: &'static str,
    },
    PodcastFlag(PodcastFlag),
    PodcastType,
    PodcastKeywords,
    PodcastAtomLink,
    ItunesCategory,
    ItunesSubcategory,
    ItunesOwner,
    ItunesOwnerField(OwnerField),
    Episode,
    EpisodeGuid,
    EpisodeText {
        field: EpisodeField,
        filter: TextFilter,
        overwrite: bool,
    },
    EpisodeUrlText { field: EpisodeField },
    EpisodeUrlAttr {
        field: EpisodeField,
        attribute: &'static str,
    },
    /// RSS `item/description`, which may be plain text or HTML.
    ItemDescription,
    AtomContent,
    EpisodeDuration,
    EpisodePublished { overwrite: bool },
    EpisodeAtomLink,
    EpisodeExplicit,
    EpisodeSeason,
    EpisodeNumber,
    EpisodeType,
    Enclosure { size_attribute: &'static str },
    Chapters,
    Chapter,
    Person,
}

impl Handler {
    /// Whether character data inside the element must be buffered for `on_close`.
    pub fn wants_text(&self) -> bool {
        matches!(
            self,
            Handler::PodcastTitle
                | Handler::PodcastText { .. }
                | Handler::PodcastUrlText { .. }
                | Handler::PodcastFlag(_)
                | Handler::PodcastType
                | Handler::PodcastKeywords
                | Handler::ItunesOwnerField(_)
                | Handler::EpisodeGuid
                | Handler::EpisodeText { .. }
                | Handler::EpisodeUrlText { .. }
                | Handler::ItemDescription
                | Handler::AtomContent
                | Handler::EpisodeDuration
                | Handler::EpisodePublished { .. }
                | Handler::EpisodeExplicit
                | Handler::EpisodeSeason
                | Handler::EpisodeNumber
                | Handler::EpisodeType
                | Handler::Person
        )
    }

    pub fn on_open(&self, acc: &mut Accumulator, attrs: &Attributes) {
        match *self {
            Handler::PodcastUrlAttr { field, attribute } => {
                if let Some(url) = url_attribute(acc, attrs, attribute) {
                    *field.slot(acc.podcast_mut()) = Some(url);
                }
            }
            Handler::PodcastAtomLink => podcast_atom_link(acc, attrs),
            Handler::ItunesCategory => {
                let text = attrs.get("text").unwrap_or("").trim().to_string();
                acc.podcast_mut().itunes_categories.push(vec![text]);
            }
            Handler::ItunesSubcategory => {
                let Some(text) = attrs.get("text").filter(|text| !text.is_empty()) else {
                    return;
                };
                match acc.podcast_mut().itunes_categories.last_mut() {
                    Some(row) => row.push(text.trim().to_string()),
                    None => tracing::debug!(category = %text, "subcategory without a parent category"),
                }
            }
            Handler::ItunesOwner => {
                acc.podcast_mut().itunes_owner = Some(ItunesOwner::default());
            }
            Handler::Episode => acc.open_episode(),
            Handler::EpisodeGuid => {
                let permalink = attrs
                    .get("isPermaLink")
                    .map_or(true, |value| value.eq_ignore_ascii_case("true"));
                if let Some(draft) = acc.episode_mut() {
                    draft.guid_is_permalink = permalink;
                }
            }
            Handler::EpisodeUrlAttr { field, attribute } => {
                let url = url_attribute(acc, attrs, attribute);
                if let (Some(url), Some(draft)) = (url, acc.episode_mut()) {
                    *field.slot(draft) = Some(url);
                }
            }
            Handler::AtomContent => {
                let content_type = attrs.get("type").unwrap_or("text").to_string();
                if let Some(draft) = acc.episode_mut() {
                    draft.atom_content_type = Some(content_type);
                }
            }
            Handler::EpisodeAtomLink => episode_atom_link(acc, attrs),
            Handler::Enclosure { size_attribute } => {
                let Some(url) = attrs.get("url") else {
                    return;
                };
                let Some(url) = acc.resolve(url) else {
                    tracing::debug!(url = %url, "skipping enclosure with unusable URL");
                    return;
                };
                let enclosure = Enclosure {
                    url,
                    file_size: parse_length(attrs.get(size_attribute)),
                    mime_type: parse_type(attrs.get("type")),
                };
                if let Some(draft) = acc.episode_mut() {
                    draft.enclosures.push(enclosure);
                }
            }
            Handler::Chapters => {
                let version = attrs.get("version").unwrap_or("1.1");
                if !SUPPORTED_CHAPTER_VERSIONS.contains(&version) {
                    tracing::warn!(version = %version, "possibly incompatible chapters version");
                }
            }
            Handler::Chapter => chapter(acc, attrs),
            Handler::Person => person(acc, attrs),
            _ => {}
        }
    }

    pub fn on_close(&self, acc: &mut Accumulator, text: &str) {
        match *self {
            Handler::PodcastRoot => acc.finish_podcast(),
            Handler::PodcastTitle => {
                let title = squash_whitespace(text);
                if !title.is_empty() {
                    acc.podcast_mut().title = title;
                }
            }
            Handler::PodcastText {
                field,
                filter,
                overwrite,
            } => {
                write_text(field.slot(acc.podcast_mut()), filter.apply(text), overwrite);
            }
            Handler::PodcastUrlText { field } => {
                if let Some(url) = acc.resolve(text) {
                    *field.slot(acc.podcast_mut()) = Some(url);
                }
            }
            Handler::PodcastFlag(flag) => {
                let Some(value) = parse_explicit(&squash_whitespace(text)) else {
                    return;
                };
                let podcast = acc.podcast_mut();
                match flag {
                    PodcastFlag::Explicit => podcast.explicit = Some(value),
                    PodcastFlag::ImportProhibited => podcast.import_prohibited = Some(value),
                }
            }
            Handler::PodcastType => {
                if let Some(podcast_type) = parse_podcast_type(&squash_whitespace(text)) {
                    acc.podcast_mut().podcast_type = Some(podcast_type);
                }
            }
            Handler::PodcastKeywords => {
                let keywords = parse_keywords(&squash_whitespace(text));
                if !keywords.is_empty() {
                    acc.podcast_mut().itunes_keywords = Some(keywords);
                }
            }
            Handler::ItunesOwnerField(field) => {
                let value = squash_whitespace(text);
                let owner = acc.podcast_mut().itunes_owner.get_or_insert_with(ItunesOwner::default);
                match field {
                    OwnerField::Name => owner.name = Some(value),
                    OwnerField::Email => owner.email = Some(value),
                }
            }
            Handler::Episode => acc.close_episode(),
            Handler::EpisodeGuid => {
                let guid = text.trim();
                let permalink = acc.episode_mut().is_some_and(|draft| draft.guid_is_permalink);
                let guid = if permalink && !guid.is_empty() {
                    acc.join(guid)
                } else {
                    guid.to_string()
                };
                if let Some(draft) = acc.episode_mut() {
                    write_text(&mut draft.guid, guid, true);
                }
            }
            Handler::EpisodeText {
                field,
                filter,
                overwrite,
            } => {
                if let Some(draft) = acc.episode_mut() {
                    write_text(field.slot(draft), filter.apply(text), overwrite);
                }
            }
            Handler::EpisodeUrlText { field } => {
                let url = acc.resolve(text);
                if let (Some(url), Some(draft)) = (url, acc.episode_mut()) {
                    write_text(field.slot(draft), url, true);
                }
            }
            Handler::ItemDescription => {
                let Some(draft) = acc.episode_mut() else {
                    return;
                };
                if is_html(text) {
                    if !is_set(&draft.description_html) {
                        draft.description_html = Some(text.trim().to_string());
                    }
                } else if !is_set(&draft.description) {
                    draft.description = Some(squash_whitespace_not_nl(text));
                }
            }
            Handler::AtomContent => {
                let Some(draft) = acc.episode_mut() else {
                    return;
                };
                match draft.atom_content_type.take().as_deref() {
                    Some("html") => draft.description_html = Some(text.to_string()),
                    Some("text") => draft.description = Some(squash_whitespace_not_nl(text)),
                    other => tracing::debug!(content_type = ?other, "ignoring atom content"),
                }
            }
            Handler::EpisodeDuration => {
                if let Some(draft) = acc.episode_mut() {
                    draft.total_time = Some(parse_time(text));
                }
            }
            Handler::EpisodePublished { overwrite } => {
                let Some(draft) = acc.episode_mut() else {
                    return;
                };
                if !overwrite && draft.published.is_some_and(|published| published != 0) {
                    return;
                }
                draft.published = Some(parse_pubdate(text));
            }
            Handler::EpisodeExplicit => {
                let value = parse_explicit(&squash_whitespace(text));
                if let (Some(value), Some(draft)) = (value, acc.episode_mut()) {
                    draft.explicit = Some(value);
                }
            }
            Handler::EpisodeSeason => {
                if let Some(draft) = acc.episode_mut() {
                    draft.season = Some(parse_season(text));
                }
            }
            Handler::EpisodeNumber => {
                let number = parse_episode_number(&squash_whitespace(text));
                if let (Some(number), Some(draft)) = (number, acc.episode_mut()) {
                    draft.number = Some(number);
                }
            }
            Handler::EpisodeType => {
                let episode_type = parse_episode_type(&squash_whitespace(text));
                if let (Some(episode_type), Some(draft)) = (episode_type, acc.episode_mut()) {
                    draft.episode_type = Some(episode_type);
                }
            }
            Handler::Person => {
                let name = text.trim().to_string();
                let person = acc
                    .episode_mut()
                    .and_then(|draft| draft.persons.as_mut())
                    .and_then(|persons| persons.last_mut());
                if let Some(person) = person {
                    person.name = name;
                }
            }
            _ => {}
        }
    }
}

/// Reads a URL attribute and resolves it against the current base.
fn url_attribute(acc: &Accumulator, attrs: &Attributes, attribute: &str) -> Option<String> {
    attrs
        .get(attribute)
        .filter(|value| !value.is_empty())
        .and_then(|value| acc.resolve(value))
}

/// Atom links on the feed: paged-feed relations (RFC 5005), payment, and the
/// HTML page of the show.
fn podcast_atom_link(acc: &mut Accumulator, attrs: &Attributes) {
    let rel = attrs.get("rel").unwrap_or("alternate");
    let Some(url) = url_attribute(acc, attrs, "href") else {
        return;
    };
    let mime_type = parse_type(attrs.get("type"));
    let podcast = acc.podcast_mut();

    match rel {
        "first" => podcast.paged_feed_first = Some(url),
        "next" => podcast.paged_feed_next = Some(url),
        "payment" => podcast.payment_url = Some(url),
        "self" | "alternate" if mime_type == "text/html" => podcast.link = Some(url),
        _ => {}
    }
}

/// Atom links on an episode: enclosures, payment, and the episode web page.
fn episode_atom_link(acc: &mut Accumulator, attrs: &Attributes) {
    let rel = attrs.get("rel").unwrap_or("alternate");
    let Some(url) = url_attribute(acc, attrs, "href") else {
        return;
    };
    let mime_type = parse_type(Some(attrs.get("type").unwrap_or("text/html")));
    let file_size = parse_length(Some(attrs.get("length").unwrap_or("0")));
    let Some(draft) = acc.episode_mut() else {
        return;
    };

    match rel {
        "enclosure" => draft.enclosures.push(Enclosure {
            url,
            file_size,
            mime_type,
        }),
        "payment" => draft.payment_url = Some(url),
        "self" | "alternate" if mime_type == "text/html" => {
            if !is_set(&draft.link) {
                draft.link = Some(url);
            }
        }
        _ => {}
    }
}

/// A Podlove Simple Chapters entry. `start` and `title` are mandatory.
fn chapter(acc: &mut Accumulator, attrs: &Attributes) {
    let (Some(start), Some(title)) = (attrs.get("start"), attrs.get("title")) else {
        tracing::warn!("invalid chapter (missing start and/or title)");
        return;
    };
    let chapter = Chapter {
        start: parse_time(start),
        title: title.to_string(),
        href: url_attribute(acc, attrs, "href"),
        image: url_attribute(acc, attrs, "image"),
    };
    if let Some(draft) = acc.episode_mut() {
        draft.chapters.push(chapter);
    }
}

/// A `podcast:person` entry; the name arrives with the element text.
fn person(acc: &mut Accumulator, attrs: &Attributes) {
    let mut person = Person::default();
    if let Some(role) = attrs.get("role").filter(|role| !role.is_empty()) {
        person.role = role.to_lowercase();
    }
    if let Some(group) = attrs.get("group").filter(|group| !group.is_empty()) {
        person.group = group.to_lowercase();
    }
    person.href = url_attribute(acc, attrs, "href");
    person.img = url_attribute(acc, attrs, "img");

    if let Some(draft) = acc.episode_mut() {
        draft.persons.get_or_insert_with(Vec::new).push(person);
    }
}

static REGISTRY: Lazy<HashMap<&'static str, Handler>> = Lazy::new(|| {
    use TextFilter::{Squash, SquashKeepNewlines, Trim};

    let podcast_text = |field, filter, overwrite| Handler::PodcastText {
        field,
        filter,
        overwrite,
    };
    let episode_text = |field, filter, overwrite| Handler::EpisodeText {
        field,
        filter,
        overwrite,
    };

    HashMap::from([
        ("rss", Handler::Root),
        ("rss/channel", Handler::PodcastRoot),
        ("rss/channel/title", Handler::PodcastTitle),
        (
            "rss/channel/link",
            Handler::PodcastUrlText {
                field: PodcastField::Link,
            },
        ),
        (
            "rss/channel/description",
            podcast_text(PodcastField::Description, SquashKeepNewlines, true),
        ),
        (
            "rss/channel/itunes:summary",
            podcast_text(PodcastField::Description, SquashKeepNewlines, false),
        ),
        (
            "rss/channel/podcast:funding",
            Handler::PodcastUrlAttr {
                field: PodcastField::FundingUrl,
                attribute: "url",
            },
        ),
        (
            "rss/channel/podcast:locked",
            Handler::PodcastFlag(PodcastFlag::ImportProhibited),
        ),
        (
            "rss/channel/image/url",
            Handler::PodcastUrlText {
                field: PodcastField::CoverUrl,
            },
        ),
        (
            "rss/channel/itunes:image",
            Handler::PodcastUrlAttr {
                field: PodcastField::CoverUrl,
                attribute: "href",
            },
        ),
        ("rss/channel/itunes:type", Handler::PodcastType),
        ("rss/channel/atom:link", Handler::PodcastAtomLink),
        (
            "rss/channel/generator",
            podcast_text(PodcastField::Generator, Squash, true),
        ),
        (
            "rss/channel/language",
            podcast_text(PodcastField::Language, Squash, true),
        ),
        ("rss/channel/itunes:category", Handler::ItunesCategory),
        (
            "rss/channel/itunes:category/itunes:category",
            Handler::ItunesSubcategory,
        ),
        (
            "rss/channel/itunes:category/itunes:category/itunes:category",
            Handler::ItunesSubcategory,
        ),
        (
            "rss/channel/itunes:author",
            podcast_text(PodcastField::ItunesAuthor, Squash, true),
        ),
        ("rss/channel/itunes:owner", Handler::ItunesOwner),
        (
            "rss/channel/itunes:owner/itunes:name",
            Handler::ItunesOwnerField(OwnerField::Name),
        ),
        (
            "rss/channel/itunes:owner/itunes:email",
            Handler::ItunesOwnerField(OwnerField::Email),
        ),
        (
            "rss/channel/itunes:explicit",
            Handler::PodcastFlag(PodcastFlag::Explicit),
        ),
        (
            "rss/channel/itunes:new-feed-url",
            Handler::PodcastUrlText {
                field: PodcastField::NewUrl,
            },
        ),
        (
            "rss/redirect/newLocation",
            Handler::PodcastUrlText {
                field: PodcastField::NewUrl,
            },
        ),
        ("rss/channel/itunes:keywords", Handler::PodcastKeywords),
        // RSS items
        ("rss/channel/item", Handler::Episode),
        ("rss/channel/item/guid", Handler::EpisodeGuid),
        (
            "rss/channel/item/title",
            episode_text(EpisodeField::Title, Squash, true),
        ),
        (
            "rss/channel/item/link",
            Handler::EpisodeUrlText {
                field: EpisodeField::Link,
            },
        ),
        ("rss/channel/item/description", Handler::ItemDescription),
        (
            "rss/channel/item/itunes:summary",
            episode_text(EpisodeField::Description, SquashKeepNewlines, true),
        ),
        (
            "rss/channel/item/media:description",
            episode_text(EpisodeField::Description, SquashKeepNewlines, true),
        ),
        (
            "rss/channel/item/itunes:subtitle",
            episode_text(EpisodeField::Subtitle, Squash, true),
        ),
        (
            "rss/channel/item/content:encoded",
            episode_text(EpisodeField::DescriptionHtml, Trim, true),
        ),
        ("rss/channel/item/itunes:duration", Handler::EpisodeDuration),
        (
            "rss/channel/item/pubDate",
            Handler::EpisodePublished { overwrite: true },
        ),
        ("rss/channel/item/atom:link", Handler::EpisodeAtomLink),
        ("rss/channel/item/itunes:explicit", Handler::EpisodeExplicit),
        (
            "rss/channel/item/itunes:author",
            episode_text(EpisodeField::ItunesAuthor, Squash, true),
        ),
        ("rss/channel/item/itunes:season", Handler::EpisodeSeason),
        ("rss/channel/item/itunes:episode", Handler::EpisodeNumber),
        ("rss/channel/item/itunes:episodeType", Handler::EpisodeType),
        (
            "rss/channel/item/itunes:image",
            Handler::EpisodeUrlAttr {
                field: EpisodeField::EpisodeArtUrl,
                attribute: "href",
            },
        ),
        (
            "rss/channel/item/media:thumbnail",
            Handler::EpisodeUrlAttr {
                field: EpisodeField::EpisodeArtUrl,
                attribute: "url",
            },
        ),
        (
            "rss/channel/item/media:group/media:thumbnail",
            Handler::EpisodeUrlAttr {
                field: EpisodeField::EpisodeArtUrl,
                attribute: "url",
            },
        ),
        (
            "rss/channel/item/media:content",
            Handler::Enclosure {
                size_attribute: "fileSize",
            },
        ),
        (
            "rss/channel/item/media:group/media:content",
            Handler::Enclosure {
                size_attribute: "fileSize",
            },
        ),
        (
            "rss/channel/item/enclosure",
            Handler::Enclosure {
                size_attribute: "length",
            },
        ),
        ("rss/channel/item/psc:chapters", Handler::Chapters),
        ("rss/channel/item/psc:chapters/psc:chapter", Handler::Chapter),
        (
            "rss/channel/item/podcast:transcript",
            Handler::EpisodeUrlAttr {
                field: EpisodeField::TranscriptUrl,
                attribute: "url",
            },
        ),
        (
            "rss/channel/item/podcast:chapters",
            Handler::EpisodeUrlAttr {
                field: EpisodeField::ChaptersJsonUrl,
                attribute: "url",
            },
        ),
        ("rss/channel/item/podcast:person", Handler::Person),
        // Atom
        ("atom:feed", Handler::PodcastRoot),
        ("atom:feed/atom:title", Handler::PodcastTitle),
        (
            "atom:feed/atom:subtitle",
            podcast_text(PodcastField::Description, SquashKeepNewlines, true),
        ),
        (
            "atom:feed/atom:icon",
            Handler::PodcastUrlText {
                field: PodcastField::CoverUrl,
            },
        ),
        ("atom:feed/atom:link", Handler::PodcastAtomLink),
        ("atom:feed/atom:entry", Handler::Episode),
        (
            "atom:feed/atom:entry/atom:id",
            episode_text(EpisodeField::Guid, Trim, true),
        ),
        (
            "atom:feed/atom:entry/atom:title",
            episode_text(EpisodeField::Title, Squash, true),
        ),
        ("atom:feed/atom:entry/atom:link", Handler::EpisodeAtomLink),
        ("atom:feed/atom:entry/atom:content", Handler::AtomContent),
        (
            "atom:feed/atom:entry/content:encoded",
            episode_text(EpisodeField::DescriptionHtml, Trim, true),
        ),
        (
            "atom:feed/atom:entry/atom:published",
            Handler::EpisodePublished { overwrite: true },
        ),
        (
            "atom:feed/atom:entry/atom:updated",
            Handler::EpisodePublished { overwrite: false },
        ),
        (
            "atom:feed/atom:entry/media:group/media:description",
            episode_text(EpisodeField::Description, SquashKeepNewlines, true),
        ),
        (
            "atom:feed/atom:entry/media:thumbnail",
            Handler::EpisodeUrlAttr {
                field: EpisodeField::EpisodeArtUrl,
                attribute: "url",
            },
        ),
        (
            "atom:feed/atom:entry/media:group/media:thumbnail",
            Handler::EpisodeUrlAttr {
                field: EpisodeField::EpisodeArtUrl,
                attribute: "url",
            },
        ),
        ("atom:feed/atom:entry/psc:chapters", Handler::Chapters),
        (
            "atom:feed/atom:entry/psc:chapters/psc:chapter",
            Handler::Chapter,
        ),
    ])
});

/// Root element names accepted for a feed: the first segment of every path.
static VALID_ROOTS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    REGISTRY
        .keys()
        .filter_map(|path| path.split('/').next())
        .collect()
});

/// Finds the handler registered for a canonical path such as
/// `rss/channel/item/itunes:duration`.
pub fn lookup(path: &str) -> Option<&'static Handler> {
    REGISTRY.get(path)
}

/// Whether a canonical element name may appear as the document root.
pub fn is_valid_root(name: &str) -> bool {
    VALID_ROOTS.contains(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs(pairs: &[(&str, &str)]) -> Attributes {
        pairs.iter().copied().collect()
    }

    fn with_episode() -> Accumulator {
        let mut acc = Accumulator::new("http://example.com/feed.xml", 0);
        Handler::Episode.on_open(&mut acc, &Attributes::new());
        acc
    }

    #[test]
    fn test_valid_roots() {
        assert!(is_valid_root("rss"));
        assert!(is_valid_root("atom:feed"));
        assert!(!is_valid_root("html"));
        assert!(!is_valid_root("channel"));
    }

    #[test]
    fn test_lookup() {
        assert_eq!(
            lookup("rss/channel/item/itunes:duration"),
            Some(&Handler::EpisodeDuration)
        );
        assert!(lookup("rss/channel/item/!x:duration").is_none());
    }

    #[test]
    fn test_enclosure_requires_url() {
        let mut acc = with_episode();
        let handler = Handler::Enclosure {
            size_attribute: "length",
        };
        handler.on_open(&mut acc, &attrs(&[("length", "100")]));
        handler.on_open(
            &mut acc,
            &attrs(&[("url", " media/1.mp3"), ("length", "100"), ("type", "audio/mpeg")]),
        );
        let draft = acc.episode_mut().unwrap();
        assert_eq!(
            draft.enclosures,
            vec![Enclosure {
                url: "http://example.com/media/1.mp3".to_string(),
                file_size: 100,
                mime_type: "audio/mpeg".to_string(),
            }]
        );
    }

    #[test]
    fn test_episode_atom_link_relations() {
        let mut acc = with_episode();
        let handler = Handler::EpisodeAtomLink;
        handler.on_open(&mut acc, &attrs(&[("href", "http://example.com/page")]));
        handler.on_open(&mut acc, &attrs(&[("rel", "alternate"), ("href", "http://example.com/other")]));
        handler.on_open(&mut acc, &attrs(&[("rel", "payment"), ("href", "https://pay.example.com/")]));
        handler.on_open(
            &mut acc,
            &attrs(&[
                ("rel", "enclosure"),
                ("href", "http://example.com/a.ogg"),
                ("type", "audio/ogg"),
            ]),
        );
        let draft = acc.episode_mut().unwrap();
        assert_eq!(draft.link.as_deref(), Some("http://example.com/page"));
        assert_eq!(draft.payment_url.as_deref(), Some("https://pay.example.com/"));
        assert_eq!(draft.enclosures.len(), 1);
        assert_eq!(draft.enclosures[0].file_size, -1);
        assert_eq!(draft.enclosures[0].mime_type, "audio/ogg");
    }

    #[test]
    fn test_podcast_atom_link_relations() {
        let mut acc = Accumulator::new("http://example.com/feed.xml", 0);
        let handler = Handler::PodcastAtomLink;
        handler.on_open(&mut acc, &attrs(&[("rel", "self"), ("href", "http://example.com/feed.xml")]));
        handler.on_open(&mut acc, &attrs(&[("rel", "next"), ("href", "?page=2")]));
        handler.on_open(
            &mut acc,
            &attrs(&[("rel", "alternate"), ("type", "text/html"), ("href", "http://example.com/")]),
        );
        let podcast = acc.podcast();
        assert_eq!(podcast.link.as_deref(), Some("http://example.com/"));
        assert_eq!(
            podcast.paged_feed_next.as_deref(),
            Some("http://example.com/feed.xml?page=2")
        );
    }

    #[test]
    fn test_guid_permalink_is_resolved() {
        let mut acc = with_episode();
        let handler = Handler::EpisodeGuid;
        handler.on_open(&mut acc, &Attributes::new());
        handler.on_close(&mut acc, " episode/2/ ");
        let draft = acc.episode_mut().unwrap();
        assert!(draft.guid_is_permalink);
        assert_eq!(draft.guid.as_deref(), Some("http://example.com/episode/2/"));
    }

    #[test]
    fn test_guid_not_permalink_is_kept_verbatim() {
        let mut acc = with_episode();
        let handler = Handler::EpisodeGuid;
        handler.on_open(&mut acc, &attrs(&[("isPermaLink", "false")]));
        handler.on_close(&mut acc, "example-episode-12345");
        let draft = acc.episode_mut().unwrap();
        assert!(!draft.guid_is_permalink);
        assert_eq!(draft.guid.as_deref(), Some("example-episode-12345"));
    }

    #[test]
    fn test_item_description_heuristic() {
        let mut acc = with_episode();
        Handler::ItemDescription.on_close(&mut acc, "  <p>Rich</p>  ");
        Handler::ItemDescription.on_close(&mut acc, "plain   text");
        Handler::ItemDescription.on_close(&mut acc, "ignored plain");
        let draft = acc.episode_mut().unwrap();
        assert_eq!(draft.description_html.as_deref(), Some("<p>Rich</p>"));
        assert_eq!(draft.description.as_deref(), Some("plain text"));
    }

    #[test]
    fn test_summary_does_not_override_description() {
        let mut acc = Accumulator::new("http://example.com/feed.xml", 0);
        lookup("rss/channel/description")
            .unwrap()
            .on_close(&mut acc, "Some  description");
        lookup("rss/channel/itunes:summary")
            .unwrap()
            .on_close(&mut acc, "Summary");
        assert_eq!(acc.podcast().description.as_deref(), Some("Some description"));
    }

    #[test]
    fn test_chapter_requires_start_and_title() {
        let mut acc = with_episode();
        Handler::Chapter.on_open(&mut acc, &attrs(&[("start", "00:01")]));
        Handler::Chapter.on_open(
            &mut acc,
            &attrs(&[("start", "00:01:30.5"), ("title", "Intro"), ("href", "")]),
        );
        let draft = acc.episode_mut().unwrap();
        assert_eq!(
            draft.chapters,
            vec![Chapter {
                start: 90,
                title: "Intro".to_string(),
                href: None,
                image: None,
            }]
        );
    }

    #[test]
    fn test_person_defaults_and_name() {
        let mut acc = with_episode();
        Handler::Person.on_open(&mut acc, &attrs(&[("role", "Guest"), ("img", "/p.png")]));
        Handler::Person.on_close(&mut acc, " Jane Doe ");
        let persons = acc.episode_mut().unwrap().persons.clone().unwrap();
        assert_eq!(persons.len(), 1);
        assert_eq!(persons[0].name, "Jane Doe");
        assert_eq!(persons[0].role, "guest");
        assert_eq!(persons[0].group, "cast");
        assert_eq!(persons[0].img.as_deref(), Some("http://example.com/p.png"));
    }

    #[test]
    fn test_categories() {
        let mut acc = Accumulator::new("http://example.com/feed.xml", 0);
        Handler::ItunesCategory.on_open(&mut acc, &attrs(&[("text", "Technology")]));
        Handler::ItunesSubcategory.on_open(&mut acc, &attrs(&[("text", "Podcasting")]));
        Handler::ItunesCategory.on_open(&mut acc, &Attributes::new());
        Handler::ItunesSubcategory.on_open(&mut acc, &attrs(&[("text", "")]));
        assert_eq!(
            acc.podcast().itunes_categories,
            vec![
                vec!["Technology".to_string(), "Podcasting".to_string()],
                vec![String::new()],
            ]
        );
    }

    #[test]
    fn test_updated_does_not_override_published() {
        let mut acc = with_episode();
        lookup("atom:feed/atom:entry/atom:published")
            .unwrap()
            .on_close(&mut acc, "2003-12-13T18:30:02Z");
        lookup("atom:feed/atom:entry/atom:updated")
            .unwrap()
            .on_close(&mut acc, "2004-12-13T18:30:02Z");
        assert_eq!(acc.episode_mut().unwrap().published, Some(1071340202));
    }
}

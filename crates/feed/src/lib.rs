// ABOUTME: Streaming podcast feed parser for RSS 2.0, Atom, and podcast namespace extensions.
// ABOUTME: Turns a feed document into one normalized Podcast record with validated episodes.

pub mod accumulator;
pub mod attributes;
pub mod dispatch;
pub mod duration_parse;
pub mod error;
pub mod handlers;
pub mod html_utils;
pub mod itunes_ext;
pub mod media_utils;
pub mod models;
pub mod namespace;
pub mod options;
pub mod parser;
pub mod time_parse;
pub mod url_utils;

pub use duration_parse::parse_time;
pub use error::FeedParseError;
pub use html_utils::{is_html, remove_html_tags, squash_whitespace, squash_whitespace_not_nl};
pub use media_utils::{parse_length, parse_type};
pub use models::{
    Chapter, Enclosure, Episode, EpisodeType, ItunesOwner, Person, Podcast, PodcastType,
};
pub use options::ParseOptions;
pub use parser::{parse, parse_bytes, parse_str, parse_with_options};
pub use time_parse::parse_pubdate;
pub use url_utils::{file_basename_no_extension, normalize_feed_url};

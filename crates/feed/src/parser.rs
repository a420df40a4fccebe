// ABOUTME: Streaming podcast feed parser driving quick-xml events through the dispatcher.
// ABOUTME: Wires namespace resolution, path dispatch, and accumulation into the public parse entry points.

use std::borrow::Cow;
use std::io::{BufReader, Read};

use quick_xml::escape::{resolve_predefined_entity, unescape_with};
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::accumulator::Accumulator;
use crate::attributes::Attributes;
use crate::dispatch::PathDispatcher;
use crate::error::FeedParseError;
use crate::html_utils::{decode_entities, html_entity};
use crate::models::Podcast;
use crate::namespace::NamespaceResolver;
use crate::options::ParseOptions;

/// Parses a podcast feed from a stream.
///
/// # Arguments
/// * `url` - The URL of the feed; relative links resolve against it and the
///   podcast title falls back to its basename
/// * `stream` - The feed document, read forward exactly once
/// * `max_episodes` - Keep at most this many episodes; 0 keeps all
///
/// # Returns
/// * `Ok(Podcast)` - The normalized record
/// * `Err(FeedParseError)` - The document is not well-formed XML, its root is
///   not `rss` or an Atom `feed`, or the stream failed
pub fn parse<R: Read>(url: &str, stream: R, max_episodes: usize) -> Result<Podcast, FeedParseError> {
    parse_with_options(url, stream, &ParseOptions::new().max_episodes(max_episodes))
}

/// Parses a podcast feed from a stream with explicit options.
pub fn parse_with_options<R: Read>(
    url: &str,
    stream: R,
    options: &ParseOptions,
) -> Result<Podcast, FeedParseError> {
    let mut reader = Reader::from_reader(BufReader::new(stream));
    reader.config_mut().trim_text(false);
    reader.config_mut().expand_empty_elements = true;

    let mut handler = FeedHandler::new(url, options.max_episodes);
    let mut buf = Vec::new();

    loop {
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|err| FeedParseError::from_xml(err, reader.error_position()))?;

        match event {
            Event::Start(ref e) => {
                let position = reader.buffer_position();
                let qname = decode(&reader, e.name().as_ref()).into_owned();
                let attrs = collect_attributes(&reader, e)?;
                handler.start_element(&qname, &attrs, position)?;
            }
            Event::End(_) => handler.end_element(),
            Event::Text(ref e) => handler.characters(&decode(&reader, e)),
            Event::CData(ref e) => handler.characters(&decode(&reader, e)),
            Event::GeneralRef(ref e) => {
                let name = decode(&reader, e);
                handler.characters(&resolve_reference(&name));
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    let podcast = handler.finish(reader.buffer_position())?;
    tracing::debug!(url = %url, episodes = podcast.episodes.len(), "parsed feed");
    Ok(podcast)
}

/// Parses an in-memory feed document.
pub fn parse_bytes(data: &[u8], url: &str) -> Result<Podcast, FeedParseError> {
    parse(url, data, 0)
}

/// Parses a feed document held in a string.
pub fn parse_str(text: &str, url: &str) -> Result<Podcast, FeedParseError> {
    parse_bytes(text.as_bytes(), url)
}

/// Glue between tokenizer callbacks and the three parsing stages.
struct FeedHandler {
    resolver: NamespaceResolver,
    dispatcher: PathDispatcher,
    acc: Accumulator,
    seen_root: bool,
}

impl FeedHandler {
    fn new(url: &str, max_episodes: usize) -> Self {
        Self {
            resolver: NamespaceResolver::new(),
            dispatcher: PathDispatcher::new(),
            acc: Accumulator::new(url, max_episodes),
            seen_root: false,
        }
    }

    fn start_element(
        &mut self,
        qname: &str,
        attrs: &Attributes,
        position: u64,
    ) -> Result<(), FeedParseError> {
        if self.seen_root && self.dispatcher.depth() == 0 {
            return Err(FeedParseError::syntax("junk after document element", position));
        }
        self.resolver.push_scope(attrs);
        let name = self.resolver.canonicalize(qname);
        if let Err(err) = self.dispatcher.open(name, attrs, &mut self.acc) {
            self.resolver.pop_scope();
            return Err(err.at(position));
        }
        self.seen_root = true;
        Ok(())
    }

    fn characters(&mut self, text: &str) {
        self.dispatcher.characters(text);
    }

    fn end_element(&mut self) {
        self.dispatcher.close(&mut self.acc);
        self.resolver.pop_scope();
    }

    fn finish(self, position: u64) -> Result<Podcast, FeedParseError> {
        if !self.seen_root {
            return Err(FeedParseError::syntax("no element found", position));
        }
        if self.dispatcher.depth() > 0 {
            return Err(FeedParseError::syntax(
                format!("unclosed element {}", self.dispatcher.current_path()),
                position,
            ));
        }
        Ok(self.acc.into_podcast())
    }
}

/// Decodes bytes with the document encoding, replacing invalid sequences.
fn decode<'b, R>(reader: &Reader<R>, bytes: &'b [u8]) -> Cow<'b, str> {
    match reader.decoder().decode(bytes) {
        Ok(text) => text,
        Err(_) => String::from_utf8_lossy(bytes),
    }
}

/// Collects the attributes of an element-open. Unquoted values and duplicate
/// names are not well-formed XML and abort the parse.
fn collect_attributes<R>(
    reader: &Reader<R>,
    start: &BytesStart,
) -> Result<Attributes, FeedParseError> {
    let mut attrs = Attributes::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|err| FeedParseError::syntax(err, reader.buffer_position()))?;
        let key = decode(reader, attr.key.as_ref()).into_owned();
        let raw = decode(reader, &attr.value);
        let value = match unescape_with(&raw, resolve_predefined_entity) {
            Ok(value) => value.into_owned(),
            Err(_) => decode_entities(&raw),
        };
        attrs.insert(key, value);
    }
    Ok(attrs)
}

/// Expands an entity or character reference appearing in text.
/// Unknown names are kept literally.
fn resolve_reference(name: &str) -> String {
    if let Some(code) = name.strip_prefix('#') {
        let parsed = match code.strip_prefix('x').or_else(|| code.strip_prefix('X')) {
            Some(hex) => u32::from_str_radix(hex, 16).ok(),
            None => code.parse::<u32>().ok(),
        };
        if let Some(c) = parsed.and_then(char::from_u32) {
            return c.to_string();
        }
    } else if let Some(value) = resolve_predefined_entity(name) {
        return value.to_string();
    } else if let Some(c) = html_entity(name) {
        return c.to_string();
    }
    tracing::debug!(reference = %name, "unresolved entity reference");
    format!("&{};", name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_reference() {
        assert_eq!(resolve_reference("amp"), "&");
        assert_eq!(resolve_reference("#38"), "&");
        assert_eq!(resolve_reference("#x26"), "&");
        assert_eq!(resolve_reference("eacute"), "é");
        assert_eq!(resolve_reference("custom"), "&custom;");
    }

    #[test]
    fn test_minimal_rss() {
        let podcast = parse_str(
            "<rss><channel><title>Show</title></channel></rss>",
            "http://example.com/feed.xml",
        )
        .unwrap();
        assert_eq!(podcast.title, "Show");
        assert!(podcast.episodes.is_empty());
    }

    #[test]
    fn test_empty_document() {
        let err = parse_str("", "http://example.com/feed.xml").unwrap_err();
        assert!(matches!(err, FeedParseError::Syntax { .. }));
    }

    #[test]
    fn test_unclosed_document() {
        let err = parse_str("<rss><channel>", "http://example.com/feed.xml").unwrap_err();
        assert!(matches!(err, FeedParseError::Syntax { .. }));
    }

    #[test]
    fn test_entities_in_text_and_attributes() {
        let podcast = parse_str(
            r#"<rss><channel><title>Tom &amp; Jerry&#33; &nbsp;</title>
            <itunes:image xmlns:itunes="http://www.itunes.com/dtds/podcast-1.0.dtd" href="http://example.com/a.png?x=1&amp;y=2"/>
            </channel></rss>"#,
            "http://example.com/feed.xml",
        )
        .unwrap();
        assert_eq!(podcast.title, "Tom & Jerry!");
        assert_eq!(
            podcast.cover_url.as_deref(),
            Some("http://example.com/a.png?x=1&y=2")
        );
    }

    #[test]
    fn test_io_error_is_reported() {
        struct Failing;
        impl Read for Failing {
            fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
                Err(std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset"))
            }
        }
        let err = parse("http://example.com/feed.xml", Failing, 0).unwrap_err();
        assert!(matches!(err, FeedParseError::Io { .. }));
    }
}

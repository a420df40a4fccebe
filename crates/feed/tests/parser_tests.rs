// ABOUTME: Integration tests for podcast feed parsing.
// ABOUTME: Covers RSS and Atom feeds, episode validation, ordering, namespaces, and error reporting.

use std::fs::File;
use std::io::Write;
use std::sync::{Arc, Mutex};

use podparse_feed::{
    parse, parse_str, parse_with_options, Chapter, Enclosure, EpisodeType, FeedParseError,
    ItunesOwner, ParseOptions, Podcast, PodcastType,
};
use pretty_assertions::assert_eq;

const FEED_URL: &str = "http://example.com/feed.xml";

fn example_feed(max_episodes: usize) -> Podcast {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/data/example-feed.xml");
    let file = File::open(path).unwrap();
    parse(FEED_URL, file, max_episodes).unwrap()
}

fn rss_item(item: &str) -> String {
    format!(
        r#"<rss xmlns:itunes="http://www.itunes.com/dtds/podcast-1.0.dtd"><channel><title>Show</title><item>{}</item></channel></rss>"#,
        item
    )
}

#[test]
fn test_podcast_fields() {
    let podcast = example_feed(0);

    assert_eq!(podcast.title, "Podcast Title");
    assert_eq!(podcast.link.as_deref(), Some("http://example.com/"));
    assert_eq!(podcast.description.as_deref(), Some("Some description"));
    assert_eq!(podcast.cover_url.as_deref(), Some("http://example.com/image.png"));
    assert_eq!(podcast.language.as_deref(), Some("en-us"));
    assert_eq!(podcast.generator.as_deref(), Some("Handwritten"));
    assert_eq!(
        podcast.payment_url.as_deref(),
        Some("https://flattr.com/submit/auto?user_id=example")
    );
    assert_eq!(
        podcast.paged_feed_next.as_deref(),
        Some("http://example.com/feed.xml?page=2")
    );
    assert_eq!(podcast.paged_feed_first, None);
    assert_eq!(podcast.itunes_author.as_deref(), Some("Podcast Author"));
    assert_eq!(
        podcast.itunes_owner,
        Some(ItunesOwner {
            name: Some("Owner Name".to_string()),
            email: Some("owner@example.com".to_string()),
        })
    );
    assert_eq!(
        podcast.itunes_categories,
        vec![
            vec!["Technology".to_string(), "Podcasting".to_string()],
            vec!["Society & Culture".to_string()],
        ]
    );
    assert_eq!(
        podcast.itunes_keywords,
        Some(vec!["tech".to_string(), "audio".to_string()])
    );
    assert_eq!(podcast.explicit, Some(false));
    assert_eq!(podcast.podcast_type, Some(PodcastType::Episodic));
    assert_eq!(podcast.funding_url.as_deref(), Some("https://example.com/support"));
    assert_eq!(podcast.import_prohibited, Some(true));
    assert_eq!(podcast.new_url, None);
}

#[test]
fn test_episodes_are_validated_and_sorted() {
    let podcast = example_feed(0);

    let guids: Vec<&str> = podcast.episodes.iter().map(|e| e.guid.as_str()).collect();
    assert_eq!(
        guids,
        vec![
            "example-episode-12345",
            "http://example.com/podcast/episode/2/",
            "http://example.com/episode/3",
            "http://example.com/episode/episode-4.ogg",
        ]
    );
    let published: Vec<i64> = podcast.episodes.iter().map(|e| e.published).collect();
    assert_eq!(published, vec![1376662770, 1376576370, 1376489970, 1376403570]);
}

#[test]
fn test_full_episode() {
    let podcast = example_feed(0);
    let episode = &podcast.episodes[0];

    assert_eq!(episode.title, "Podcast Episode");
    assert_eq!(episode.link, "http://example.com/episode/1");
    assert_eq!(episode.description, "Episode Description");
    assert_eq!(episode.description_html, None);
    assert_eq!(episode.subtitle.as_deref(), Some("The first one"));
    assert_eq!(episode.total_time, 8160);
    assert_eq!(episode.season, 2);
    assert_eq!(episode.number, Some(5));
    assert_eq!(episode.episode_type, Some(EpisodeType::Full));
    assert_eq!(episode.explicit, Some(true));
    assert_eq!(episode.itunes_author.as_deref(), Some("Episode Author"));
    assert_eq!(
        episode.episode_art_url.as_deref(),
        Some("http://example.com/episode/1.png")
    );
    assert_eq!(
        episode.payment_url.as_deref(),
        Some("https://flattr.com/submit/auto?user_id=example&url=episode-1")
    );
    assert_eq!(
        episode.transcript_url.as_deref(),
        Some("http://example.com/episode/1.vtt")
    );
    assert_eq!(
        episode.chapters_json_url.as_deref(),
        Some("http://example.com/episode/1/chapters.json")
    );
    assert_eq!(
        episode.enclosures,
        vec![Enclosure {
            url: "http://example.com/episode/1.ogg".to_string(),
            file_size: 50914623,
            mime_type: "audio/ogg".to_string(),
        }]
    );
    assert_eq!(
        episode.chapters,
        Some(vec![
            Chapter {
                start: 0,
                title: "Intro".to_string(),
                href: None,
                image: None,
            },
            Chapter {
                start: 330,
                title: "Main topic".to_string(),
                href: Some("http://example.com/topic".to_string()),
                image: Some("http://example.com/chapter.png".to_string()),
            },
        ])
    );

    let persons = episode.persons.as_ref().unwrap();
    assert_eq!(persons.len(), 2);
    assert_eq!(persons[0].name, "Jane Host");
    assert_eq!(persons[0].role, "host");
    assert_eq!(persons[0].group, "cast");
    assert_eq!(persons[0].img.as_deref(), Some("http://example.com/host.jpg"));
    assert_eq!(persons[1].name, "John Guest");
    assert_eq!(persons[1].role, "guest");
    assert_eq!(persons[1].group, "writing");
}

#[test]
fn test_permalink_episode_with_html_description() {
    let podcast = example_feed(0);
    let episode = &podcast.episodes[1];

    assert_eq!(episode.title, "episode-2");
    assert_eq!(episode.link, "http://example.com/podcast/episode/2/");
    assert_eq!(
        episode.description_html.as_deref(),
        Some("<p>Second <b>episode</b> &amp; more</p>")
    );
    assert_eq!(episode.description, "Second episode & more");
    assert_eq!(episode.enclosures[0].file_size, -1);
    assert_eq!(episode.chapters, None);
    assert_eq!(episode.persons, None);
}

#[test]
fn test_guid_fallbacks() {
    let podcast = example_feed(0);

    let third = &podcast.episodes[2];
    assert_eq!(third.guid, third.link);
    assert_eq!(third.enclosures[0].mime_type, "audio/mpeg");

    let fourth = &podcast.episodes[3];
    assert_eq!(fourth.title, "Episode 4");
    assert_eq!(fourth.link, "");
}

#[test]
fn test_max_episodes_keeps_newest() {
    let podcast = example_feed(2);
    let guids: Vec<&str> = podcast.episodes.iter().map(|e| e.guid.as_str()).collect();
    assert_eq!(
        guids,
        vec!["example-episode-12345", "http://example.com/podcast/episode/2/"]
    );
}

#[test]
fn test_parse_with_options() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/data/example-feed.xml");
    let file = File::open(path).unwrap();
    let podcast =
        parse_with_options(FEED_URL, file, &ParseOptions::new().max_episodes(1)).unwrap();
    assert_eq!(podcast.episodes.len(), 1);
}

#[test]
fn test_serial_podcast_keeps_oldest_first() {
    let feed = r#"<rss xmlns:itunes="http://www.itunes.com/dtds/podcast-1.0.dtd"><channel>
        <itunes:type>serial</itunes:type>
        <item><guid>b</guid><title>Part 2</title><pubDate>Thu, 15 Aug 2013 14:19:30 +0000</pubDate></item>
        <item><guid>a</guid><title>Part 1</title><pubDate>Wed, 14 Aug 2013 14:19:30 +0000</pubDate></item>
        <item><guid>c</guid><title>Part 3</title><pubDate>Fri, 16 Aug 2013 14:19:30 +0000</pubDate></item>
    </channel></rss>"#;
    let podcast = parse(FEED_URL, feed.as_bytes(), 2).unwrap();
    let guids: Vec<&str> = podcast.episodes.iter().map(|e| e.guid.as_str()).collect();
    assert_eq!(guids, vec!["a", "b"]);
}

#[test]
fn test_title_defaults_to_url_basename() {
    let podcast = parse_str("<rss><channel></channel></rss>", "http://example.com/shows/my-show.rss").unwrap();
    assert_eq!(podcast.title, "my-show");
}

#[test]
fn test_ambiguous_enclosures_drop_episode() {
    let feed = rss_item(
        r#"<enclosure url="http://example.com/a.mp3"/><enclosure url="http://example.com/b.mp3"/>"#,
    );
    let podcast = parse_str(&feed, FEED_URL).unwrap();
    assert!(podcast.episodes.is_empty());
}

#[test]
fn test_episode_without_title_needs_single_enclosure() {
    let feed = rss_item(r#"<guid isPermaLink="false">id-1</guid>"#);
    let podcast = parse_str(&feed, FEED_URL).unwrap();
    assert!(podcast.episodes.is_empty());
}

#[test]
fn test_enclosure_without_url_is_skipped() {
    let feed = rss_item(r#"<title>T</title><guid>g</guid><enclosure length="5" type="audio/mpeg"/>"#);
    let podcast = parse_str(&feed, FEED_URL).unwrap();
    assert!(podcast.episodes[0].enclosures.is_empty());
}

#[test]
fn test_plain_text_description_stays_plain() {
    let feed = rss_item("<title>T</title><guid>g</guid><description>a &lt; b and c &gt; d</description>");
    let podcast = parse_str(&feed, FEED_URL).unwrap();
    let episode = &podcast.episodes[0];
    assert_eq!(episode.description, "a < b and c > d");
    assert_eq!(episode.description_html, None);
}

#[test]
fn test_content_encoded_wins_over_description_html() {
    let feed = r#"<rss xmlns:content="http://purl.org/rss/1.0/modules/content/"><channel><item>
        <title>T</title><guid>g</guid>
        <content:encoded><![CDATA[<p>Full</p>]]></content:encoded>
        <description><![CDATA[<p>Short</p>]]></description>
    </item></channel></rss>"#;
    let podcast = parse_str(feed, FEED_URL).unwrap();
    let episode = &podcast.episodes[0];
    assert_eq!(episode.description_html.as_deref(), Some("<p>Full</p>"));
    assert_eq!(episode.description, "Full");
}

#[test]
fn test_explicit_vocabulary_leaves_unknown_values_unset() {
    let feed = rss_item("<title>T</title><guid>g</guid><itunes:explicit>sometimes</itunes:explicit>");
    let podcast = parse_str(&feed, FEED_URL).unwrap();
    assert_eq!(podcast.episodes[0].explicit, None);
}

#[test]
fn test_episode_number_and_type_rules() {
    let feed = rss_item(
        "<title>T</title><guid>g</guid><itunes:episode>0</itunes:episode>\
         <itunes:season>first</itunes:season><itunes:episodeType>promo</itunes:episodeType>",
    );
    let podcast = parse_str(&feed, FEED_URL).unwrap();
    let episode = &podcast.episodes[0];
    assert_eq!(episode.number, None);
    assert_eq!(episode.season, 0);
    assert_eq!(episode.episode_type, None);
}

#[test]
fn test_media_rss_enclosures_and_thumbnails() {
    let feed = r#"<rss xmlns:media="http://search.yahoo.com/mrss"><channel><item>
        <title>T</title><guid>g</guid>
        <media:group>
            <media:content url="http://example.com/v.mp4" fileSize="2048" type="video/mp4"/>
            <media:thumbnail url="http://example.com/thumb.jpg"/>
        </media:group>
        <media:description>Media   description</media:description>
    </item></channel></rss>"#;
    let podcast = parse_str(feed, FEED_URL).unwrap();
    let episode = &podcast.episodes[0];
    assert_eq!(
        episode.enclosures,
        vec![Enclosure {
            url: "http://example.com/v.mp4".to_string(),
            file_size: 2048,
            mime_type: "video/mp4".to_string(),
        }]
    );
    assert_eq!(
        episode.episode_art_url.as_deref(),
        Some("http://example.com/thumb.jpg")
    );
    assert_eq!(episode.description, "Media description");
}

#[test]
fn test_xml_base_resolution() {
    let feed = r#"<rss xml:base="http://cdn.example.org/"><channel>
        <item xml:base="season1/">
            <title>T</title><guid>g</guid>
            <enclosure url="ep1.mp3" type="audio/mpeg"/>
        </item>
        <item>
            <title>U</title><guid>h</guid>
            <enclosure url="ep2.mp3" type="audio/mpeg"/>
        </item>
    </channel></rss>"#;
    let podcast = parse_str(feed, FEED_URL).unwrap();
    let urls: Vec<&str> = podcast
        .episodes
        .iter()
        .map(|e| e.enclosures[0].url.as_str())
        .collect();
    assert_eq!(
        urls,
        vec![
            "http://cdn.example.org/season1/ep1.mp3",
            "http://cdn.example.org/ep2.mp3"
        ]
    );
}

#[test]
fn test_redirect_and_new_feed_url() {
    let feed = r#"<rss xmlns:itunes="http://www.itunes.com/dtds/podcast-1.0.dtd"><channel>
        <itunes:new-feed-url>itpc://example.net/new.xml</itunes:new-feed-url>
    </channel></rss>"#;
    let podcast = parse_str(feed, FEED_URL).unwrap();
    assert_eq!(podcast.new_url.as_deref(), Some("http://example.net/new.xml"));

    let redirect = "<rss><redirect><newLocation>http://example.org/moved.xml</newLocation></redirect></rss>";
    let podcast = parse_str(redirect, FEED_URL).unwrap();
    assert_eq!(podcast.new_url.as_deref(), Some("http://example.org/moved.xml"));
}

#[test]
fn test_atom_feed() {
    let feed = r#"<?xml version="1.0" encoding="utf-8"?>
<feed xmlns="http://www.w3.org/2005/Atom" xmlns:media="http://search.yahoo.com/mrss/">
  <title>Atom   Show</title>
  <subtitle>About things</subtitle>
  <icon>/icon.png</icon>
  <link rel="alternate" type="text/html" href="http://example.com/"/>
  <link rel="first" href="http://example.com/atom.xml"/>
  <entry>
    <id>urn:uuid:1225c695-cfb8-4ebb-aaaa-80da344efa6a</id>
    <title>First entry</title>
    <updated>2003-12-13T18:30:02Z</updated>
    <link href="http://example.com/2003/12/13/atom03"/>
    <link rel="enclosure" type="audio/mpeg" length="1337" href="http://example.com/a.mp3"/>
    <content type="html">&lt;p&gt;Hello &lt;i&gt;world&lt;/i&gt;&lt;/p&gt;</content>
  </entry>
  <entry>
    <id>entry-2</id>
    <title>Second entry</title>
    <published>2003-12-14T18:30:02Z</published>
    <updated>2003-12-20T18:30:02Z</updated>
    <content>Plain   text body</content>
    <media:thumbnail url="http://example.com/t.jpg"/>
  </entry>
</feed>"#;
    let podcast = parse_str(feed, "http://example.com/atom.xml").unwrap();

    assert_eq!(podcast.title, "Atom Show");
    assert_eq!(podcast.description.as_deref(), Some("About things"));
    assert_eq!(podcast.cover_url.as_deref(), Some("http://example.com/icon.png"));
    assert_eq!(podcast.link.as_deref(), Some("http://example.com/"));
    assert_eq!(
        podcast.paged_feed_first.as_deref(),
        Some("http://example.com/atom.xml")
    );

    assert_eq!(podcast.episodes.len(), 2);
    let second = &podcast.episodes[0];
    assert_eq!(second.guid, "entry-2");
    assert_eq!(second.published, 1071426602);
    assert_eq!(second.description, "Plain text body");
    assert_eq!(second.episode_art_url.as_deref(), Some("http://example.com/t.jpg"));

    let first = &podcast.episodes[1];
    assert_eq!(first.guid, "urn:uuid:1225c695-cfb8-4ebb-aaaa-80da344efa6a");
    assert_eq!(first.published, 1071340202);
    assert_eq!(first.link, "http://example.com/2003/12/13/atom03");
    assert_eq!(first.enclosures[0].file_size, 1337);
    assert_eq!(
        first.description_html.as_deref(),
        Some("<p>Hello <i>world</i></p>")
    );
    assert_eq!(first.description, "Hello world");
}

#[test]
fn test_namespace_prefixes_are_resolved_by_uri() {
    let feed = r#"<rss xmlns:it="http://www.itunes.com/DTDs/Podcast-1.0.dtd" xmlns:x="http://example.com/ns"><channel>
        <item>
            <title>T</title><guid>g</guid>
            <it:duration>61:08</it:duration>
            <x:duration>99:99:99</x:duration>
        </item>
    </channel></rss>"#;
    let podcast = parse_str(feed, FEED_URL).unwrap();
    assert_eq!(podcast.episodes[0].total_time, 3668);
}

/// Elements in an unrecognized default namespace never reach RSS handlers.
#[test]
fn test_unknown_default_namespace_is_inert() {
    let err = parse_str(
        r#"<rss xmlns="http://example.com/unknown"><channel><title>X</title></channel></rss>"#,
        FEED_URL,
    )
    .unwrap_err();
    assert!(matches!(err, FeedParseError::UnsupportedRoot { ref root, .. } if root == "!:rss"));

    let feed = rss_item(
        r#"<title>Real</title><guid>g</guid><title xmlns="http://example.com/x">Alias</title>"#,
    );
    let podcast = parse_str(&feed, FEED_URL).unwrap();
    assert_eq!(podcast.episodes[0].title, "Real");
}

#[test]
fn test_unbound_prefix_passes_through() {
    let feed = "<rss><channel><item><title>T</title><guid>g</guid><itunes:duration>10</itunes:duration></item></channel></rss>";
    let podcast = parse_str(feed, FEED_URL).unwrap();
    assert_eq!(podcast.episodes[0].total_time, 10);
}

#[test]
fn test_unsupported_roots() {
    for document in [
        "<html><body/></html>",
        r#"<feed xmlns="http://example.com/not-atom"><title>x</title></feed>"#,
        r#"<x:rss xmlns:x="http://example.com/ns"><channel/></x:rss>"#,
        "<channel><item/></channel>",
    ] {
        let err = parse_str(document, FEED_URL).unwrap_err();
        assert!(
            matches!(err, FeedParseError::UnsupportedRoot { .. }),
            "{} gave {:?}",
            document,
            err
        );
        assert!(err.position().is_some());
    }
}

#[test]
fn test_malformed_xml() {
    let err = parse_str("<rss><channel></rss>", FEED_URL).unwrap_err();
    assert!(matches!(err, FeedParseError::Syntax { .. }));
    assert!(!err.message().is_empty());
}

#[test]
fn test_unquoted_attribute_is_fatal() {
    let feed = rss_item("<title>T</title><guid>g</guid><enclosure url=http://example.com/a.mp3 />");
    let err = parse_str(&feed, FEED_URL).unwrap_err();
    assert!(matches!(err, FeedParseError::Syntax { .. }), "{:?}", err);
}

#[test]
fn test_duplicate_attribute_is_fatal() {
    let feed = rss_item(
        r#"<title>T</title><guid>g</guid><enclosure url="http://example.com/a.mp3" url="http://example.com/b.mp3"/>"#,
    );
    let err = parse_str(&feed, FEED_URL).unwrap_err();
    assert!(matches!(err, FeedParseError::Syntax { .. }), "{:?}", err);
    assert!(err.position().is_some());
}

#[test]
fn test_json_shape() {
    let podcast = example_feed(0);
    let value = serde_json::to_value(&podcast).unwrap();

    assert_eq!(value["type"], "episodic");
    assert_eq!(value["episodes"][0]["type"], "full");
    assert!(value["episodes"][0].get("chapters").is_some());
    assert!(value["episodes"][1].get("chapters").is_none());
    assert!(value["episodes"][1].get("persons").is_none());
    assert!(value["episodes"][1].get("guid_is_permalink").is_none());
}

#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[test]
fn test_diagnostics_go_to_caller_subscriber() {
    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::WARN)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();

    let podcast = tracing::subscriber::with_default(subscriber, || example_feed(0));
    assert_eq!(podcast.episodes.len(), 4);

    let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
    assert!(output.contains("invalid chapter"), "{}", output);
}

// ABOUTME: CLI for parsing podcast feeds with the podparse feed parser.
// ABOUTME: Streams a feed from a URL, a file, or stdin and prints the podcast record as JSON.

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;
use podparse_feed::{parse_with_options, ParseOptions};
use serde_json::json;
use tracing_subscriber::EnvFilter;
use url::Url;

/// Parse one or more podcast feeds and output JSON.
#[derive(Parser, Debug)]
#[command(name = "podparse")]
#[command(about = "Parse podcast feeds and print JSON", long_about = None)]
struct Args {
    /// Feed URL(s) (http/https) or local file paths. Use "-" to read one feed from stdin.
    #[arg(required = true)]
    targets: Vec<String>,

    /// Override the feed URL used for relative links and the fallback title
    /// (only valid when a single target is provided).
    #[arg(long)]
    feed_url: Option<String>,

    /// Keep at most this many episodes. 0 keeps all.
    #[arg(long, default_value_t = 0)]
    max_episodes: usize,

    /// Output compact JSON instead of pretty.
    #[arg(long, default_value_t = false)]
    compact: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    if args.targets.len() > 1 && args.feed_url.is_some() {
        bail!("--feed-url is only valid when parsing a single target");
    }
    if args.targets.iter().filter(|target| *target == "-").count() > 1 {
        bail!("stdin can only be read once");
    }

    let options = ParseOptions::new().max_episodes(args.max_episodes);
    let mut results = Vec::new();

    for target in &args.targets {
        let feed_url = args.feed_url.clone().unwrap_or_else(|| target.clone());

        let parsed = open_target(target).and_then(|stream| {
            parse_with_options(&feed_url, stream, &options).map_err(anyhow::Error::new)
        });
        match parsed {
            Ok(podcast) => results.push(json!({
                "feed_url": feed_url,
                "ok": true,
                "podcast": podcast,
                "error": null
            })),
            Err(err) => {
                tracing::warn!(feed_url = %feed_url, error = %err, "failed to parse feed");
                results.push(json!({
                    "feed_url": feed_url,
                    "ok": false,
                    "podcast": null,
                    "error": format!("{:#}", err)
                }))
            }
        }
    }

    let parsed = results
        .iter()
        .filter(|r| r.get("ok").and_then(|v| v.as_bool()) == Some(true))
        .count();
    let failed = results.len() - parsed;

    // A single successful target prints the bare record; anything else gets
    // the envelope with per-target results and counts.
    let output = match results.as_slice() {
        [only] if failed == 0 => only.get("podcast").cloned().unwrap_or_else(|| json!({})),
        _ => json!({
            "feeds": results,
            "total_feeds": results.len(),
            "parsed": parsed,
            "failed": failed
        }),
    };

    if args.compact {
        println!("{}", serde_json::to_string(&output)?);
    } else {
        println!("{}", serde_json::to_string_pretty(&output)?);
    }

    if failed > 0 {
        std::process::exit(1);
    }
    Ok(())
}

/// Opens a target as a byte stream without buffering the whole document.
fn open_target(target: &str) -> Result<Box<dyn Read>> {
    if target == "-" {
        return Ok(Box::new(io::stdin().lock()));
    }

    if let Ok(url) = Url::parse(target) {
        if matches!(url.scheme(), "http" | "https") {
            let resp = reqwest::blocking::get(url)
                .and_then(|resp| resp.error_for_status())
                .with_context(|| format!("fetching {}", target))?;
            return Ok(Box::new(resp));
        }
    }

    let path = Path::new(target);
    if !path.exists() {
        return Err(anyhow!("file not found: {}", target));
    }
    let file = File::open(path).with_context(|| format!("opening {}", target))?;
    Ok(Box::new(BufReader::new(file)))
}

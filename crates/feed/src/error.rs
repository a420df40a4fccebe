// ABOUTME: Error type for podcast feed parsing.
// ABOUTME: Provides FeedParseError with Syntax, UnsupportedRoot, and Io variants plus position accessors.

use std::fmt;
use thiserror::Error;

/// The single terminal error raised when a document cannot be read as a feed.
///
/// Every other anomaly (bad dates, missing attributes, unknown values) is
/// recovered locally and never surfaces here.
#[derive(Debug, Error)]
pub enum FeedParseError {
    /// The document is not well-formed XML.
    #[error("malformed XML at byte {position}: {message}")]
    Syntax { message: String, position: u64 },

    /// The root element is not a recognized feed root.
    #[error("unsupported feed type: {root}")]
    UnsupportedRoot { root: String, position: Option<u64> },

    /// The input stream could not be read.
    #[error("failed to read feed: {message}")]
    Io { message: String },
}

impl FeedParseError {
    /// Creates a Syntax error at the given byte offset.
    pub fn syntax(message: impl fmt::Display, position: u64) -> Self {
        FeedParseError::Syntax {
            message: message.to_string(),
            position,
        }
    }

    /// Creates an UnsupportedRoot error for the canonical root name.
    pub fn unsupported_root(root: impl Into<String>) -> Self {
        FeedParseError::UnsupportedRoot {
            root: root.into(),
            position: None,
        }
    }

    /// Creates an Io error from an underlying read failure.
    pub fn io(err: impl fmt::Display) -> Self {
        FeedParseError::Io {
            message: err.to_string(),
        }
    }

    /// Maps a tokenizer error, keeping I/O failures distinct from syntax errors.
    pub(crate) fn from_xml(err: quick_xml::Error, position: u64) -> Self {
        match err {
            quick_xml::Error::Io(io) => FeedParseError::io(io),
            other => FeedParseError::syntax(other, position),
        }
    }

    /// Attaches a source position to errors raised before one was known.
    pub(crate) fn at(self, at: u64) -> Self {
        match self {
            FeedParseError::UnsupportedRoot { root, position } => FeedParseError::UnsupportedRoot {
                root,
                position: position.or(Some(at)),
            },
            other => other,
        }
    }

    /// Human-readable description without the position prefix.
    pub fn message(&self) -> String {
        match self {
            FeedParseError::Syntax { message, .. } => message.clone(),
            FeedParseError::UnsupportedRoot { root, .. } => format!("Unsupported feed type: {}", root),
            FeedParseError::Io { message } => message.clone(),
        }
    }

    /// Byte offset into the input where the problem was detected, when known.
    pub fn position(&self) -> Option<u64> {
        match self {
            FeedParseError::Syntax { position, .. } => Some(*position),
            FeedParseError::UnsupportedRoot { position, .. } => *position,
            FeedParseError::Io { .. } => None,
        }
    }
}

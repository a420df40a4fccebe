// ABOUTME: Tracks the canonical element path and routes open/close events to handlers.
// ABOUTME: Rejects unknown document roots and buffers character data for text-consuming handlers.

use crate::accumulator::Accumulator;
use crate::attributes::Attributes;
use crate::error::FeedParseError;
use crate::handlers::{self, Handler};

/// Routes element events by the `/`-joined canonical path of open elements.
#[derive(Debug, Default)]
pub struct PathDispatcher {
    path: Vec<String>,
    text: Option<String>,
}

impl PathDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of currently open elements.
    pub fn depth(&self) -> usize {
        self.path.len()
    }

    /// The canonical path of the innermost open element, e.g. `rss/channel/item`.
    pub fn current_path(&self) -> String {
        self.path.join("/")
    }

    fn handler(&self) -> Option<&'static Handler> {
        handlers::lookup(&self.current_path())
    }

    /// Handles an element-open with an already canonicalized name.
    ///
    /// Fails before touching any state if this is the root element and its
    /// name is not a feed root.
    pub fn open(
        &mut self,
        name: String,
        attrs: &Attributes,
        acc: &mut Accumulator,
    ) -> Result<(), FeedParseError> {
        if self.path.is_empty() && !handlers::is_valid_root(&name) {
            return Err(FeedParseError::unsupported_root(name));
        }
        self.path.push(name);
        acc.enter_element(attrs.get("xml:base"));

        if let Some(handler) = self.handler() {
            handler.on_open(acc, attrs);
            if handler.wants_text() {
                self.text = Some(String::new());
            }
        }
        Ok(())
    }

    /// Appends character data to the buffer, if one is active.
    pub fn characters(&mut self, chars: &str) {
        if let Some(text) = self.text.as_mut() {
            text.push_str(chars);
        }
    }

    /// Handles an element-close for the innermost open element.
    pub fn close(&mut self, acc: &mut Accumulator) {
        if self.path.is_empty() {
            return;
        }
        if let Some(handler) = self.handler() {
            let text = self.text.take().unwrap_or_default();
            handler.on_close(acc, &text);
        }
        acc.leave_element();
        self.path.pop();
    }
}

// ABOUTME: Caller-tunable settings for a parse run.
// ABOUTME: ParseOptions with builder-style setters; defaults keep every episode.

/// Settings for [`crate::parse_with_options`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseOptions {
    /// Keep at most this many episodes after ordering. 0 keeps all.
    pub max_episodes: usize,
}

impl ParseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_episodes(mut self, max_episodes: usize) -> Self {
        self.max_episodes = max_episodes;
        self
    }
}

// ABOUTME: Owned attribute set of one element-open event.
// ABOUTME: Keeps qualified attribute names as written and values with references resolved.

/// Attributes of an element in document order, keyed by qualified name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes {
    entries: Vec<(String, String)>,
}

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an attribute. The tokenizer has already rejected duplicates.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.push((name.into(), value.into()));
    }

    /// Looks up an attribute by its qualified name, e.g. `href` or `xml:base`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut attributes = Attributes::new();
        for (name, value) in iter {
            attributes.insert(name, value);
        }
        attributes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_by_qualified_name() {
        let attrs: Attributes = [("href", "a.mp3"), ("xml:base", "http://example.com/")]
            .into_iter()
            .collect();
        assert_eq!(attrs.get("href"), Some("a.mp3"));
        assert_eq!(attrs.get("xml:base"), Some("http://example.com/"));
        assert_eq!(attrs.get("base"), None);
    }

    #[test]
    fn test_document_order_is_kept() {
        let mut attrs = Attributes::new();
        attrs.insert("url", "a.mp3");
        attrs.insert("type", "audio/mpeg");
        let names: Vec<&str> = attrs.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["url", "type"]);
        assert!(!attrs.is_empty());
    }
}

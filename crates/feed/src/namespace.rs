// ABOUTME: Namespace-aware canonicalization of element names across nested scopes.
// ABOUTME: Maps recognized namespace URIs to short prefixes and isolates unknown ones with '!'.

use crate::attributes::Attributes;

/// Namespace URIs the dispatch table understands, with their canonical prefix.
const KNOWN_NAMESPACES: &[(&str, &str)] = &[
    // iTunes podcasting
    ("http://www.itunes.com/dtds/podcast-1.0.dtd", "itunes"),
    ("http://www.itunes.com/DTDs/Podcast-1.0.dtd", "itunes"),
    // Atom, RFC 4287
    ("http://www.w3.org/2005/Atom", "atom"),
    ("http://www.w3.org/2005/Atom/", "atom"),
    // Media RSS; the trailing slash is official but often missing
    ("http://search.yahoo.com/mrss/", "media"),
    ("http://search.yahoo.com/mrss", "media"),
    // Podlove Simple Chapters
    ("http://podlove.org/simple-chapters", "psc"),
    ("http://podlove.org/simple-chapters/", "psc"),
    // RSS content module
    ("http://purl.org/rss/1.0/modules/content/", "content"),
    // Podcast Index
    (
        "https://github.com/Podcastindex-org/podcast-namespace/blob/main/docs/1.0.md",
        "podcast",
    ),
    (
        "https://github.com/podcastindex-org/podcast-namespace/blob/main/docs/1.0.md",
        "podcast",
    ),
    ("https://podcastindex.org/namespace/1.0", "podcast"),
    ("http://podcastindex.org/namespace/1.0", "podcast"),
];

/// Returns the canonical prefix for a recognized namespace URI.
pub fn short_prefix(uri: &str) -> Option<&'static str> {
    KNOWN_NAMESPACES
        .iter()
        .find(|(known, _)| *known == uri)
        .map(|(_, prefix)| *prefix)
}

/// Prefix bindings declared on one element. The empty prefix is the default namespace.
#[derive(Debug, Default)]
struct Scope {
    bindings: Vec<(String, String)>,
}

impl Scope {
    fn from_attributes(attrs: &Attributes) -> Self {
        let bindings = attrs
            .iter()
            .filter_map(|(key, value)| {
                if key == "xmlns" {
                    Some((String::new(), value.to_string()))
                } else {
                    key.strip_prefix("xmlns:")
                        .map(|prefix| (prefix.to_string(), value.to_string()))
                }
            })
            .collect();
        Self { bindings }
    }

    fn get(&self, prefix: &str) -> Option<&str> {
        self.bindings
            .iter()
            .find(|(bound, _)| bound == prefix)
            .map(|(_, uri)| uri.as_str())
    }
}

/// Tracks namespace scopes for the open elements of a document.
///
/// Every element-open pushes a scope (possibly empty) and every element-close
/// pops it, so the stack depth always equals the element depth.
#[derive(Debug, Default)]
pub struct NamespaceResolver {
    scopes: Vec<Scope>,
}

impl NamespaceResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a scope holding the `xmlns` declarations of an element.
    pub fn push_scope(&mut self, attrs: &Attributes) {
        self.scopes.push(Scope::from_attributes(attrs));
    }

    pub fn pop_scope(&mut self) {
        self.scopes.pop();
    }

    /// Finds the URI bound to `prefix` in the nearest enclosing scope.
    pub fn lookup(&self, prefix: &str) -> Option<&str> {
        self.scopes.iter().rev().find_map(|scope| scope.get(prefix))
    }

    /// Canonicalizes a qualified element name.
    ///
    /// Recognized namespaces become `short:local`. A bound but unknown prefix
    /// becomes `!prefix:local` so it can never match a dispatch path. An unbound
    /// prefix is passed through unchanged. Unprefixed names take the default
    /// namespace's short prefix when it is recognized, become `!:local` when
    /// it is not, and stay bare when no default namespace is bound.
    pub fn canonicalize(&self, qname: &str) -> String {
        match qname.split_once(':') {
            // `xmlns=""` undeclares the default namespace
            None => match self.lookup("").filter(|uri| !uri.is_empty()) {
                None => qname.to_string(),
                Some(uri) => match short_prefix(uri) {
                    Some(short) => format!("{}:{}", short, qname),
                    None => format!("!:{}", qname),
                },
            },
            Some((prefix, local)) => match self.lookup(prefix) {
                None => {
                    tracing::warn!(prefix = %prefix, element = %qname, "no namespace defined for prefix");
                    qname.to_string()
                }
                Some(uri) => match short_prefix(uri) {
                    Some(short) => format!("{}:{}", short, local),
                    None => format!("!{}:{}", prefix, local),
                },
            },
        }
    }
}

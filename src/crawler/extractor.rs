//! Pattern-based link extraction
//!
//! Links are found with a flat regular-expression scan over the raw page
//! text. There is no HTML awareness: a URL inside a comment, a script or an
//! attribute value is found the same way as one in visible text.

use regex::{Matches, Regex};
use url::Url;

/// Default pattern recognizing absolute `http`, `https` and `ftp` URLs
///
/// Host, optional port, then any run of path and query characters.
pub const DEFAULT_LINK_PATTERN: &str =
    r"(http|https|ftp)://[a-zA-Z0-9\-.]+\.[a-zA-Z]{2,3}(:[a-zA-Z0-9]*)?/?([a-zA-Z0-9\-._?,/\\+&;%$#=~])*";

/// Substrings that always exclude a discovered URL from the frontier
pub const DEFAULT_DENY_LIST: &[&str] = &["w3.org"];

/// Finds absolute URLs in page text
#[derive(Debug, Clone)]
pub struct LinkExtractor {
    pattern: Regex,
}

impl LinkExtractor {
    /// Creates an extractor from a regular expression
    ///
    /// # Arguments
    ///
    /// * `pattern` - The regular expression matching one URL occurrence
    ///
    /// # Returns
    ///
    /// * `Ok(LinkExtractor)` - The pattern compiled
    /// * `Err(regex::Error)` - The pattern is not a valid regular expression
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
        })
    }

    /// Returns a lazy sequence of the links found in `text`
    ///
    /// Links are yielded left to right in order of appearance. A link that
    /// occurs several times is yielded each time. Matches that fail strict
    /// URL parsing are skipped and logged.
    ///
    /// Calling `extract` again on the same text restarts the scan.
    ///
    /// # Example
    ///
    /// ```
    /// use webcrawler::crawler::LinkExtractor;
    ///
    /// let extractor = LinkExtractor::default();
    /// let links: Vec<&str> = extractor
    ///     .extract("see http://a.example/x and ftp://b.example/y")
    ///     .map(|link| link.as_str())
    ///     .collect();
    /// assert_eq!(links, vec!["http://a.example/x", "ftp://b.example/y"]);
    /// ```
    pub fn extract<'r, 't>(&'r self, text: &'t str) -> Links<'r, 't> {
        Links {
            matches: self.pattern.find_iter(text),
        }
    }
}

impl Default for LinkExtractor {
    fn default() -> Self {
        Self {
            pattern: Regex::new(DEFAULT_LINK_PATTERN).expect("default link pattern is valid"),
        }
    }
}

/// One link found in page text
///
/// Keeps the matched text as it appeared in the page next to its parsed
/// form. The parsed form may be serialized differently (lowercased host,
/// trailing slash on an empty path).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link<'t> {
    raw: &'t str,
    url: Url,
}

impl<'t> Link<'t> {
    /// Returns the matched text exactly as found
    pub fn as_str(&self) -> &'t str {
        self.raw
    }

    /// Returns the parsed URL
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Consumes the link, returning the parsed URL
    pub fn into_url(self) -> Url {
        self.url
    }
}

/// Iterator over the links found by [`LinkExtractor::extract`]
pub struct Links<'r, 't> {
    matches: Matches<'r, 't>,
}

impl<'t> Iterator for Links<'_, 't> {
    type Item = Link<'t>;

    fn next(&mut self) -> Option<Link<'t>> {
        for found in self.matches.by_ref() {
            match Url::parse(found.as_str()) {
                Ok(url) => {
                    return Some(Link {
                        raw: found.as_str(),
                        url,
                    })
                }
                Err(e) => {
                    tracing::debug!("Discarding malformed link {}: {}", found.as_str(), e);
                }
            }
        }
        None
    }
}

/// Substring deny list applied to discovered URLs
///
/// `w3.org` is always part of the list.
#[derive(Debug, Clone)]
pub struct DenyList {
    entries: Vec<String>,
}

impl DenyList {
    /// Creates a deny list from the given substrings plus the built-in ones
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut list: Vec<String> = DEFAULT_DENY_LIST.iter().map(|s| s.to_string()).collect();
        for entry in entries {
            let entry = entry.into();
            if !entry.is_empty() && !list.contains(&entry) {
                list.push(entry);
            }
        }
        Self { entries: list }
    }

    /// Returns true if the URL contains any denied substring
    pub fn is_denied(&self, url: &str) -> bool {
        self.entries.iter().any(|entry| url.contains(entry.as_str()))
    }

    /// Returns the substrings in this list
    pub fn entries(&self) -> &[String] {
        &self.entries
    }
}

impl Default for DenyList {
    fn default() -> Self {
        Self::new(Vec::<String>::new())
    }
}

//! Visited-set bookkeeping for one crawl session

use dashmap::DashSet;
use url::Url;

/// Concurrent record of which URLs have been scheduled and fetched
///
/// Two sets are kept. The claimed set holds every URL the session has ever
/// accepted for fetching (queued, in flight, or done) and is what makes
/// admission atomic: [`claim`] inserts and reports whether the URL was new in
/// a single step, so two workers discovering the same link cannot both
/// enqueue it. The visited set holds URLs whose fetch attempt has completed.
///
/// Both only grow until [`clear`] is called.
///
/// [`claim`]: VisitedSet::claim
/// [`clear`]: VisitedSet::clear
#[derive(Debug, Default)]
pub struct VisitedSet {
    claimed: DashSet<Url>,
    visited: DashSet<Url>,
}

impl VisitedSet {
    /// Creates an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims a URL for fetching
    ///
    /// Returns `true` if no one had claimed it before.
    pub fn claim(&self, url: &Url) -> bool {
        self.claimed.insert(url.clone())
    }

    /// Returns true if the URL has been claimed during this session
    pub fn is_claimed(&self, url: &Url) -> bool {
        self.claimed.contains(url)
    }

    /// Records that a fetch attempt for this URL has completed
    ///
    /// Marking the same URL twice has no further effect. Returns `true` if
    /// this call added it.
    pub fn mark_visited(&self, url: &Url) -> bool {
        self.claimed.insert(url.clone());
        self.visited.insert(url.clone())
    }

    /// Returns true if a fetch attempt for this URL has completed
    pub fn contains(&self, url: &Url) -> bool {
        self.visited.contains(url)
    }

    /// Returns the number of visited URLs
    pub fn len(&self) -> usize {
        self.visited.len()
    }

    /// Returns whether no URL has been visited
    pub fn is_empty(&self) -> bool {
        self.visited.is_empty()
    }

    /// Forgets every claimed and visited URL
    pub fn clear(&self) {
        self.claimed.clear();
        self.visited.clear();
    }
}

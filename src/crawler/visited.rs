use crate::url::visited_key;
use dashmap::DashSet;
use std::sync::Arc;

/// URLs already scheduled or fetched during one crawl run
///
/// Entries are normalized before insertion so trivially different spellings
/// of one page share a slot. Clones share the same set.
#[derive(Debug, Clone, Default)]
pub struct VisitedSet {
    inner: Arc<DashSet<String>>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a URL as visited
    ///
    /// Returns true if the URL was not visited before. The check and the
    /// insert are one atomic step.
    pub fn insert(&self, url: &str) -> bool {
        self.inner.insert(Self::key(url))
    }

    pub fn contains(&self, url: &str) -> bool {
        self.inner.contains(&Self::key(url))
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    fn key(url: &str) -> String {
        visited_key(url).unwrap_or_else(|| url.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_is_idempotent() {
        let visited = VisitedSet::new();
        assert!(visited.insert("https://www.auchan.ro/bacanie/c"));
        assert!(!visited.insert("https://www.auchan.ro/bacanie/c"));
        assert_eq!(visited.len(), 1);
    }

    #[test]
    fn test_equivalent_urls_share_entry() {
        let visited = VisitedSet::new();
        assert!(visited.insert("https://www.auchan.ro/lapte/p#"));
        assert!(!visited.insert("https://WWW.AUCHAN.RO/lapte/p/"));
        assert!(visited.contains("https://www.auchan.ro/lapte/p?utm_source=x"));
    }

    #[test]
    fn test_clones_share_state() {
        let visited = VisitedSet::new();
        let clone = visited.clone();
        clone.insert("https://www.auchan.ro/a/p");
        assert!(visited.contains("https://www.auchan.ro/a/p"));
    }

    #[test]
    fn test_concurrent_inserts_admit_one_winner() {
        let visited = VisitedSet::new();
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let visited = visited.clone();
                std::thread::spawn(move || visited.insert("https://www.auchan.ro/same/p"))
            })
            .collect();

        let winners = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|won| *won)
            .count();
        assert_eq!(winners, 1);
    }
}

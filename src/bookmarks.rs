use std::collections::HashSet;

use crate::models::{JobId, JobPosting};

/// Session-only set of bookmarked postings, keyed by id, kept in the order
/// they were bookmarked.
#[derive(Debug, Default)]
pub struct BookmarkStore {
    entries: Vec<JobPosting>,
    ids: HashSet<Option<JobId>>,
}

impl BookmarkStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the posting if absent, removes it otherwise. Returns whether it is
    /// bookmarked afterwards.
    pub fn toggle(&mut self, job: &JobPosting) -> bool {
        if self.ids.remove(&job.id) {
            self.entries.retain(|j| j.id != job.id);
            false
        } else {
            self.ids.insert(job.id.clone());
            self.entries.push(job.clone());
            true
        }
    }

    pub fn is_bookmarked(&self, id: Option<&JobId>) -> bool {
        self.ids.contains(&id.cloned())
    }

    pub fn as_slice(&self) -> &[JobPosting] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RawJobRecord;

    fn job(id: &str) -> JobPosting {
        JobPosting::from(RawJobRecord {
            id: Some(JobId::from(id)),
            company_name: Some(format!("Company {}", id)),
            ..Default::default()
        })
    }

    #[test]
    fn test_toggle_adds_then_removes() {
        let mut store = BookmarkStore::new();
        let j = job("1");

        assert!(store.toggle(&j));
        assert!(store.is_bookmarked(j.id.as_ref()));
        assert_eq!(store.len(), 1);

        assert!(!store.toggle(&j));
        assert!(!store.is_bookmarked(j.id.as_ref()));
        assert!(store.is_empty());
    }

    #[test]
    fn test_double_toggle_is_a_no_op() {
        let mut store = BookmarkStore::new();
        let a = job("a");
        let b = job("b");
        store.toggle(&a);

        for j in [&a, &b] {
            let before = store.is_bookmarked(j.id.as_ref());
            store.toggle(j);
            store.toggle(j);
            assert_eq!(store.is_bookmarked(j.id.as_ref()), before);
        }
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_keyed_by_id_not_content() {
        let mut store = BookmarkStore::new();
        let original = job("9");
        let mut refetched = job("9");
        refetched.views = Some(500);

        store.toggle(&original);
        // Same id with different content removes the existing entry.
        assert!(!store.toggle(&refetched));
        assert!(store.is_empty());
    }

    #[test]
    fn test_preserves_bookmark_order() {
        let mut store = BookmarkStore::new();
        for id in ["3", "1", "2"] {
            store.toggle(&job(id));
        }
        store.toggle(&job("1"));
        let ids: Vec<String> = store
            .as_slice()
            .iter()
            .map(|j| j.id.as_ref().unwrap().to_string())
            .collect();
        assert_eq!(ids, vec!["3", "2"]);
    }
}

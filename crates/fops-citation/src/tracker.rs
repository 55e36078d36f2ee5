use std::collections::HashSet;

use fops_core::models::{Citation, RetrievalResult};

/// De-duplicating, order-preserving citation accumulator.
///
/// An item keeps the position where it was first seen even if a later
/// query retrieves it again with a different score.
#[derive(Debug, Default, Clone)]
pub struct CitationTracker {
    seen: HashSet<String>,
    citations: Vec<Citation>,
}

impl CitationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record every hit of `result`, in rank order.
    pub fn observe(&mut self, result: &RetrievalResult) {
        for hit in &result.hits {
            if self.seen.insert(hit.item.id.clone()) {
                self.citations.push(Citation::from_item(&hit.item));
            }
        }
    }

    pub fn observe_all<'a>(&mut self, results: impl IntoIterator<Item = &'a RetrievalResult>) {
        for result in results {
            self.observe(result);
        }
    }

    /// Convenience: citations for `results` in one call.
    pub fn collect<'a>(results: impl IntoIterator<Item = &'a RetrievalResult>) -> Vec<Citation> {
        let mut tracker = Self::new();
        tracker.observe_all(results);
        tracker.finish()
    }

    pub fn citations(&self) -> &[Citation] {
        &self.citations
    }

    pub fn len(&self) -> usize {
        self.citations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.citations.is_empty()
    }

    pub fn finish(self) -> Vec<Citation> {
        tracing::debug!(citations = self.citations.len(), "citations tracked");
        self.citations
    }
}

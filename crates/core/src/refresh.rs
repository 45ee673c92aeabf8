//! Refresh queue
//!
//! Renderers ask for secondary fragments to be reloaded once the primary swap
//! is done (a list after one of its rows was deleted, for instance). Entries
//! are consumed strictly in insertion order and never retried.

use crate::page::Page;
use std::collections::VecDeque;

/// A fragment to reload: `GET endpoint` swapped into `selector`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshEntry {
    pub selector: String,
    pub endpoint: String,
}

impl RefreshEntry {
    pub fn new(selector: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            endpoint: endpoint.into(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RefreshQueue {
    entries: VecDeque<RefreshEntry>,
}

impl RefreshQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue(&mut self, entry: RefreshEntry) {
        tracing::debug!(selector = %entry.selector, endpoint = %entry.endpoint, "Queued refresh");
        self.entries.push_back(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Empty the queue, keeping entries whose element is still on the page
    ///
    /// Entries whose selector no longer resolves are dropped silently.
    pub fn drain_ready(&mut self, page: &dyn Page) -> Vec<RefreshEntry> {
        self.entries
            .drain(..)
            .filter(|entry| {
                let present = page.element(&entry.selector).is_some();
                if !present {
                    tracing::debug!(selector = %entry.selector, "Dropping refresh for missing element");
                }
                present
            })
            .collect()
    }
}

//! Ownership cache
//!
//! Maps the id a caller checked (exact id or subscription-prefix id) to a
//! definitive ownership answer. Entries live for the process lifetime and are
//! only overwritten by a successful purchase. Concurrent writers for the same
//! key compute the same answer, so no external lock is needed.

use dashmap::DashMap;

/// Concurrent map of product id to ownership
#[derive(Debug, Default)]
pub struct OwnershipCache {
    entries: DashMap<String, bool>,
}

impl OwnershipCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached answer for an id, if any
    pub fn get(&self, id: &str) -> Option<bool> {
        self.entries.get(id).map(|e| *e.value())
    }

    /// Record an answer computed from a license snapshot
    ///
    /// Keeps an existing entry so a racing purchase write is never
    /// downgraded by a stale snapshot.
    pub fn remember(&self, id: &str, owned: bool) -> bool {
        *self.entries.entry(id.to_string()).or_insert(owned)
    }

    /// Mark an id as owned after a purchase, overwriting any entry
    pub fn mark_owned(&self, id: &str) {
        self.entries.insert(id.to_string(), true);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

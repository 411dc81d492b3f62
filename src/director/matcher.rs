//! Longest-prefix matching over registered path prefixes.
//!
//! The matcher keeps its prefixes in a list ordered by non-increasing
//! length, so a front-to-back scan returns the longest registered prefix
//! of a query in one pass. Per-domain cardinality is small (tens of
//! entries), where the linear structure beats a trie in practice and is
//! trivially correct.

use std::collections::HashMap;

/// A prefix-to-value map answering longest-prefix queries.
#[derive(Debug, Default)]
pub struct Matcher {
    prefixes: HashMap<String, String>,
    ordered: Vec<String>,
}

impl Matcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `prefix`, mapping it to `value`.
    ///
    /// Re-registering an existing prefix updates the value without
    /// disturbing the ordering. The empty prefix is legal and matches
    /// every path.
    pub fn set_prefix(&mut self, prefix: &str, value: &str) {
        if !self.prefixes.contains_key(prefix) {
            // Insert at the first position whose entry is no longer than
            // the new prefix, keeping the list sorted by descending length.
            let at = self
                .ordered
                .iter()
                .position(|p| p.len() <= prefix.len())
                .unwrap_or(self.ordered.len());
            self.ordered.insert(at, prefix.to_string());
        }

        self.prefixes.insert(prefix.to_string(), value.to_string());
        debug_assert_eq!(self.ordered.len(), self.prefixes.len());
    }

    /// Removes `prefix` if registered; no-op otherwise.
    pub fn remove_prefix(&mut self, prefix: &str) {
        if self.prefixes.remove(prefix).is_some() {
            self.ordered.retain(|p| p != prefix);
        }
        debug_assert_eq!(self.ordered.len(), self.prefixes.len());
    }

    /// Returns the value of the longest registered prefix of `path`.
    ///
    /// The list is ordered by non-increasing length, so the first
    /// byte-wise match is necessarily the longest one.
    pub fn longest_match(&self, path: &str) -> Option<&str> {
        self.ordered
            .iter()
            .find(|prefix| path.starts_with(prefix.as_str()))
            .map(|prefix| self.prefixes[prefix].as_str())
    }

    pub fn len(&self) -> usize {
        self.prefixes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prefixes.is_empty()
    }
}

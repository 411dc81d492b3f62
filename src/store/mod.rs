//! The configuration store consumed by the director.
//!
//! The director reads a hierarchical key/value store through the [`Store`]
//! trait: one recursive snapshot plus a blocking watch keyed by a
//! monotonically increasing revision. Concrete clients (an etcd binding, a
//! test store) implement the trait outside the director; [`MemoryStore`]
//! is the in-process implementation used by the test suite.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

mod memory;

pub use memory::MemoryStore;

/// The action carried by a store event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Get,
    Set,
    Delete,
    Expire,
    /// An action this director does not recognize.
    Other(String),
}

impl Action {
    /// Whether the action adds (or refreshes) a key rather than removing
    /// it. `None` for unrecognized actions.
    pub fn additive(&self) -> Option<bool> {
        match self {
            Action::Get | Action::Set => Some(true),
            Action::Delete | Action::Expire => Some(false),
            Action::Other(_) => None,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Get => f.write_str("get"),
            Action::Set => f.write_str("set"),
            Action::Delete => f.write_str("delete"),
            Action::Expire => f.write_str("expire"),
            Action::Other(name) => f.write_str(name),
        }
    }
}

/// One node of the store's key tree.
///
/// Directory nodes carry children and no value; leaf nodes carry a value
/// and no children.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Node {
    pub key: String,
    pub value: String,
    pub dir: bool,
    pub children: Vec<Node>,
}

impl Node {
    /// Creates a leaf node.
    pub fn leaf(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            dir: false,
            children: Vec::new(),
        }
    }

    /// Creates a directory node.
    pub fn dir(key: impl Into<String>, children: Vec<Node>) -> Self {
        Self {
            key: key.into(),
            value: String::new(),
            dir: true,
            children,
        }
    }
}

/// A single store notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreEvent {
    pub action: Action,
    pub node: Node,
    pub revision: u64,
}

/// Errors surfaced by store operations.
///
/// All of these are recoverable: the watch loop resynchronizes from a
/// fresh snapshot rather than giving up.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The store could not be reached or answered with a transport fault.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// The requested watch revision has fallen out of the store's history
    /// window; only a fresh snapshot can catch up.
    #[error("revision {requested} is older than the store's history (oldest retained: {oldest})")]
    RevisionOutdated { requested: u64, oldest: u64 },

    /// The store has been shut down.
    #[error("store closed")]
    Closed,
}

/// The abstract coordination store.
#[async_trait]
pub trait Store: Send + Sync {
    /// Recursively reads the subtree under `root`.
    ///
    /// Returns the tree together with the revision it reflects.
    async fn snapshot(&self, root: &str) -> Result<(Node, u64), StoreError>;

    /// Blocks until an event at or after `wait_revision` occurs under
    /// `root`, then returns it.
    async fn watch(&self, root: &str, wait_revision: u64) -> Result<StoreEvent, StoreError>;

    /// Opportunistically refreshes cluster connectivity.
    ///
    /// Returns `false` when the refresh failed; callers treat that as a
    /// warning, not an error.
    async fn sync_endpoints(&self) -> bool;
}

#[async_trait]
impl<S: Store + ?Sized> Store for Arc<S> {
    async fn snapshot(&self, root: &str) -> Result<(Node, u64), StoreError> {
        self.as_ref().snapshot(root).await
    }

    async fn watch(&self, root: &str, wait_revision: u64) -> Result<StoreEvent, StoreError> {
        self.as_ref().watch(root, wait_revision).await
    }

    async fn sync_endpoints(&self) -> bool {
        self.as_ref().sync_endpoints().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_additive_actions() {
        assert_eq!(Action::Get.additive(), Some(true));
        assert_eq!(Action::Set.additive(), Some(true));
        assert_eq!(Action::Delete.additive(), Some(false));
        assert_eq!(Action::Expire.additive(), Some(false));
        assert_eq!(Action::Other("compareAndSwap".to_string()).additive(), None);
    }

    #[test]
    fn test_action_display() {
        assert_eq!(Action::Set.to_string(), "set");
        assert_eq!(Action::Other("update".to_string()).to_string(), "update");
    }
}

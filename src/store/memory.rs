//! In-process store implementation.
//!
//! Backs the test suite with the same observable contract as a real
//! coordination service: monotonic revisions, blocking recursive watches,
//! and a bounded history window. Failure-injection hooks simulate the
//! transport faults the watch loop has to recover from.

use std::collections::BTreeMap;
use std::pin::pin;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::Notify;

use super::{Action, Node, Store, StoreError, StoreEvent};

#[derive(Default)]
struct Inner {
    keys: BTreeMap<String, String>,
    revision: u64,
    log: Vec<StoreEvent>,
    trimmed_through: u64,
}

/// An in-memory [`Store`].
///
/// Mutations go through [`set`](MemoryStore::set),
/// [`delete`](MemoryStore::delete), and [`expire`](MemoryStore::expire);
/// each bumps the revision, appends to the event log, and wakes blocked
/// watchers.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
    changed: Notify,
    closed: AtomicBool,
    fail_next_snapshot: AtomicBool,
    fail_next_watch: AtomicBool,
    endpoints_healthy: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            endpoints_healthy: AtomicBool::new(true),
            ..Self::default()
        }
    }

    fn append(inner: &mut Inner, action: Action, node: Node) -> u64 {
        inner.revision += 1;
        let revision = inner.revision;
        inner.log.push(StoreEvent {
            action,
            node,
            revision,
        });
        revision
    }

    /// Writes `key`, returning the new revision.
    pub fn set(&self, key: &str, value: &str) -> u64 {
        let revision = {
            let mut inner = self.inner.lock();
            inner.keys.insert(key.to_string(), value.to_string());
            Self::append(&mut inner, Action::Set, Node::leaf(key, value))
        };
        self.changed.notify_waiters();
        revision
    }

    /// Deletes `key`, returning the new revision.
    pub fn delete(&self, key: &str) -> u64 {
        let revision = {
            let mut inner = self.inner.lock();
            inner.keys.remove(key);
            Self::append(&mut inner, Action::Delete, Node::leaf(key, ""))
        };
        self.changed.notify_waiters();
        revision
    }

    /// Removes `key` as an expiry rather than an explicit delete.
    pub fn expire(&self, key: &str) -> u64 {
        let revision = {
            let mut inner = self.inner.lock();
            inner.keys.remove(key);
            Self::append(&mut inner, Action::Expire, Node::leaf(key, ""))
        };
        self.changed.notify_waiters();
        revision
    }

    /// Appends an event without touching the key space. Lets tests feed
    /// watchers actions they are expected to ignore.
    pub fn emit(&self, action: Action, key: &str, value: &str) -> u64 {
        let revision = {
            let mut inner = self.inner.lock();
            Self::append(&mut inner, action, Node::leaf(key, value))
        };
        self.changed.notify_waiters();
        revision
    }

    /// Current revision.
    pub fn revision(&self) -> u64 {
        self.inner.lock().revision
    }

    /// Drops retained history, as a store compacting its log would.
    /// Watches for revisions at or before the current one then fail with
    /// [`StoreError::RevisionOutdated`].
    pub fn trim_history(&self) {
        {
            let mut inner = self.inner.lock();
            inner.trimmed_through = inner.revision;
            inner.log.clear();
        }
        self.changed.notify_waiters();
    }

    /// Makes the next `snapshot` call fail.
    pub fn fail_next_snapshot(&self) {
        self.fail_next_snapshot.store(true, Ordering::SeqCst);
    }

    /// Makes the next `watch` call (or a currently blocked one) fail.
    pub fn fail_next_watch(&self) {
        self.fail_next_watch.store(true, Ordering::SeqCst);
        self.changed.notify_waiters();
    }

    /// Controls the result of `sync_endpoints`.
    pub fn set_endpoints_healthy(&self, healthy: bool) {
        self.endpoints_healthy.store(healthy, Ordering::SeqCst);
    }

    /// Shuts the store down; every subsequent call fails with
    /// [`StoreError::Closed`].
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        self.changed.notify_waiters();
    }

    fn build_tree(key: &str, keys: &BTreeMap<String, String>) -> Node {
        let prefix = format!("{key}/");

        let mut segments: Vec<String> = Vec::new();
        for k in keys.keys().filter(|k| k.starts_with(&prefix)) {
            let segment = k[prefix.len()..]
                .split('/')
                .next()
                .unwrap_or_default()
                .to_string();
            if !segments.contains(&segment) {
                segments.push(segment);
            }
        }

        let mut children = Vec::new();
        for segment in segments {
            let child_key = format!("{prefix}{segment}");
            let child_prefix = format!("{child_key}/");
            if keys.keys().any(|k| k.starts_with(&child_prefix)) {
                children.push(Self::build_tree(&child_key, keys));
            } else if let Some(value) = keys.get(&child_key) {
                children.push(Node::leaf(child_key, value.as_str()));
            }
        }

        Node::dir(key, children)
    }
}

fn under_root(root: &str, key: &str) -> bool {
    key.strip_prefix(root)
        .is_some_and(|rest| rest.starts_with('/'))
}

#[async_trait]
impl Store for MemoryStore {
    async fn snapshot(&self, root: &str) -> Result<(Node, u64), StoreError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(StoreError::Closed);
        }
        if self.fail_next_snapshot.swap(false, Ordering::SeqCst) {
            return Err(StoreError::Unavailable(
                "injected snapshot failure".to_string(),
            ));
        }

        let inner = self.inner.lock();
        Ok((Self::build_tree(root, &inner.keys), inner.revision))
    }

    async fn watch(&self, root: &str, wait_revision: u64) -> Result<StoreEvent, StoreError> {
        let mut notified = pin!(self.changed.notified());
        loop {
            // Arm the waiter before inspecting state so a notification
            // between the check and the await is not lost.
            notified.as_mut().enable();

            {
                if self.closed.load(Ordering::SeqCst) {
                    return Err(StoreError::Closed);
                }
                if self.fail_next_watch.swap(false, Ordering::SeqCst) {
                    return Err(StoreError::Unavailable(
                        "injected watch failure".to_string(),
                    ));
                }

                let inner = self.inner.lock();
                if wait_revision <= inner.trimmed_through {
                    return Err(StoreError::RevisionOutdated {
                        requested: wait_revision,
                        oldest: inner.trimmed_through + 1,
                    });
                }
                if let Some(event) = inner
                    .log
                    .iter()
                    .find(|e| e.revision >= wait_revision && under_root(root, &e.node.key))
                {
                    return Ok(event.clone());
                }
            }

            notified.as_mut().await;
            notified.set(self.changed.notified());
        }
    }

    async fn sync_endpoints(&self) -> bool {
        self.endpoints_healthy.load(Ordering::SeqCst)
    }
}

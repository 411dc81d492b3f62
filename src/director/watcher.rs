//! Store synchronization.
//!
//! A single background task keeps the routing table current: a full
//! snapshot replaces the table (reset), then a blocking watch applies
//! incremental events in revision order (follow). Store errors fall back
//! to a fresh snapshot, so no update is ever missed inside the store's
//! history window. Malformed configuration is logged and skipped, never
//! fatal.

use std::time::Duration;

use crate::store::{Node, Store, StoreError, StoreEvent};

use super::addr::BackendAddr;
use super::keys::{self, RouteKey};
use super::router::{Director, RoutingTable};

/// Delay before retrying a failed snapshot.
const RESET_RETRY_DELAY: Duration = Duration::from_secs(5);

impl<S: Store> Director<S> {
    /// Runs the synchronization loop forever.
    ///
    /// Call once, from its own task. Lookups are never blocked by this
    /// loop; the write lock is held only around each applied event and
    /// the final swap of a rebuilt table.
    pub async fn watch(&self) {
        loop {
            if !self.store.sync_endpoints().await {
                tracing::warn!("store endpoint sync failed");
            }

            let revision = match self.reset().await {
                Ok(revision) => revision,
                Err(error) => {
                    tracing::error!(error = %error, "snapshot failed");
                    tokio::time::sleep(RESET_RETRY_DELAY).await;
                    continue;
                }
            };

            if let Err(error) = self.follow(revision).await {
                tracing::warn!(error = %error, "watch interrupted, resynchronizing");
            }
        }
    }

    /// Replaces the routing table with the contents of a fresh snapshot
    /// and returns the snapshot's revision.
    async fn reset(&self) -> Result<u64, StoreError> {
        let (tree, revision) = self.store.snapshot(&self.root).await?;

        let mut table = RoutingTable::default();
        self.walk(&tree, &mut table);
        *self.table.write() = table;

        let (domains, services) = self.route_count();
        tracing::info!(revision, domains, services, "routing table rebuilt from snapshot");

        Ok(revision)
    }

    /// Recursively applies every leaf of a snapshot subtree as an add.
    fn walk(&self, node: &Node, table: &mut RoutingTable) {
        if node.dir {
            for child in &node.children {
                self.walk(child, table);
            }
            return;
        }
        self.apply(table, &node.key, &node.value, true);
    }

    /// Consumes watch events until the store errors.
    ///
    /// `snapshot_revision` is the revision the table was seeded from.
    /// The wait index after each event is `event.revision + 1`, so no
    /// event inside the history window is skipped across reconnects.
    async fn follow(&self, snapshot_revision: u64) -> Result<(), StoreError> {
        let mut wait = snapshot_revision + 1;
        loop {
            let event = self.store.watch(&self.root, wait).await?;
            wait = event.revision + 1;
            self.handle_event(&event);
        }
    }

    /// Applies one watch event to the routing table.
    fn handle_event(&self, event: &StoreEvent) {
        if event.node.dir {
            tracing::debug!(key = %event.node.key, "skipping directory event");
            return;
        }

        let additive = match event.action.additive() {
            Some(additive) => additive,
            None => {
                tracing::warn!(
                    action = %event.action,
                    key = %event.node.key,
                    "ignoring unknown action"
                );
                return;
            }
        };

        let mut table = self.table.write();
        self.apply(&mut table, &event.node.key, &event.node.value, additive);
    }

    /// Applies a single key/value pair; logs and skips anything malformed.
    fn apply(&self, table: &mut RoutingTable, key: &str, value: &str, additive: bool) {
        let route = match keys::parse(&self.root, key) {
            Ok(route) => route,
            Err(error) => {
                tracing::warn!(key = %key, error = %error, "skipping malformed key");
                return;
            }
        };

        match route {
            RouteKey::DomainPrefix { hostname, prefix } => {
                if additive {
                    tracing::debug!(host = %hostname, prefix = %prefix, service = %value, "prefix set");
                    table.domain_mut(&hostname).set_service_prefix(&prefix, value);
                } else {
                    tracing::debug!(host = %hostname, prefix = %prefix, "prefix removed");
                    if let Some(domain) = table.domains.get_mut(&hostname) {
                        domain.remove_service_prefix(&prefix);
                    }
                }
            }
            RouteKey::ServiceBackend { service, backend } => {
                if additive {
                    let addr = match value.parse::<BackendAddr>() {
                        Ok(addr) => addr,
                        Err(error) => {
                            tracing::warn!(key = %key, error = %error, "skipping unusable address");
                            return;
                        }
                    };
                    tracing::debug!(service = %service, backend = %backend, addr = %addr, "address set");
                    table.service_mut(&service).set_addr(&backend, addr);
                } else {
                    tracing::debug!(service = %service, backend = %backend, "address removed");
                    if let Some(service) = table.services.get_mut(&service) {
                        service.remove_addr(&backend);
                    }
                }
            }
        }
    }
}

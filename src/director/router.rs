//! The routing table and request-time lookup.

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::store::Store;

use super::addr::BackendAddr;
use super::domain::Domain;
use super::service::Service;
use super::PickError;

/// The two-level routing state: hostname to domain, service name to
/// backend pool.
///
/// Everything reachable from the two maps is guarded by the single lock
/// in [`Director`], so readers never observe a partially applied event.
#[derive(Debug, Default)]
pub(super) struct RoutingTable {
    pub(super) domains: HashMap<String, Domain>,
    pub(super) services: HashMap<String, Service>,
}

impl RoutingTable {
    /// The domain for `hostname`, created if this is its first mention.
    /// Only the watcher calls this; lookups never create state.
    pub(super) fn domain_mut(&mut self, hostname: &str) -> &mut Domain {
        self.domains.entry(hostname.to_string()).or_default()
    }

    /// The service called `name`, created if this is its first mention.
    pub(super) fn service_mut(&mut self, name: &str) -> &mut Service {
        self.services.entry(name.to_string()).or_default()
    }
}

/// Maps `(host, path)` requests to backend addresses.
///
/// The table starts empty and is populated and kept current by
/// [`Director::watch`], which runs as a background task for the process
/// lifetime. [`Director::pick`] is safe to call concurrently from any
/// number of request handlers and never blocks on the store.
pub struct Director<S> {
    pub(super) store: S,
    pub(super) root: String,
    pub(super) table: RwLock<RoutingTable>,
}

impl<S: Store> Director<S> {
    /// Creates a director reading configuration under `root`.
    pub fn new(store: S, root: &str) -> Self {
        Self {
            store,
            root: normalize_root(root),
            table: RwLock::new(RoutingTable::default()),
        }
    }

    /// Resolves a request to a backend address.
    ///
    /// The host must equal a configured hostname exactly, case-sensitive
    /// as received. Exactly one leading `/` is stripped from `path`
    /// before prefix matching; nothing else is normalized, so `//x`
    /// matches as `/x`. The returned address is a copy, usable after the
    /// call returns.
    pub fn pick(&self, host: &str, path: &str) -> Result<BackendAddr, PickError> {
        let table = self.table.read();

        let domain = table
            .domains
            .get(host)
            .ok_or_else(|| PickError::UndefinedDomain(host.to_string()))?;

        // Prefixes are stored without a leading slash; request paths
        // arrive with one.
        let service_name = domain.pick(path.strip_prefix('/').unwrap_or(path))?;

        let service = table
            .services
            .get(service_name)
            .ok_or_else(|| PickError::UndefinedService(service_name.to_string()))?;

        service.pick()
    }

    /// Returns the number of configured domains and services.
    pub fn route_count(&self) -> (usize, usize) {
        let table = self.table.read();
        (table.domains.len(), table.services.len())
    }
}

/// Normalizes a root to a leading slash and no trailing slash, so keys
/// compare exactly. A root of `/` collapses to the empty string.
fn normalize_root(root: &str) -> String {
    let trimmed = root.trim_end_matches('/');
    if trimmed.is_empty() || trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}

//! Request routing kept in sync with an external configuration store.
//!
//! Provides the routing model (prefix matcher, backend pools, per-host
//! domains) and the director that owns it: a lookup surface for request
//! handlers plus a watch loop that applies store updates.

mod addr;
mod domain;
mod keys;
mod matcher;
mod router;
mod service;
mod watcher;

use thiserror::Error;

pub use addr::{AddrParseError, BackendAddr};
pub use domain::Domain;
pub use matcher::Matcher;
pub use router::Director;
pub use service::Service;

/// Why a lookup could not produce a backend address.
///
/// These are routing outcomes, not transport faults; the frontend decides
/// how to surface them to the client.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PickError {
    /// No routes are configured for the requested host.
    #[error("no routes for host {0:?}")]
    UndefinedDomain(String),

    /// No registered prefix matches the requested path.
    #[error("no matching prefix")]
    NoMatchingPrefix,

    /// A prefix routed to a service that has not been defined.
    #[error("service {0:?} is not defined")]
    UndefinedService(String),

    /// The matched service has no registered backends.
    #[error("no available address")]
    NoAvailableAddress,
}

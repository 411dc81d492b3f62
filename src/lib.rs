//! Dynamically configured reverse-proxy director.
//!
//! A [`Director`] maps each request's `(host, path)` pair to a backend TCP
//! address drawn from a two-level routing table: the request host selects a
//! domain, the longest registered prefix of the request path selects a
//! service, and the service supplies one of its backends round-robin. The
//! table is not static; a background watcher keeps it synchronized with a
//! hierarchical key/value configuration store, so backends registered,
//! updated, or expired in the store appear and disappear in the proxy
//! within one watch round-trip.
//!
//! The HTTP listener and proxy transport live outside this crate; the
//! director exposes only [`Director::pick`]. The concrete store client is
//! equally external, abstracted behind the [`Store`] trait.
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use switchboard::{Director, MemoryStore};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let store = Arc::new(MemoryStore::new());
//! store.set("/proxy/domains/example.com/api/.service", "api");
//! store.set("/proxy/services/api/a", "10.0.0.1:8080");
//!
//! let director = Arc::new(Director::new(store, "/proxy"));
//! tokio::spawn({
//!     let director = Arc::clone(&director);
//!     async move { director.watch().await }
//! });
//!
//! // Request handlers resolve backends without ever touching the store.
//! let addr = director.pick("example.com", "/api/users");
//! # let _ = addr;
//! # }
//! ```

pub mod director;
pub mod store;

pub use director::{BackendAddr, Director, PickError};
pub use store::{MemoryStore, Store};

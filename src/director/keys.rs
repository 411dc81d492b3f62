//! The store's key grammar.
//!
//! Routing configuration lives under a configured root:
//!
//! ```text
//! /<root>/domains/<hostname>/<prefix-segments.../>.service  -> <service-name>
//! /<root>/services/<service-name>/<backend-name>            -> <host>:<port>
//! ```
//!
//! The trailing `.service` segment of a domains key is a command marker,
//! not part of the prefix; `/<root>/domains/<host>/.service` encodes the
//! empty prefix, which matches every path under that host.

use thiserror::Error;

/// The only command defined for domains keys.
const SERVICE_COMMAND: &str = ".service";

/// A store key parsed against the grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteKey {
    /// One path prefix under a hostname, routed to a service by name.
    DomainPrefix { hostname: String, prefix: String },

    /// One named backend slot of a service.
    ServiceBackend { service: String, backend: String },
}

/// Why a store key does not fit the grammar.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyError {
    #[error("key {0:?} is not under the configured root")]
    OutsideRoot(String),

    #[error("key {0:?} has too few components")]
    TooFewComponents(String),

    #[error("key {key:?} has unknown kind {kind:?}")]
    UnknownKind { key: String, kind: String },

    #[error("key {key:?} ends in unknown command {command:?}")]
    UnknownCommand { key: String, command: String },

    #[error("key {0:?} does not name exactly one backend")]
    MalformedBackend(String),
}

/// Parses `key` against a normalized `root` (leading slash, no trailing
/// slash).
pub fn parse(root: &str, key: &str) -> Result<RouteKey, KeyError> {
    // Require the separator after the root so that a root of `/proxy`
    // does not claim keys under `/proxy2`.
    let rest = key
        .strip_prefix(root)
        .and_then(|rest| rest.strip_prefix('/'))
        .ok_or_else(|| KeyError::OutsideRoot(key.to_string()))?;

    let components: Vec<&str> = rest.split('/').collect();
    if components.len() < 3 {
        return Err(KeyError::TooFewComponents(key.to_string()));
    }
    let (kind, name, detail) = (components[0], components[1], &components[2..]);

    match kind {
        "domains" => {
            // detail is non-empty here; the final segment is the command.
            let (command, prefix_segments) = detail.split_last().expect("detail is non-empty");
            if *command != SERVICE_COMMAND {
                return Err(KeyError::UnknownCommand {
                    key: key.to_string(),
                    command: command.to_string(),
                });
            }
            Ok(RouteKey::DomainPrefix {
                hostname: name.to_string(),
                prefix: prefix_segments.join("/"),
            })
        }
        "services" => {
            if detail.len() != 1 {
                return Err(KeyError::MalformedBackend(key.to_string()));
            }
            Ok(RouteKey::ServiceBackend {
                service: name.to_string(),
                backend: detail[0].to_string(),
            })
        }
        _ => Err(KeyError::UnknownKind {
            key: key.to_string(),
            kind: kind.to_string(),
        }),
    }
}

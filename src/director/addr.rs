//! Backend address parsing and validation.
//!
//! Backends register in the store as `host:port` strings. Parsing and
//! validating them once at ingestion means the rest of the director only
//! ever holds well-formed addresses.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Error produced when a backend address string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddrParseError {
    #[error("address {0:?} is missing a port")]
    MissingPort(String),

    #[error("address {0:?} has an empty host")]
    EmptyHost(String),

    #[error("address {addr:?} has an unparsable port {port:?}")]
    InvalidPort { addr: String, port: String },

    #[error("address {0:?} has port 0")]
    ZeroPort(String),
}

/// A backend TCP address: a host plus a non-zero port.
///
/// The host may be an IP address or a DNS name; resolution is left to the
/// proxy transport. `Display` produces the `host:port` form accepted by
/// `FromStr`, with IPv6 hosts bracketed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BackendAddr {
    host: String,
    port: u16,
}

impl BackendAddr {
    /// Creates an address from parts already known to be valid.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        let host = host.into();
        debug_assert!(!host.is_empty());
        debug_assert_ne!(port, 0);
        Self { host, port }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }
}

impl FromStr for BackendAddr {
    type Err = AddrParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Bracketed IPv6 first: [::1]:8080.
        let (host, port) = if let Some(rest) = s.strip_prefix('[') {
            match rest.split_once(']') {
                Some((host, tail)) => match tail.strip_prefix(':') {
                    Some(port) => (host, port),
                    None => return Err(AddrParseError::MissingPort(s.to_string())),
                },
                None => return Err(AddrParseError::MissingPort(s.to_string())),
            }
        } else {
            match s.rsplit_once(':') {
                Some((host, port)) => (host, port),
                None => return Err(AddrParseError::MissingPort(s.to_string())),
            }
        };

        if host.is_empty() {
            return Err(AddrParseError::EmptyHost(s.to_string()));
        }

        let port: u16 = port.parse().map_err(|_| AddrParseError::InvalidPort {
            addr: s.to_string(),
            port: port.to_string(),
        })?;
        if port == 0 {
            return Err(AddrParseError::ZeroPort(s.to_string()));
        }

        Ok(BackendAddr {
            host: host.to_string(),
            port,
        })
    }
}

impl fmt::Display for BackendAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

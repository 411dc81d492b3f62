//! Per-hostname routing rules.

use super::matcher::Matcher;
use super::PickError;

/// The routes configured for a single request hostname.
///
/// Owns one [`Matcher`] whose values are service names.
#[derive(Debug, Default)]
pub struct Domain {
    prefixes: Matcher,
}

impl Domain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Routes paths starting with `prefix` to `service`.
    pub fn set_service_prefix(&mut self, prefix: &str, service: &str) {
        self.prefixes.set_prefix(prefix, service);
    }

    /// Removes the route registered for `prefix`; no-op if absent.
    pub fn remove_service_prefix(&mut self, prefix: &str) {
        self.prefixes.remove_prefix(prefix);
    }

    /// Returns the service name registered for the longest prefix of `path`.
    pub fn pick(&self, path: &str) -> Result<&str, PickError> {
        self.prefixes
            .longest_match(path)
            .ok_or(PickError::NoMatchingPrefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_domain_pick_fails() {
        let domain = Domain::new();
        assert_eq!(domain.pick("api/users"), Err(PickError::NoMatchingPrefix));
    }

    #[test]
    fn test_pick_returns_service_name() {
        let mut domain = Domain::new();
        domain.set_service_prefix("api", "api-svc");

        assert_eq!(domain.pick("api/users"), Ok("api-svc"));
        assert_eq!(domain.pick("other"), Err(PickError::NoMatchingPrefix));
    }

    #[test]
    fn test_longest_prefix_routes_to_its_service() {
        let mut domain = Domain::new();
        domain.set_service_prefix("a", "s1");
        domain.set_service_prefix("a/b", "s2");

        assert_eq!(domain.pick("a/b/x"), Ok("s2"));
        assert_eq!(domain.pick("a/x"), Ok("s1"));
    }

    #[test]
    fn test_removed_prefix_stops_matching() {
        let mut domain = Domain::new();
        domain.set_service_prefix("api", "api-svc");
        domain.remove_service_prefix("api");

        assert_eq!(domain.pick("api/users"), Err(PickError::NoMatchingPrefix));
    }
}

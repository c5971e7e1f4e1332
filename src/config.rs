//! Scanner configuration.
//!
//! `ScannerConfig` is an immutable value constructed once per scan
//! invocation. Deriving a variant from a base config is a clone plus
//! `with_*` overrides; fields not overridden keep the base values.

use std::time::Duration;

/// Configuration for one scan invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannerConfig {
    /// Per-operation deadline: one for the connect, one for the sniff read.
    pub timeout: Duration,
    /// Cap on the number of hosts expanded from a range.
    pub max_hosts: usize,
    /// Maximum simultaneously in-flight probe+sniff tasks.
    pub concurrency: usize,
    /// Read cap for banner capture, in bytes.
    pub banner_max_bytes: usize,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(2),
            max_hosts: 512,
            concurrency: 200,
            banner_max_bytes: 2048,
        }
    }
}

impl ScannerConfig {
    /// Create a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the per-operation timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the expanded-host cap.
    pub fn with_max_hosts(mut self, max_hosts: usize) -> Self {
        self.max_hosts = max_hosts;
        self
    }

    /// Set the concurrency bound.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Set the banner read cap.
    pub fn with_banner_max_bytes(mut self, banner_max_bytes: usize) -> Self {
        self.banner_max_bytes = banner_max_bytes;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = ScannerConfig::default();
        assert_eq!(cfg.timeout, Duration::from_secs(2));
        assert_eq!(cfg.max_hosts, 512);
        assert_eq!(cfg.concurrency, 200);
        assert_eq!(cfg.banner_max_bytes, 2048);
    }

    #[test]
    fn test_overrides_keep_base_fields() {
        let base = ScannerConfig::default();
        let derived = base
            .clone()
            .with_timeout(Duration::from_millis(500))
            .with_concurrency(16);

        assert_eq!(derived.timeout, Duration::from_millis(500));
        assert_eq!(derived.concurrency, 16);
        assert_eq!(derived.max_hosts, base.max_hosts);
        assert_eq!(derived.banner_max_bytes, base.banner_max_bytes);
    }
}

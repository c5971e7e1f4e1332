//! Target expansion: CIDR ranges to usable host addresses.
//!
//! Expands a network range like `192.168.0.0/24` into the ordered list of
//! host addresses inside it. For IPv4 prefixes shorter than /31 the network
//! and broadcast addresses are excluded; /31 and /32 keep every address.

use ipnetwork::IpNetwork;
use std::net::IpAddr;

/// Error type for range parsing.
#[derive(Debug, Clone, thiserror::Error)]
pub enum RangeError {
    #[error("invalid network range: {0}")]
    InvalidRange(String),
}

/// Expand a CIDR range into host addresses, truncated at `max_hosts`.
///
/// A cap of `Some(0)` yields an empty list and is not an error: it means
/// "nothing to scan", not "unbounded". Passing `None` enumerates the whole
/// range; the expansion is lazy, so a cap never materializes more addresses
/// than it returns.
pub fn expand(range: &str, max_hosts: Option<usize>) -> Result<Vec<String>, RangeError> {
    let network: IpNetwork = range
        .trim()
        .parse()
        .map_err(|_| RangeError::InvalidRange(range.trim().to_string()))?;

    if max_hosts == Some(0) {
        return Ok(Vec::new());
    }

    let hosts = network
        .iter()
        .filter(move |ip| is_usable_host(&network, ip))
        .map(|ip| ip.to_string());

    Ok(match max_hosts {
        Some(cap) => hosts.take(cap).collect(),
        None => hosts.collect(),
    })
}

/// Whether an address is a usable host inside its network.
///
/// Excludes the IPv4 network and broadcast addresses when the prefix is
/// shorter than /31. Point-to-point (/31) and host (/32) prefixes have no
/// such reserved addresses, and IPv6 has no broadcast at all.
fn is_usable_host(network: &IpNetwork, ip: &IpAddr) -> bool {
    if let (IpNetwork::V4(net), IpAddr::V4(addr)) = (network, ip) {
        if net.prefix() < 31 {
            return *addr != net.network() && *addr != net.broadcast();
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_expand_slash_30() {
        // /30 has 4 addresses, 2 of them usable
        let hosts = expand("192.168.0.0/30", None).unwrap();
        assert_eq!(hosts, vec!["192.168.0.1", "192.168.0.2"]);
    }

    #[test]
    fn test_expand_slash_24_excludes_edges() {
        let hosts = expand("10.0.0.0/24", None).unwrap();
        assert_eq!(hosts.len(), 254);
        assert_eq!(hosts.first().unwrap(), "10.0.0.1");
        assert_eq!(hosts.last().unwrap(), "10.0.0.254");
        assert!(!hosts.contains(&"10.0.0.0".to_string()));
        assert!(!hosts.contains(&"10.0.0.255".to_string()));
    }

    #[test]
    fn test_expand_slash_31_and_32() {
        assert_eq!(
            expand("10.0.0.0/31", None).unwrap(),
            vec!["10.0.0.0", "10.0.0.1"]
        );
        assert_eq!(expand("10.0.0.7/32", None).unwrap(), vec!["10.0.0.7"]);
    }

    #[test]
    fn test_expand_cap_truncates() {
        let hosts = expand("192.168.1.0/24", Some(10)).unwrap();
        assert_eq!(hosts.len(), 10);
        assert_eq!(hosts[0], "192.168.1.1");
        assert_eq!(hosts[9], "192.168.1.10");
    }

    #[test]
    fn test_expand_cap_zero_is_empty() {
        assert!(expand("192.168.1.0/24", Some(0)).unwrap().is_empty());
    }

    #[test]
    fn test_expand_cap_larger_than_range() {
        let hosts = expand("192.168.0.0/30", Some(100)).unwrap();
        assert_eq!(hosts.len(), 2);
    }

    #[test]
    fn test_expand_all_distinct() {
        let hosts = expand("172.16.0.0/26", None).unwrap();
        let unique: HashSet<_> = hosts.iter().collect();
        assert_eq!(unique.len(), hosts.len());
    }

    #[test]
    fn test_expand_ipv6() {
        let hosts = expand("2001:db8::/126", None).unwrap();
        assert_eq!(hosts.len(), 4);
    }

    #[test]
    fn test_expand_invalid_range() {
        assert!(matches!(
            expand("not-a-network", None),
            Err(RangeError::InvalidRange(_))
        ));
        assert!(matches!(
            expand("300.0.0.0/24", None),
            Err(RangeError::InvalidRange(_))
        ));
        assert!(matches!(
            expand("10.0.0.0/40", None),
            Err(RangeError::InvalidRange(_))
        ));
    }
}

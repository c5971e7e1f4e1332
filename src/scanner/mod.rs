//! Scan orchestration.
//!
//! Fans the host×port Cartesian product out as independent probe+sniff tasks
//! under a global admission gate, and collects results as tasks complete.
//! Completion order is not input order; the only ordering guarantee is that
//! the returned set is complete — exactly one result per submitted pair.

pub mod probe;

use crate::banner;
use crate::config::ScannerConfig;
use crate::types::Port;
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, info};

pub use probe::check_port;

/// Upper bound on tasks admitted into the fan-out stream at once. The
/// semaphore is the actual concurrency bound; this only caps queued futures.
const MAX_PENDING: usize = 1024;

/// The findings for one (host, port) pair.
///
/// `service` and `banner` are populated only for open ports where the sniff
/// produced data. Immutable after construction; persisted verbatim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanResult {
    pub ip: String,
    pub port: u16,
    pub is_open: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub banner: Option<String>,
    pub scanned_at: DateTime<Utc>,
}

/// Scan every (host, port) pair and return the complete result set.
///
/// At most `config.concurrency` tasks are in flight at any instant; a task
/// holds its admission slot for its whole probe+sniff lifetime and releases
/// it when it finishes, on every path. A task's connection failure degrades
/// to a closed result and never aborts the rest of the scan.
pub async fn run_scan(
    hosts: &[String],
    ports: &[Port],
    config: &ScannerConfig,
) -> Vec<ScanResult> {
    let pairs: Vec<(String, u16)> = hosts
        .iter()
        .flat_map(|host| ports.iter().map(move |port| (host.clone(), port.as_u16())))
        .collect();

    info!(
        hosts = hosts.len(),
        ports = ports.len(),
        pairs = pairs.len(),
        concurrency = config.concurrency,
        "starting scan"
    );

    let config = config.clone();
    let results = run_gated(pairs, config.concurrency, move |(host, port)| {
        let config = config.clone();
        async move { scan_pair(host, port, &config).await }
    })
    .await;

    info!(
        open = results.iter().filter(|r| r.is_open).count(),
        total = results.len(),
        "scan finished"
    );
    results
}

/// Probe one pair and, if it is reachable, sniff its banner.
async fn scan_pair(host: String, port: u16, config: &ScannerConfig) -> ScanResult {
    let stream = probe::try_connect(&host, port, config.timeout).await;
    let is_open = stream.is_some();

    let (service, banner) = match stream {
        Some(stream) => {
            let service = banner::service_label(port).to_string();
            let banner =
                banner::sniff(stream, &host, port, config.timeout, config.banner_max_bytes).await;
            (Some(service), banner)
        }
        None => (None, None),
    };

    debug!(ip = %host, port, is_open, has_banner = banner.is_some(), "probed");

    ScanResult {
        ip: host,
        port,
        is_open,
        service,
        banner,
        scanned_at: Utc::now(),
    }
}

/// Run every item through `task` with at most `limit` tasks past admission
/// at once. Results come back in completion order.
///
/// Generic over the task body so the admission behavior is testable in
/// isolation.
async fn run_gated<T, R, F, Fut>(items: Vec<T>, limit: usize, task: F) -> Vec<R>
where
    F: Fn(T) -> Fut + Clone,
    Fut: Future<Output = R>,
{
    let gate = Arc::new(Semaphore::new(limit.max(1)));

    stream::iter(items)
        .map(|item| {
            let gate = Arc::clone(&gate);
            let task = task.clone();
            async move {
                // Held until the task future completes, success or failure
                let _permit = gate.acquire().await.expect("admission gate closed");
                task(item).await
            }
        })
        .buffer_unordered(MAX_PENDING)
        .collect()
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::io::AsyncWriteExt;
    use tokio::net::TcpListener;

    fn test_config() -> ScannerConfig {
        ScannerConfig::default()
            .with_timeout(Duration::from_millis(500))
            .with_concurrency(16)
    }

    fn ports(raw: &[u16]) -> Vec<Port> {
        raw.iter().map(|&p| Port::new(p).unwrap()).collect()
    }

    /// Bind a listener that greets every connection, returning its port.
    async fn spawn_greeter(greeting: &'static [u8]) -> u16 {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let _ = socket.write_all(greeting).await;
            }
        });
        port
    }

    /// A port that was just released and is therefore closed.
    async fn closed_port() -> u16 {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);
        port
    }

    #[tokio::test]
    async fn test_gate_bounds_active_tasks() {
        let active = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let limit = 4;
        let (task_active, task_peak) = (Arc::clone(&active), Arc::clone(&peak));
        run_gated((0..64).collect(), limit, move |_: usize| {
            let active = Arc::clone(&task_active);
            let peak = Arc::clone(&task_peak);
            async move {
                let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(5)).await;
                active.fetch_sub(1, Ordering::SeqCst);
            }
        })
        .await;

        assert!(peak.load(Ordering::SeqCst) <= limit);
        assert!(peak.load(Ordering::SeqCst) > 0);
        assert_eq!(active.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_gate_returns_every_item() {
        let outputs = run_gated((0..50).collect(), 3, |n: u32| async move { n }).await;
        let unique: HashSet<u32> = outputs.iter().copied().collect();
        assert_eq!(unique.len(), 50);
    }

    #[tokio::test]
    async fn test_scan_is_complete_over_cartesian_product() {
        let open = spawn_greeter(b"hello\r\n").await;
        let closed = closed_port().await;

        let hosts = vec!["127.0.0.1".to_string()];
        let results = run_scan(&hosts, &ports(&[open, closed]), &test_config()).await;

        assert_eq!(results.len(), 2);
        let pairs: HashSet<(String, u16)> =
            results.iter().map(|r| (r.ip.clone(), r.port)).collect();
        assert_eq!(pairs.len(), 2, "one result per pair, no duplicates");

        let open_result = results.iter().find(|r| r.port == open).unwrap();
        assert!(open_result.is_open);
        assert_eq!(open_result.service.as_deref(), Some("unknown"));
        assert_eq!(open_result.banner.as_deref(), Some("hello\r\n"));

        let closed_result = results.iter().find(|r| r.port == closed).unwrap();
        assert!(!closed_result.is_open);
        assert!(closed_result.service.is_none());
        assert!(closed_result.banner.is_none());
    }

    #[tokio::test]
    async fn test_scan_all_unreachable_still_complete() {
        let mut unreachable = Vec::new();
        for _ in 0..3 {
            unreachable.push(closed_port().await);
        }

        let hosts = vec!["127.0.0.1".to_string()];
        let results = run_scan(&hosts, &ports(&unreachable), &test_config()).await;

        assert_eq!(results.len(), 3);
        assert!(results.iter().all(|r| !r.is_open));
        assert!(results.iter().all(|r| r.banner.is_none() && r.service.is_none()));
    }

    #[tokio::test]
    async fn test_scan_empty_inputs() {
        let results = run_scan(&[], &ports(&[80]), &test_config()).await;
        assert!(results.is_empty());

        let hosts = vec!["127.0.0.1".to_string()];
        let results = run_scan(&hosts, &[], &test_config()).await;
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_scan_concurrency_one_still_completes() {
        let open = spawn_greeter(b"SSH-2.0-test\r\n").await;
        let closed = closed_port().await;

        let hosts = vec!["127.0.0.1".to_string()];
        let config = test_config().with_concurrency(1);
        let results = run_scan(&hosts, &ports(&[open, closed]), &config).await;
        assert_eq!(results.len(), 2);
    }

    #[tokio::test]
    async fn test_scan_persist_and_retrieve_roundtrip() {
        let open = spawn_greeter(b"220 ready\r\n").await;
        let closed = closed_port().await;

        let hosts = vec!["127.0.0.1".to_string()];
        let results = run_scan(&hosts, &ports(&[open, closed]), &test_config()).await;
        assert_eq!(results.len(), 2);

        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("scans.sqlite3");
        crate::storage::init_db(&db).unwrap();
        crate::storage::save_results(&db, &results).unwrap();

        let stored = crate::storage::get_last(&db, 10).unwrap();
        assert_eq!(stored.len(), 2);
        assert!(stored.iter().any(|r| r.port == open && r.is_open));
        assert!(stored.iter().any(|r| r.port == closed && !r.is_open));
    }

    #[tokio::test]
    async fn test_result_serializes_without_empty_optionals() {
        let result = ScanResult {
            ip: "10.0.0.1".to_string(),
            port: 22,
            is_open: false,
            service: None,
            banner: None,
            scanned_at: Utc::now(),
        };
        let json = serde_json::to_string(&result).unwrap();
        assert!(!json.contains("service"));
        assert!(!json.contains("banner"));
    }
}

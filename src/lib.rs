//! # meshscan - Concurrent Network Reconnaissance Engine
//!
//! meshscan expands a CIDR range into target hosts, probes a set of ports on
//! each host under a bounded level of parallelism, opportunistically grabs a
//! service banner from open ports, and persists the findings to SQLite.
//!
//! ## Features
//!
//! - **CIDR expansion**: usable-host enumeration with a configurable cap
//! - **Bounded concurrency**: a global admission gate limits in-flight tasks
//! - **Banner grabbing**: HTTP-aware active probe or passive first read
//! - **Partial-failure tolerance**: unreachable targets are data, not errors
//! - **Result persistence**: append-only SQLite storage with last-N queries
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use meshscan::{expand, parse_ports, run_scan, ScannerConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let hosts = expand("192.168.0.0/29", Some(16)).unwrap();
//!     let ports = parse_ports("22,80,443").unwrap();
//!     let config = ScannerConfig::default();
//!
//!     let results = run_scan(&hosts, &ports, &config).await;
//!     for result in results.iter().filter(|r| r.is_open) {
//!         println!("{}:{} {:?}", result.ip, result.port, result.banner);
//!     }
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`types`] - port and target parsing with newtype validation
//! - [`config`] - immutable scan configuration with builder overrides
//! - [`scanner`] - the orchestrator and the TCP connect prober
//! - [`banner`] - sniff policy and best-effort banner capture
//! - [`storage`] - SQLite-backed result persistence
//! - [`error`] - store error types
//! - [`output`] - plain terminal rendering for the CLI

pub mod banner;
pub mod cli;
pub mod config;
pub mod error;
pub mod output;
pub mod scanner;
pub mod storage;
pub mod types;

// Re-export the programmatic entry points
pub use banner::{grab_banner, policy_for_port, service_label, SniffPolicy};
pub use config::ScannerConfig;
pub use error::{StoreError, StoreResult};
pub use scanner::{check_port, run_scan, ScanResult};
pub use storage::{get_last, init_db, save_results, ScanStore};
pub use types::{expand, parse_ports, Port, PortError, PortSpec, RangeError};

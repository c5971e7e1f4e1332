//! CLI subcommand definitions and handlers.
//!
//! - `meshscan scan <CIDR>` - expand, scan, persist, print
//! - `meshscan last` - show the most recent stored results

use crate::config::ScannerConfig;
use crate::output;
use crate::scanner::run_scan;
use crate::storage;
use crate::types::{expand, parse_ports};
use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Duration;

/// meshscan - a concurrent network reconnaissance engine.
///
/// Expands a CIDR range into hosts, probes the given ports under bounded
/// concurrency, grabs banners from open ports and records everything in a
/// SQLite database.
#[derive(Parser, Debug)]
#[command(name = "meshscan")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "CIDR + ports -> probed services, persisted", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scan a network range for open ports
    #[command(alias = "s")]
    Scan(ScanCommand),

    /// Show the most recent stored results
    #[command(alias = "l")]
    Last(LastCommand),
}

/// Scan a network range for open ports.
#[derive(Args, Debug)]
pub struct ScanCommand {
    /// Network range to scan, in CIDR notation (e.g. 192.168.0.0/24)
    #[arg(value_name = "CIDR")]
    pub range: String,

    /// Ports to scan (e.g. "80", "80,443", "20-25,80")
    #[arg(short, long, default_value = "22,80,443")]
    pub ports: String,

    /// Path to the SQLite results database
    #[arg(long, default_value = "meshscan.sqlite3", env = "MESHSCAN_DB")]
    pub db: PathBuf,

    /// Per-operation timeout in milliseconds
    #[arg(short = 't', long, default_value = "2000")]
    pub timeout: u64,

    /// Maximum number of hosts expanded from the range
    #[arg(long, default_value = "512")]
    pub max_hosts: usize,

    /// Maximum simultaneous probe tasks
    #[arg(short = 'c', long, default_value = "200", env = "MESHSCAN_CONCURRENCY")]
    pub concurrency: usize,

    /// Maximum banner bytes read per open port
    #[arg(long = "banner-bytes", default_value = "2048")]
    pub banner_bytes: usize,

    /// Show closed ports in the output
    #[arg(long)]
    pub show_closed: bool,

    /// Don't persist results to the database
    #[arg(long)]
    pub no_save: bool,
}

impl ScanCommand {
    /// Execute the scan command.
    pub async fn execute(&self) -> anyhow::Result<()> {
        let config = ScannerConfig::new()
            .with_timeout(Duration::from_millis(self.timeout))
            .with_max_hosts(self.max_hosts)
            .with_concurrency(self.concurrency)
            .with_banner_max_bytes(self.banner_bytes);

        let hosts = expand(&self.range, Some(config.max_hosts))
            .with_context(|| format!("cannot expand range '{}'", self.range))?;
        let ports = parse_ports(&self.ports)
            .with_context(|| format!("cannot parse ports '{}'", self.ports))?;

        if !self.no_save {
            storage::init_db(&self.db)
                .with_context(|| format!("cannot initialize database {}", self.db.display()))?;
        }

        output::print_scan_header(&self.range, hosts.len(), ports.len())?;

        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .expect("static spinner template"),
        );
        spinner.set_message(format!("probing {} pairs", hosts.len() * ports.len()));
        spinner.enable_steady_tick(Duration::from_millis(100));

        let results = run_scan(&hosts, &ports, &config).await;
        spinner.finish_and_clear();

        if !self.no_save {
            storage::save_results(&self.db, &results)
                .with_context(|| format!("cannot save results to {}", self.db.display()))?;
        }

        output::print_results(&results, self.show_closed)?;
        Ok(())
    }
}

/// Show the most recent stored results.
#[derive(Args, Debug)]
pub struct LastCommand {
    /// Path to the SQLite results database
    #[arg(long, default_value = "meshscan.sqlite3", env = "MESHSCAN_DB")]
    pub db: PathBuf,

    /// Number of entries to show
    #[arg(short = 'n', long, default_value = "50")]
    pub limit: usize,
}

impl LastCommand {
    /// Execute the last command.
    pub fn execute(&self) -> anyhow::Result<()> {
        let results = storage::get_last(&self.db, self.limit)
            .with_context(|| format!("cannot read results from {}", self.db.display()))?;
        output::print_history(&results)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_scan_defaults() {
        let cli = Cli::try_parse_from(["meshscan", "scan", "10.0.0.0/29"]).unwrap();
        match cli.command {
            Commands::Scan(cmd) => {
                assert_eq!(cmd.range, "10.0.0.0/29");
                assert_eq!(cmd.ports, "22,80,443");
                assert_eq!(cmd.concurrency, 200);
                assert!(!cmd.no_save);
            }
            _ => panic!("expected scan subcommand"),
        }
    }

    #[test]
    fn test_last_alias() {
        let cli = Cli::try_parse_from(["meshscan", "l", "-n", "5"]).unwrap();
        match cli.command {
            Commands::Last(cmd) => assert_eq!(cmd.limit, 5),
            _ => panic!("expected last subcommand"),
        }
    }
}

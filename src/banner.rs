//! Banner grabbing for open TCP ports.
//!
//! A banner is a short text fragment read from a service right after
//! connecting, used as a weak identification signal. Two policies, chosen by
//! port number: HTTP-associated ports get a minimal request first, everything
//! else is read passively (SSH, SMTP and friends greet on their own).
//!
//! Capture is best-effort throughout: any I/O failure, timeout, or empty
//! read yields `None` and never an error.

use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;

use crate::scanner::probe;

/// How to elicit a banner from a given port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SniffPolicy {
    /// Send a minimal HTTP/1.0 request, then read.
    Active,
    /// Read immediately after connecting, sending nothing.
    Passive,
}

/// Map a port number to its sniff policy.
///
/// The heuristic is deliberately coarse: the conventional HTTP ports get the
/// active probe, everything else is treated as greet-first.
pub const fn policy_for_port(port: u16) -> SniffPolicy {
    match port {
        80 | 443 | 8000 | 8080 => SniffPolicy::Active,
        _ => SniffPolicy::Passive,
    }
}

/// Service label recorded for an open port, from the same heuristic.
pub const fn service_label(port: u16) -> &'static str {
    match policy_for_port(port) {
        SniffPolicy::Active => "http",
        SniffPolicy::Passive => "unknown",
    }
}

/// Grab a banner from an already-established connection.
///
/// Consumes the stream; it is closed on every exit path.
pub(crate) async fn sniff(
    stream: TcpStream,
    host: &str,
    port: u16,
    deadline: Duration,
    max_bytes: usize,
) -> Option<String> {
    match policy_for_port(port) {
        SniffPolicy::Active => sniff_active(stream, host, deadline, max_bytes).await,
        SniffPolicy::Passive => read_capped(stream, deadline, max_bytes).await,
    }
}

/// Open a connection to `host:port` and grab a banner from it.
pub async fn grab_banner(
    host: &str,
    port: u16,
    deadline: Duration,
    max_bytes: usize,
) -> Option<String> {
    let stream = probe::try_connect(host, port, deadline).await?;
    sniff(stream, host, port, deadline, max_bytes).await
}

async fn sniff_active(
    mut stream: TcpStream,
    host: &str,
    deadline: Duration,
    max_bytes: usize,
) -> Option<String> {
    let request = format!(
        "GET / HTTP/1.0\r\nHost: {host}\r\nUser-Agent: meshscan/{}\r\n\r\n",
        env!("CARGO_PKG_VERSION")
    );
    timeout(deadline, stream.write_all(request.as_bytes()))
        .await
        .ok()?
        .ok()?;

    read_capped(stream, deadline, max_bytes).await
}

/// One read of up to `max_bytes`, bounded by the deadline.
async fn read_capped(
    mut stream: TcpStream,
    deadline: Duration,
    max_bytes: usize,
) -> Option<String> {
    let mut buffer = vec![0u8; max_bytes];
    let n = timeout(deadline, stream.read(&mut buffer)).await.ok()?.ok()?;
    if n == 0 {
        return None;
    }
    Some(decode_banner(&buffer[..n]))
}

/// Decode captured bytes as UTF-8, falling back to a one-byte-per-character
/// decode so a read is never discarded over encoding alone.
fn decode_banner(data: &[u8]) -> String {
    match std::str::from_utf8(data) {
        Ok(text) => text.to_string(),
        Err(_) => data.iter().map(|&b| b as char).collect(),
    }
}

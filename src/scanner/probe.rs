//! Port probing via bounded-time TCP connects.
//!
//! The prober reports reachability only. Every failure mode — refused,
//! timeout, unreachable, resolution failure — collapses to "closed"; the
//! engine reports reachability, not diagnosis.

use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::trace;

/// Attempt a TCP connect within the deadline, keeping the stream on success.
///
/// The returned stream is handed to the banner sniffer when the caller wants
/// one; dropping it closes the connection.
pub(crate) async fn try_connect(host: &str, port: u16, deadline: Duration) -> Option<TcpStream> {
    match timeout(deadline, TcpStream::connect((host, port))).await {
        Ok(Ok(stream)) => Some(stream),
        Ok(Err(e)) => {
            trace!(host, port, error = %e, "connect failed");
            None
        }
        Err(_) => {
            trace!(host, port, "connect timed out");
            None
        }
    }
}

/// Check whether a TCP connection to `host:port` can be established within
/// the deadline. The connection is closed immediately.
pub async fn check_port(host: &str, port: u16, deadline: Duration) -> bool {
    try_connect(host, port, deadline).await.is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn test_open_port() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        assert!(check_port("127.0.0.1", port, Duration::from_secs(1)).await);
    }

    #[tokio::test]
    async fn test_closed_port() {
        // Bind and drop so the port is known-free
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        assert!(!check_port("127.0.0.1", port, Duration::from_secs(1)).await);
    }

    #[tokio::test]
    async fn test_unresolvable_host() {
        assert!(!check_port("host.invalid", 80, Duration::from_secs(1)).await);
    }
}

use std::io;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, warn};

use super::LogEvent;

/// Plain-TCP client for a line-delimited JSON collector (Logstash `tcp` input style)
///
/// Each send opens a fresh connection, writes one line and closes. Connect
/// and write are each bounded by the configured timeout.
#[derive(Debug, Clone)]
pub struct CollectorClient {
    address: String,
    timeout: Duration,
}

impl CollectorClient {
    pub fn new(address: impl Into<String>, timeout: Duration) -> Self {
        Self {
            address: address.into(),
            timeout,
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    /// Deliver one event; returns whether the write completed.
    ///
    /// Failures are reported to the local log and swallowed.
    pub async fn send(&self, event: &LogEvent) -> bool {
        match self.write_line(event.to_line().as_bytes()).await {
            Ok(()) => {
                debug!("Log sent: {}", event.message);
                true
            }
            Err(e) => {
                warn!(collector = %self.address, "Failed to send log: {}", e);
                false
            }
        }
    }

    async fn write_line(&self, payload: &[u8]) -> io::Result<()> {
        let mut stream = timeout(self.timeout, TcpStream::connect(self.address.as_str()))
            .await
            .map_err(|_| timed_out("connect"))??;

        timeout(self.timeout, async {
            stream.write_all(payload).await?;
            stream.shutdown().await
        })
        .await
        .map_err(|_| timed_out("write"))?
    }
}

fn timed_out(phase: &str) -> io::Error {
    io::Error::new(io::ErrorKind::TimedOut, format!("{phase} timed out"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{EventLevel, EventOrigin};
    use serde_json::{Value, json};
    use tokio::io::AsyncReadExt;
    use tokio::net::TcpListener;
    use tracing_test::traced_test;

    fn event(message: &str) -> LogEvent {
        LogEvent::new(
            &EventOrigin::new("identidock", "test-host"),
            EventLevel::Info,
            message.to_string(),
            json!({"endpoint": "/monster", "cache_status": "miss"}),
        )
    }

    #[tokio::test]
    async fn test_writes_one_json_line_per_connection() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap().to_string();

        let reader = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut received = String::new();
            socket.read_to_string(&mut received).await.unwrap();
            received
        });

        let client = CollectorClient::new(address, Duration::from_secs(2));
        assert!(client.send(&event("Cache miss for: Alice")).await);

        let received = reader.await.unwrap();
        assert!(received.ends_with('\n'));
        let parsed: Value = serde_json::from_str(received.trim_end()).unwrap();
        assert_eq!(parsed["message"], "Cache miss for: Alice");
        assert_eq!(parsed["cache_status"], "miss");
        assert_eq!(parsed["hostname"], "test-host");
    }

    #[tokio::test]
    #[traced_test]
    async fn test_unreachable_collector_is_swallowed() {
        // Bind then drop to get a port nobody listens on
        let address = {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            listener.local_addr().unwrap().to_string()
        };

        let client = CollectorClient::new(address, Duration::from_millis(500));
        assert!(!client.send(&event("nobody home")).await);
        assert!(logs_contain("Failed to send log"));
    }

    #[tokio::test]
    async fn test_unresolvable_host_returns_false() {
        let client = CollectorClient::new("collector.invalid:5001", Duration::from_millis(500));
        assert!(!client.send(&event("lost")).await);
    }
}

use serde_json::Value;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::{CollectorClient, EventLevel, EventOrigin, EventSink, LogEvent};
use crate::config::EventLogConfig;

/// Delivery counters shared between the sink handles and the shipper
#[derive(Debug, Default)]
struct Counters {
    accepted: AtomicU64,
    dropped: AtomicU64,
    delivered: AtomicU64,
    failed: AtomicU64,
}

/// Point-in-time copy of the delivery counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EventStats {
    /// Events that made it into the queue
    pub accepted: u64,
    /// Events rejected because the queue was full or closed
    pub dropped: u64,
    /// Events written to the collector
    pub delivered: u64,
    /// Events abandoned after exhausting delivery attempts
    pub failed: u64,
}

/// Non-blocking sink: events go into a bounded queue and a background task
/// ships them to the collector.
///
/// When the queue is full the new event is dropped. Each queued event gets up
/// to `max_attempts` delivery attempts, then it is dropped too.
#[derive(Clone)]
pub struct QueuedEventSink {
    origin: EventOrigin,
    sender: mpsc::Sender<LogEvent>,
    counters: Arc<Counters>,
}

impl QueuedEventSink {
    /// Create the sink and start its shipper on the current runtime.
    ///
    /// The shipper resolves to the final delivery counters once every sink
    /// handle is dropped and the queue is drained.
    pub fn spawn(config: &EventLogConfig, origin: EventOrigin) -> (Self, JoinHandle<EventStats>) {
        let (sender, receiver) = mpsc::channel(config.queue_capacity);
        let counters = Arc::new(Counters::default());

        let shipper = EventShipper {
            receiver,
            client: CollectorClient::new(config.address(), config.timeout),
            max_attempts: config.max_attempts.max(1),
            counters: counters.clone(),
        };
        debug!(
            collector = %shipper.client.address(),
            capacity = config.queue_capacity,
            "Starting event shipper"
        );
        let handle = tokio::spawn(shipper.run());

        (
            Self {
                origin,
                sender,
                counters,
            },
            handle,
        )
    }
}

impl EventSink for QueuedEventSink {
    fn emit(&self, level: EventLevel, message: String, extra: Value) -> bool {
        let event = LogEvent::new(&self.origin, level, message, extra);
        match self.sender.try_send(event) {
            Ok(()) => {
                self.counters.accepted.fetch_add(1, Ordering::Relaxed);
                true
            }
            Err(TrySendError::Full(event)) => {
                self.counters.dropped.fetch_add(1, Ordering::Relaxed);
                warn!("Event queue full, dropping event: {}", event.message);
                false
            }
            Err(TrySendError::Closed(event)) => {
                self.counters.dropped.fetch_add(1, Ordering::Relaxed);
                warn!("Event shipper stopped, dropping event: {}", event.message);
                false
            }
        }
    }
}

impl Counters {
    fn snapshot(&self) -> EventStats {
        EventStats {
            accepted: self.accepted.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
            delivered: self.delivered.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }
}

struct EventShipper {
    receiver: mpsc::Receiver<LogEvent>,
    client: CollectorClient,
    max_attempts: u32,
    counters: Arc<Counters>,
}

impl EventShipper {
    async fn run(mut self) -> EventStats {
        while let Some(event) = self.receiver.recv().await {
            self.deliver(&event).await;
        }
        let stats = self.counters.snapshot();
        debug!(
            delivered = stats.delivered,
            failed = stats.failed,
            dropped = stats.dropped,
            "Event shipper stopped"
        );
        stats
    }

    async fn deliver(&self, event: &LogEvent) {
        for attempt in 1..=self.max_attempts {
            if self.client.send(event).await {
                self.counters.delivered.fetch_add(1, Ordering::Relaxed);
                return;
            }
            debug!(attempt, max_attempts = self.max_attempts, "Event delivery attempt failed");
        }
        self.counters.failed.fetch_add(1, Ordering::Relaxed);
    }
}

#[cfg(test)]
impl QueuedEventSink {
    /// Sink over an externally owned channel, with no shipper attached
    fn detached(capacity: usize) -> (Self, mpsc::Receiver<LogEvent>) {
        let (sender, receiver) = mpsc::channel(capacity);
        (
            Self {
                origin: EventOrigin::new("identidock", "test-host"),
                sender,
                counters: Arc::new(Counters::default()),
            },
            receiver,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::{Duration, Instant};
    use tokio::io::AsyncReadExt;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn test_full_queue_drops_without_blocking() {
        let (sink, mut receiver) = QueuedEventSink::detached(1);

        assert!(sink.emit(EventLevel::Info, "first".to_string(), json!({})));
        assert!(!sink.emit(EventLevel::Info, "second".to_string(), json!({})));

        let stats = sink.counters.snapshot();
        assert_eq!(stats.accepted, 1);
        assert_eq!(stats.dropped, 1);
        assert_eq!(receiver.recv().await.unwrap().message, "first");
    }

    #[tokio::test]
    async fn test_closed_queue_drops() {
        let (sink, receiver) = QueuedEventSink::detached(4);
        drop(receiver);

        assert!(!sink.emit(EventLevel::Error, "late".to_string(), json!({})));
        assert_eq!(sink.counters.snapshot().dropped, 1);
    }

    #[tokio::test]
    async fn test_shipper_delivers_and_drains_on_shutdown() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();

        let collector = tokio::spawn(async move {
            let mut lines = Vec::new();
            for _ in 0..3 {
                let (mut socket, _) = listener.accept().await.unwrap();
                let mut line = String::new();
                socket.read_to_string(&mut line).await.unwrap();
                lines.push(line);
            }
            lines
        });

        let config = EventLogConfig {
            host: address.ip().to_string(),
            port: address.port(),
            ..EventLogConfig::default()
        };
        let (sink, shipper) = QueuedEventSink::spawn(&config, EventOrigin::new("identidock", "h"));

        for i in 0..3 {
            assert!(sink.emit(EventLevel::Info, format!("event {i}"), json!({"seq": i})));
        }
        // The shipper stops once the last handle is gone and the queue is empty
        drop(sink);
        let stats = shipper.await.unwrap();

        let lines = collector.await.unwrap();
        assert_eq!(stats.accepted, 3);
        assert_eq!(stats.delivered, 3);
        let messages: Vec<String> = lines
            .iter()
            .map(|l| serde_json::from_str::<Value>(l.trim_end()).unwrap()["message"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(messages, vec!["event 0", "event 1", "event 2"]);
    }

    #[tokio::test]
    async fn test_emit_is_fast_when_collector_is_down() {
        let address = {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            listener.local_addr().unwrap()
        };
        let config = EventLogConfig {
            host: address.ip().to_string(),
            port: address.port(),
            max_attempts: 2,
            timeout: Duration::from_millis(200),
            ..EventLogConfig::default()
        };
        let (sink, shipper) = QueuedEventSink::spawn(&config, EventOrigin::new("identidock", "h"));

        let started = Instant::now();
        for i in 0..10 {
            sink.emit(EventLevel::Info, format!("event {i}"), json!({}));
        }
        assert!(started.elapsed() < Duration::from_millis(100));

        drop(sink);
        let stats = shipper.await.unwrap();

        assert_eq!(stats.accepted, 10);
        assert_eq!(stats.delivered, 0);
        assert_eq!(stats.failed, 10);
    }
}

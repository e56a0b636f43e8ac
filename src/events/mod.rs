//! Operational event shipping
//!
//! Every request phase produces a structured [`LogEvent`] that is sent to a
//! remote collector as one line of JSON. Delivery is best-effort and
//! at-most-once: emitting never blocks the request and never fails it.
//!
//! # Components
//!
//! - [`EventSink`]: the capability handlers and services depend on
//! - [`QueuedEventSink`]: bounded queue drained by a background shipper
//! - [`CollectorClient`]: one short-lived TCP connection per event
//! - [`NullEventSink`] / [`MemoryEventSink`]: disabled shipping and in-memory capture
//!
//! Local diagnostics about shipping itself go through `tracing`, never
//! through the sink.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;
use tokio::task::JoinHandle;

use crate::config::EventLogConfig;

mod collector;
mod memory;
mod queue;

pub use collector::CollectorClient;
pub use memory::{MemoryEventSink, NullEventSink};
pub use queue::{EventStats, QueuedEventSink};

/// Severity as understood by the collector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EventLevel {
    Info,
    Warning,
    Error,
}

impl EventLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventLevel::Info => "INFO",
            EventLevel::Warning => "WARNING",
            EventLevel::Error => "ERROR",
        }
    }
}

impl fmt::Display for EventLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fields stamped on every event by the emitting process
#[derive(Debug, Clone)]
pub struct EventOrigin {
    pub service: String,
    pub hostname: String,
}

impl EventOrigin {
    pub fn new(service: impl Into<String>, hostname: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            hostname: hostname.into(),
        }
    }

    /// Origin for this process using the local host name
    pub fn local(service: impl Into<String>) -> Self {
        Self::new(service, local_hostname())
    }
}

/// A fully built event, ready to be serialized as one collector line
#[derive(Debug, Clone, PartialEq)]
pub struct LogEvent {
    pub level: EventLevel,
    pub message: String,
    /// The complete JSON object, base fields and extras merged
    pub fields: Map<String, Value>,
}

impl LogEvent {
    /// Build an event stamped now.
    ///
    /// Base fields are `timestamp`, `level`, `message`, `service` and
    /// `hostname`. Keys of `extra` (when it is an object) are merged on top
    /// and win on collision; any other `extra` value is ignored.
    pub fn new(origin: &EventOrigin, level: EventLevel, message: String, extra: Value) -> Self {
        let mut fields = Map::new();
        fields.insert(
            "timestamp".to_string(),
            Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)),
        );
        fields.insert("level".to_string(), Value::String(level.as_str().to_string()));
        fields.insert("message".to_string(), Value::String(message.clone()));
        fields.insert("service".to_string(), Value::String(origin.service.clone()));
        fields.insert("hostname".to_string(), Value::String(origin.hostname.clone()));

        if let Value::Object(extra) = extra {
            fields.extend(extra);
        }

        Self {
            level,
            message,
            fields,
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Serialized object followed by a single newline
    pub fn to_line(&self) -> String {
        let mut line = Value::Object(self.fields.clone()).to_string();
        line.push('\n');
        line
    }
}

/// Capability for emitting operational events.
///
/// Implementations must not block and must not panic; the return value only
/// says whether the event was accepted for delivery.
pub trait EventSink: Send + Sync {
    fn emit(&self, level: EventLevel, message: String, extra: Value) -> bool;
}

impl dyn EventSink {
    pub fn info(&self, message: impl Into<String>, extra: Value) -> bool {
        self.emit(EventLevel::Info, message.into(), extra)
    }

    pub fn warning(&self, message: impl Into<String>, extra: Value) -> bool {
        self.emit(EventLevel::Warning, message.into(), extra)
    }

    pub fn error(&self, message: impl Into<String>, extra: Value) -> bool {
        self.emit(EventLevel::Error, message.into(), extra)
    }
}

/// Host name reported in every event
pub fn local_hostname() -> String {
    sysinfo::System::host_name().unwrap_or_else(|| "unknown".to_string())
}

/// Build the sink selected by configuration.
///
/// When shipping is enabled the returned handle is the background shipper;
/// it finishes with the delivery counters once every clone of the sink has
/// been dropped and the queue is drained.
pub fn from_config(
    config: &EventLogConfig,
) -> (Arc<dyn EventSink>, Option<JoinHandle<EventStats>>) {
    if !config.enabled {
        return (Arc::new(NullEventSink), None);
    }

    let origin = EventOrigin::local(config.service_name.clone());
    let (sink, shipper) = QueuedEventSink::spawn(config, origin);
    (Arc::new(sink), Some(shipper))
}

use serde_json::Value;
use std::sync::Mutex;

use super::{EventLevel, EventOrigin, EventSink, LogEvent};

/// Sink used when event shipping is disabled
#[derive(Debug, Default, Clone, Copy)]
pub struct NullEventSink;

impl EventSink for NullEventSink {
    fn emit(&self, _level: EventLevel, _message: String, _extra: Value) -> bool {
        true
    }
}

/// Sink that keeps every event in memory, in emission order
pub struct MemoryEventSink {
    origin: EventOrigin,
    events: Mutex<Vec<LogEvent>>,
}

impl MemoryEventSink {
    pub fn new() -> Self {
        Self::with_origin(EventOrigin::new("identidock", "localhost"))
    }

    pub fn with_origin(origin: EventOrigin) -> Self {
        Self {
            origin,
            events: Mutex::new(Vec::new()),
        }
    }

    pub fn events(&self) -> Vec<LogEvent> {
        self.events.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn messages(&self) -> Vec<String> {
        self.events().into_iter().map(|e| e.message).collect()
    }

    /// First event whose message starts with `prefix`
    pub fn find(&self, prefix: &str) -> Option<LogEvent> {
        self.events().into_iter().find(|e| e.message.starts_with(prefix))
    }
}

impl Default for MemoryEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for MemoryEventSink {
    fn emit(&self, level: EventLevel, message: String, extra: Value) -> bool {
        let event = LogEvent::new(&self.origin, level, message, extra);
        self.events.lock().unwrap_or_else(|e| e.into_inner()).push(event);
        true
    }
}

//! Status and progress events emitted while a batch runs.
//!
//! The orchestrator is the only producer. Events are plain values built at
//! the moment they are emitted and pushed through an [`EventSink`]; any
//! front end consumes them from the other end of the channel.

use std::sync::mpsc::{Sender, SyncSender};

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

/// Severity of a status event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl std::fmt::Display for EventLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventLevel::Info => write!(f, "info"),
            EventLevel::Success => write!(f, "success"),
            EventLevel::Warning => write!(f, "warning"),
            EventLevel::Error => write!(f, "error"),
        }
    }
}

/// A timestamped, human readable message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusEvent {
    pub timestamp: DateTime<Local>,
    pub level: EventLevel,
    pub message: String,
}

impl StatusEvent {
    pub fn new(level: EventLevel, message: impl Into<String>) -> Self {
        Self {
            timestamp: Local::now(),
            level,
            message: message.into(),
        }
    }
}

/// Number of files processed so far out of the batch total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
}

impl Progress {
    /// Completion in percent, `100.0` for an empty batch.
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            100.0
        } else {
            self.completed as f64 / self.total as f64 * 100.0
        }
    }
}

/// Everything a batch reports to its consumer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BatchEvent {
    Status(StatusEvent),
    Progress(Progress),
}

impl BatchEvent {
    pub fn as_status(&self) -> Option<&StatusEvent> {
        match self {
            BatchEvent::Status(status) => Some(status),
            BatchEvent::Progress(_) => None,
        }
    }
}

/// Destination of batch events.
///
/// Publishing never fails the batch: a consumer that went away simply stops
/// receiving.
pub trait EventSink: Send {
    fn publish(&self, event: BatchEvent);
}

impl EventSink for Sender<BatchEvent> {
    fn publish(&self, event: BatchEvent) {
        let _ = self.send(event);
    }
}

impl EventSink for SyncSender<BatchEvent> {
    fn publish(&self, event: BatchEvent) {
        let _ = self.send(event);
    }
}

/// Handle the orchestrator emits through. Every status event is mirrored to
/// `tracing` whether or not a sink is attached.
pub struct EventEmitter {
    sink: Option<Box<dyn EventSink>>,
}

impl EventEmitter {
    pub fn new(sink: impl EventSink + 'static) -> Self {
        Self {
            sink: Some(Box::new(sink)),
        }
    }

    /// An emitter that only logs.
    pub fn detached() -> Self {
        Self { sink: None }
    }

    pub fn emit(&self, level: EventLevel, message: impl Into<String>) {
        let event = StatusEvent::new(level, message);
        match event.level {
            EventLevel::Info | EventLevel::Success => info!(level = %event.level, "{}", event.message),
            EventLevel::Warning => warn!("{}", event.message),
            EventLevel::Error => error!("{}", event.message),
        }
        self.publish(BatchEvent::Status(event));
    }

    pub fn info(&self, message: impl Into<String>) {
        self.emit(EventLevel::Info, message);
    }

    pub fn success(&self, message: impl Into<String>) {
        self.emit(EventLevel::Success, message);
    }

    pub fn warning(&self, message: impl Into<String>) {
        self.emit(EventLevel::Warning, message);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.emit(EventLevel::Error, message);
    }

    pub fn progress(&self, completed: usize, total: usize) {
        self.publish(BatchEvent::Progress(Progress { completed, total }));
    }

    fn publish(&self, event: BatchEvent) {
        if let Some(sink) = &self.sink {
            sink.publish(event);
        }
    }
}

impl Default for EventEmitter {
    fn default() -> Self {
        Self::detached()
    }
}

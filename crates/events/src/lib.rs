#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Event system for async communication in protoloc
//!
//! Resolvers never log or print directly. They emit typed events over an
//! unbounded channel and the CLI decides how to surface them.
//!
//! ## Architecture
//!
//! - **Domain events**: grouped by functional area (resolution and fetch)
//! - **`EventEmitter` trait**: one emission API for senders and for structs holding one
//! - **Tracing integration**: every event knows its own log level and target

pub mod meta;
pub use meta::{EventLevel, EventMeta, EventSource};

pub mod events;
pub use events::{AppEvent, FailureContext, FetchEvent, ResolutionEvent};

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

/// An event together with the metadata captured when it was emitted
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventMessage {
    pub meta: EventMeta,
    pub event: AppEvent,
}

impl EventMessage {
    /// Wrap an event, deriving level and source from the event itself
    #[must_use]
    pub fn new(event: AppEvent) -> Self {
        let meta = EventMeta::new(event.log_level().into(), event.event_source());
        Self { meta, event }
    }

    /// Attach a correlation identifier (descriptor name, coordinate)
    #[must_use]
    pub fn with_correlation_id(mut self, correlation_id: impl Into<String>) -> Self {
        self.meta = self.meta.with_correlation_id(correlation_id);
        self
    }
}

/// Type alias for the sending half of the event channel
pub type EventSender = UnboundedSender<EventMessage>;

/// Type alias for the receiving half of the event channel
pub type EventReceiver = UnboundedReceiver<EventMessage>;

/// Create a new event channel
#[must_use]
pub fn channel() -> (EventSender, EventReceiver) {
    tokio::sync::mpsc::unbounded_channel()
}

/// The unified trait for emitting events throughout protoloc
///
/// Implemented for a raw [`EventSender`] and for any struct that may hold
/// one. A missing sender turns every emission into a no-op.
pub trait EventEmitter {
    /// Get the event sender for this emitter
    fn event_sender(&self) -> Option<&EventSender>;

    /// Emit an event through this emitter
    fn emit(&self, event: AppEvent) {
        if let Some(sender) = self.event_sender() {
            // Receiver may already be gone during shutdown
            let _ = sender.send(EventMessage::new(event));
        }
    }

    /// Emit an event tagged with a correlation identifier
    fn emit_correlated(&self, correlation_id: impl Into<String>, event: AppEvent) {
        if let Some(sender) = self.event_sender() {
            let _ = sender.send(EventMessage::new(event).with_correlation_id(correlation_id));
        }
    }
}

/// Implementation of `EventEmitter` for the raw `EventSender`
impl EventEmitter for EventSender {
    fn event_sender(&self) -> Option<&EventSender> {
        Some(self)
    }
}

/// Implementation for optional senders held by resolvers
impl EventEmitter for Option<EventSender> {
    fn event_sender(&self) -> Option<&EventSender> {
        self.as_ref()
    }
}

pub mod binding;
pub mod dispatcher;
pub mod error;

use std::any::Any;
use std::fmt;

use async_trait::async_trait;

use crate::kernel::error::Result;

/// Type for subscription identifiers
pub type EventId = u64;

/// Result of event processing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventResult {
    /// Event was processed successfully and propagation should continue
    Continue,
    /// Event was processed and propagation should stop
    Stop,
}

/// Core event trait
pub trait Event: Any + fmt::Debug + Send + Sync {
    /// Get the name of this event
    fn name(&self) -> &'static str;

    /// Clone this event
    fn clone_event(&self) -> Box<dyn Event>;

    /// Cast to Any for downcasting
    fn as_any(&self) -> &dyn Any;
}

/// Asynchronous handler receiving any event it was subscribed to.
#[async_trait]
pub trait AsyncEventHandler: Send + Sync {
    /// Handle `event`. An error is reported by the dispatcher after the
    /// remaining subscribers have run.
    async fn handle(&self, event: &dyn Event) -> Result<EventResult>;
}

/// Listener for one concrete event type.
///
/// Listener types are bound with
/// [`RegistrationContext::register_event_listener`](crate::app::RegistrationContext::register_event_listener)
/// and constructed through the app container the first time a matching event
/// is published.
#[async_trait]
pub trait EventListener<E: Event>: Send + Sync + 'static {
    async fn handle(&self, event: &E) -> Result<EventResult>;
}

/// Re-export important types
pub use binding::EventBinding;
pub use dispatcher::{BoxFuture, EventDispatcher, sync_event_handler, sync_typed_handler};
pub use error::EventSystemError;

/// Event with a runtime name and a JSON payload, used for string-named
/// events such as `share.post_share`.
#[derive(Debug, Clone)]
pub struct NamedEvent {
    pub name: &'static str,
    pub payload: serde_json::Value,
}

impl NamedEvent {
    pub fn new(name: &'static str, payload: serde_json::Value) -> Self {
        Self { name, payload }
    }

    /// String field of the payload, if present.
    pub fn field(&self, key: &str) -> Option<&str> {
        self.payload.get(key).and_then(|v| v.as_str())
    }
}

impl Event for NamedEvent {
    fn name(&self) -> &'static str {
        self.name
    }

    fn clone_event(&self) -> Box<dyn Event> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

// Test module declaration
#[cfg(test)]
mod tests;

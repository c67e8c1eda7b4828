//! Event routing from raw payloads to registered callbacks.
//!
//! The router parses an opaque message as a JSON object, extracts the
//! `event` key as the routing key, and invokes every callback in the
//! matching bucket in registration order. Callback failures are
//! isolated: one misbehaving handler cannot block delivery to the
//! others, and never fails the route call itself.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{debug, warn};

use crate::{
    error::RouteError,
    registry::{CallbackRegistry, EventPayload},
};

/// An inbound event before parsing.
///
/// The timestamp is capture-time provenance only; it takes no part in
/// routing, ordering, or deduplication.
#[derive(Debug, Clone)]
pub struct RawEvent {
    /// Opaque text expected to be a JSON object with an `event` field.
    pub message: String,
    /// When the event was captured.
    pub timestamp: DateTime<Utc>,
}

impl RawEvent {
    /// Creates a raw event captured now.
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into(), timestamp: Utc::now() }
    }

    /// Creates a raw event with an explicit capture time.
    pub fn with_timestamp(message: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self { message: message.into(), timestamp }
    }
}

/// Routes raw events to the callbacks registered for their event name.
#[derive(Debug, Clone)]
pub struct EventRouter {
    registry: Arc<CallbackRegistry>,
}

impl EventRouter {
    /// Creates a router over the given registry.
    pub fn new(registry: Arc<CallbackRegistry>) -> Self {
        Self { registry }
    }

    /// Returns the registry backing this router.
    pub fn registry(&self) -> &Arc<CallbackRegistry> {
        &self.registry
    }

    /// Parses the event message and fans it out to the matching bucket.
    ///
    /// Callbacks run inline, in registration order. A failing callback
    /// is logged with its id and does not abort the rest of the bucket
    /// or the route call. Routing to an event name with no bucket is a
    /// silent no-op.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::MalformedPayload`] if the message is not a
    /// JSON object, or [`RouteError::MissingEventField`] if the object
    /// has no `event` key.
    pub async fn route_event(&self, event: &RawEvent, source: &str) -> Result<(), RouteError> {
        let payload: EventPayload =
            serde_json::from_str(&event.message).map_err(RouteError::MalformedPayload)?;

        let key = payload.get("event").ok_or(RouteError::MissingEventField)?;
        let event_name = routing_key(key);

        let callbacks = self.registry.callbacks_for(&event_name);
        if callbacks.is_empty() {
            debug!(event = %event_name, source, "no callbacks registered, dropping event");
            return Ok(());
        }

        for callback in callbacks {
            if let Err(error) = callback.invoke(&payload, source).await {
                warn!(
                    callback_id = %callback.id(),
                    event = %event_name,
                    error = %error,
                    "callback failed"
                );
            }
        }

        Ok(())
    }
}

/// Derives the bucket key from the `event` value.
///
/// Non-string values are accepted and coerced to their JSON textual
/// representation rather than rejected, so `{"event": 42}` routes to
/// the bucket named `42`.
fn routing_key(value: &Value) -> String {
    match value {
        Value::String(name) => name.clone(),
        other => other.to_string(),
    }
}

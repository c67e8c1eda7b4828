//! Error types for registry and routing operations.
//!
//! Callback failures are deliberately absent from this taxonomy: the
//! router isolates them per callback, logging with the callback id and
//! never surfacing them to the caller.

use thiserror::Error;

/// Errors from callback registry mutations.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// No callback bucket exists for the named event.
    #[error("no callbacks registered for event '{event}'")]
    UnknownEvent {
        /// The event name that has no bucket
        event: String,
    },
}

/// Errors from routing a raw event to callbacks.
#[derive(Debug, Error)]
pub enum RouteError {
    /// The event message is not a JSON object.
    #[error("event payload is not a JSON object: {0}")]
    MalformedPayload(#[source] serde_json::Error),

    /// The parsed payload has no `event` key to route on.
    #[error("event payload has no 'event' field")]
    MissingEventField,
}

//! Callback registry and event routing.
//!
//! Provides the in-process half of the fanout dispatch pipeline: a
//! concurrency-safe registry mapping event names to ordered callback
//! buckets, and a router that parses raw event payloads and fans them
//! out to every registered callback. The webhook-facing crates depend
//! on these types to deliver provider notifications.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod registry;
pub mod router;

pub use error::{RegistryError, RouteError};
pub use registry::{Callback, CallbackRegistry, EventCallback, EventPayload};
pub use router::{EventRouter, RawEvent};

/// Source tag attached to events routed from in-process callers.
pub const LOCAL_SOURCE: &str = "local";

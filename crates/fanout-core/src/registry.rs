//! Callback registry keyed by event name.
//!
//! The registry owns the process-wide mapping from event name to an
//! ordered callback bucket. Insertion order within a bucket defines
//! invocation order. Lookups clone the bucket out of the lock, so
//! callback invocation never blocks concurrent registration.

use std::{
    collections::HashMap,
    fmt,
    sync::{Arc, PoisonError, RwLock},
};

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::error::RegistryError;

/// Parsed JSON object handed to callbacks.
pub type EventPayload = Map<String, Value>;

/// A capability invoked when an event routes to its bucket.
///
/// Implementations receive the parsed payload and the source tag of the
/// event (`"local"`, `"sns"`, ...). A returned error is logged by the
/// router with the callback id and does not abort sibling callbacks.
#[async_trait]
pub trait EventCallback: Send + Sync {
    /// Handles one routed event.
    async fn invoke(&self, payload: &EventPayload, source: &str) -> anyhow::Result<()>;
}

/// Adapter that lifts a plain closure into an [`EventCallback`].
struct FnCallback<F>(F);

#[async_trait]
impl<F> EventCallback for FnCallback<F>
where
    F: Fn(&EventPayload, &str) -> anyhow::Result<()> + Send + Sync,
{
    async fn invoke(&self, payload: &EventPayload, source: &str) -> anyhow::Result<()> {
        (self.0)(payload, source)
    }
}

/// A named callback living inside a registry bucket.
///
/// The id is unique only within its event-name bucket; duplicate ids
/// are accepted at registration time and removed together.
#[derive(Clone)]
pub struct Callback {
    id: String,
    func: Arc<dyn EventCallback>,
}

impl Callback {
    /// Creates a callback from a trait object.
    pub fn new(id: impl Into<String>, func: Arc<dyn EventCallback>) -> Self {
        Self { id: id.into(), func }
    }

    /// Creates a callback from a plain closure.
    pub fn from_fn<F>(id: impl Into<String>, func: F) -> Self
    where
        F: Fn(&EventPayload, &str) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        Self::new(id, Arc::new(FnCallback(func)))
    }

    /// Returns the callback id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Invokes the underlying callback function.
    pub async fn invoke(&self, payload: &EventPayload, source: &str) -> anyhow::Result<()> {
        self.func.invoke(payload, source).await
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callback").field("id", &self.id).finish_non_exhaustive()
    }
}

/// Concurrency-safe mapping from event name to an ordered callback
/// bucket.
///
/// Reads and writes may come from concurrent tasks; the internal lock
/// guards bucket mutation and lookup. Buckets live until explicitly
/// removed or process teardown.
#[derive(Debug, Default)]
pub struct CallbackRegistry {
    buckets: RwLock<HashMap<String, Vec<Callback>>>,
}

impl CallbackRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a callback to the bucket for `event_name`, creating the
    /// bucket if absent.
    ///
    /// Duplicate callback ids are not rejected. Returns the registry
    /// for chaining.
    pub fn add_event(
        &self,
        event_name: impl Into<String>,
        callback_id: impl Into<String>,
        func: Arc<dyn EventCallback>,
    ) -> &Self {
        let mut buckets = self.buckets.write().unwrap_or_else(PoisonError::into_inner);
        buckets.entry(event_name.into()).or_default().push(Callback::new(callback_id, func));
        self
    }

    /// Appends a closure-backed callback to the bucket for `event_name`.
    pub fn add_event_fn<F>(
        &self,
        event_name: impl Into<String>,
        callback_id: impl Into<String>,
        func: F,
    ) -> &Self
    where
        F: Fn(&EventPayload, &str) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        let mut buckets = self.buckets.write().unwrap_or_else(PoisonError::into_inner);
        buckets.entry(event_name.into()).or_default().push(Callback::from_fn(callback_id, func));
        self
    }

    /// Removes every callback with `callback_id` from the bucket for
    /// `event_name`, preserving the relative order of the rest.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownEvent`] if no bucket exists for
    /// the event name. Zero matching ids within an existing bucket is
    /// not an error.
    pub fn remove_event(&self, event_name: &str, callback_id: &str) -> Result<(), RegistryError> {
        let mut buckets = self.buckets.write().unwrap_or_else(PoisonError::into_inner);
        let bucket = buckets
            .get_mut(event_name)
            .ok_or_else(|| RegistryError::UnknownEvent { event: event_name.to_string() })?;
        bucket.retain(|callback| callback.id() != callback_id);
        Ok(())
    }

    /// Returns a snapshot of the bucket for `event_name`, in
    /// registration order. An absent bucket yields an empty vector.
    pub fn callbacks_for(&self, event_name: &str) -> Vec<Callback> {
        let buckets = self.buckets.read().unwrap_or_else(PoisonError::into_inner);
        buckets.get(event_name).cloned().unwrap_or_default()
    }
}

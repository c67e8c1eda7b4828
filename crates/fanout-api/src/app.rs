//! Application facade tying the registry, router, and webhook endpoint
//! together.
//!
//! `EventHub` is the embedding application's entry point: register
//! callbacks, send in-process events, and serve the provider webhook
//! endpoint from one handle. The registry behind the hub is shared, so
//! callbacks registered after `serve` starts still receive webhook
//! traffic.

use std::sync::Arc;

use anyhow::Result;
use fanout_core::{
    CallbackRegistry, EventCallback, EventPayload, EventRouter, RawEvent, RegistryError,
    RouteError, LOCAL_SOURCE,
};
use fanout_sns::NotificationDispatcher;
use tracing::info;

use crate::{config::Config, server};

/// Event dispatch hub for one application.
#[derive(Debug, Clone)]
pub struct EventHub {
    name: String,
    registry: Arc<CallbackRegistry>,
    router: Arc<EventRouter>,
}

impl EventHub {
    /// Creates a hub with an empty callback registry.
    pub fn new(name: impl Into<String>) -> Self {
        let registry = Arc::new(CallbackRegistry::new());
        let router = Arc::new(EventRouter::new(registry.clone()));
        Self { name: name.into(), registry, router }
    }

    /// Returns the application name this hub was created with.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Registers a callback for an event name. Chainable.
    #[must_use]
    pub fn add_event(
        self,
        event_name: impl Into<String>,
        callback_id: impl Into<String>,
        callback: Arc<dyn EventCallback>,
    ) -> Self {
        self.registry.add_event(event_name, callback_id, callback);
        self
    }

    /// Registers a closure-backed callback for an event name. Chainable.
    #[must_use]
    pub fn add_event_fn<F>(
        self,
        event_name: impl Into<String>,
        callback_id: impl Into<String>,
        callback: F,
    ) -> Self
    where
        F: Fn(&EventPayload, &str) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.registry.add_event_fn(event_name, callback_id, callback);
        self
    }

    /// Removes every callback with the given id from an event's bucket.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownEvent`] when the event has no
    /// bucket.
    pub fn remove_event(&self, event_name: &str, callback_id: &str) -> Result<(), RegistryError> {
        self.registry.remove_event(event_name, callback_id)
    }

    /// Routes an in-process event, tagged with the `"local"` source.
    ///
    /// # Errors
    ///
    /// Returns the router's parse errors; callback failures are
    /// isolated and logged, never returned.
    pub async fn send_event(&self, message: impl Into<String>) -> Result<(), RouteError> {
        self.router.route_event(&RawEvent::new(message), LOCAL_SOURCE).await
    }

    /// Returns the router backing this hub, for wiring custom ingest
    /// surfaces.
    pub fn router(&self) -> Arc<EventRouter> {
        self.router.clone()
    }

    /// Serves the provider webhook endpoint until shutdown.
    ///
    /// # Errors
    ///
    /// Fails when the dispatcher cannot be configured or the listener
    /// cannot bind.
    pub async fn serve(&self, config: &Config) -> Result<()> {
        let dispatcher = Arc::new(NotificationDispatcher::new(
            self.router.clone(),
            config.to_dispatcher_config(),
        )?);

        info!(
            app = %self.name,
            verify_signatures = dispatcher.verification_enabled(),
            "starting webhook endpoint"
        );

        let state = server::AppState { dispatcher };
        server::start_server(state, config.bind_addr()?, config.request_timeout()).await?;
        Ok(())
    }
}

//! Notification classification and handling.
//!
//! One-shot classify-and-handle per inbound request: the dispatcher
//! reads the notification type from the request header, runs the
//! signature verifier when one is configured, and either completes the
//! subscription handshake or forwards the payload to the event router.

use std::{sync::Arc, time::Duration};

use chrono::Utc;
use fanout_core::{EventRouter, RawEvent};
use tracing::{debug, info};

use crate::{
    error::DispatchError,
    notification::{NotificationKind, SnsNotification},
    signature::SignatureVerifier,
};

/// Source tag attached to events routed from the webhook endpoint.
pub const SNS_SOURCE: &str = "sns";

/// Configuration for the notification dispatcher.
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    /// Whether inbound notifications must carry a valid signature.
    pub verify_signatures: bool,
    /// Timeout for certificate and confirmation fetches.
    pub upstream_timeout: Duration,
    /// User agent for outbound requests.
    pub user_agent: String,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            verify_signatures: false,
            upstream_timeout: Duration::from_secs(10),
            user_agent: format!("fanout/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Handles inbound provider notifications.
///
/// Holds the outbound HTTP client used for both the certificate fetch
/// (via the verifier) and the subscription-confirmation fetch; every
/// call carries the configured timeout so a hung upstream cannot stall
/// the ingestion endpoint.
#[derive(Debug, Clone)]
pub struct NotificationDispatcher {
    router: Arc<EventRouter>,
    verifier: Option<SignatureVerifier>,
    http: reqwest::Client,
}

impl NotificationDispatcher {
    /// Creates a dispatcher forwarding to the given router.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Configuration`] if the HTTP client
    /// cannot be built from the configuration.
    pub fn new(router: Arc<EventRouter>, config: DispatcherConfig) -> Result<Self, DispatchError> {
        let http = reqwest::Client::builder()
            .timeout(config.upstream_timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| DispatchError::Configuration(e.to_string()))?;

        let verifier =
            config.verify_signatures.then(|| SignatureVerifier::with_client(http.clone()));

        Ok(Self { router, verifier, http })
    }

    /// Whether this dispatcher verifies signatures before handling.
    pub fn verification_enabled(&self) -> bool {
        self.verifier.is_some()
    }

    /// Verifies (when enabled) and handles one inbound notification.
    ///
    /// `message_type` is the raw value of the notification-type request
    /// header; classification trusts the header, while signing uses the
    /// `Type` field inside the body.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Verify`] when verification rejects the
    /// notification, otherwise the per-type handling errors.
    pub async fn process(
        &self,
        message_type: &str,
        notification: &SnsNotification,
    ) -> Result<(), DispatchError> {
        if let Some(verifier) = &self.verifier {
            verifier.verify(notification).await?;
        }

        match NotificationKind::parse(message_type) {
            Some(NotificationKind::Notification) => self.forward(notification).await,
            Some(NotificationKind::SubscriptionConfirmation) => {
                self.confirm_subscription(notification).await
            },
            Some(NotificationKind::UnsubscribeConfirmation) => {
                // Acknowledged only; subscription cleanup hooks go here.
                info!(topic_arn = %notification.topic_arn, "unsubscribe confirmation acknowledged");
                Ok(())
            },
            None => Err(DispatchError::UnhandledNotificationType {
                kind: message_type.to_string(),
            }),
        }
    }

    /// Steady-state path: wrap the message into a routable event tagged
    /// with the provider source.
    async fn forward(&self, notification: &SnsNotification) -> Result<(), DispatchError> {
        let timestamp = notification.parsed_timestamp().unwrap_or_else(Utc::now);
        let event = RawEvent::with_timestamp(notification.message.clone(), timestamp);

        debug!(
            message_id = %notification.message_id,
            topic_arn = %notification.topic_arn,
            "forwarding notification to router"
        );
        self.router.route_event(&event, SNS_SOURCE).await?;
        Ok(())
    }

    /// Completes the subscription handshake by fetching the subscribe
    /// URL the provider supplied.
    async fn confirm_subscription(
        &self,
        notification: &SnsNotification,
    ) -> Result<(), DispatchError> {
        if notification.subscribe_url.is_empty() {
            return Err(DispatchError::InvalidSubscribeUrl);
        }

        let response = self
            .http
            .get(&notification.subscribe_url)
            .send()
            .await
            .map_err(|e| DispatchError::ConfirmationFailed { reason: e.to_string() })?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(DispatchError::ConfirmationFailed {
                reason: format!("status {status}, expected 200"),
            });
        }

        info!(topic_arn = %notification.topic_arn, "subscription confirmed");
        Ok(())
    }
}

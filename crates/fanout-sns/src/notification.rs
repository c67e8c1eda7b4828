//! Inbound notification model.
//!
//! Field names mirror the provider's JSON exactly. `Timestamp` is kept
//! as the raw string the provider sent: the canonical signable string
//! must reproduce provider bytes, and a parse/reformat round trip
//! would silently break signature verification.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Request header carrying the notification type. Header-name lookup
/// is case-insensitive; the value must match a [`NotificationKind`]
/// exactly.
pub const MESSAGE_TYPE_HEADER: &str = "x-amz-sns-message-type";

/// Provider-defined classification of a webhook delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    /// Steady-state event delivery.
    Notification,
    /// Handshake message confirming a new subscription.
    SubscriptionConfirmation,
    /// Acknowledgement that a subscription was removed.
    UnsubscribeConfirmation,
}

impl NotificationKind {
    /// Classifies a type string; unrecognized values yield `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Notification" => Some(Self::Notification),
            "SubscriptionConfirmation" => Some(Self::SubscriptionConfirmation),
            "UnsubscribeConfirmation" => Some(Self::UnsubscribeConfirmation),
            _ => None,
        }
    }

    /// Returns the wire spelling of this kind.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Notification => "Notification",
            Self::SubscriptionConfirmation => "SubscriptionConfirmation",
            Self::UnsubscribeConfirmation => "UnsubscribeConfirmation",
        }
    }
}

/// A webhook notification as delivered by the provider.
///
/// Constructed from the HTTPS request body and consumed immediately by
/// the dispatcher; never persisted. Absent fields deserialize to empty
/// strings so partially-populated confirmation messages stay signable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SnsNotification {
    /// Notification type as declared inside the body.
    #[serde(rename = "Type", default)]
    pub kind: String,

    /// Provider-assigned message identifier.
    #[serde(rename = "MessageId", default)]
    pub message_id: String,

    /// Confirmation token, present on subscription lifecycle messages.
    #[serde(rename = "Token", default)]
    pub token: String,

    /// Topic the notification was published to.
    #[serde(rename = "TopicArn", default)]
    pub topic_arn: String,

    /// The event payload forwarded to the router.
    #[serde(rename = "Message", default)]
    pub message: String,

    /// Optional human-readable subject.
    #[serde(rename = "Subject", default)]
    pub subject: String,

    /// Confirmation URL, present on subscription lifecycle messages.
    #[serde(rename = "SubscribeURL", default)]
    pub subscribe_url: String,

    /// Publication time, kept verbatim for signing.
    #[serde(rename = "Timestamp", default)]
    pub timestamp: String,

    /// Signature protocol version; only "1" is supported.
    #[serde(rename = "SignatureVersion", default)]
    pub signature_version: String,

    /// Base64-encoded signature over the canonical signable string.
    #[serde(rename = "Signature", default)]
    pub signature: String,

    /// HTTPS location of the provider's X.509 signing certificate.
    #[serde(rename = "SigningCertURL", default)]
    pub signing_cert_url: String,
}

impl SnsNotification {
    /// Parses the provider timestamp, if it is valid RFC 3339.
    pub fn parsed_timestamp(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.timestamp).ok().map(|ts| ts.with_timezone(&Utc))
    }
}

//! Error types for webhook verification and dispatch.

use fanout_core::RouteError;
use thiserror::Error;

/// Errors from verifying a notification signature.
#[derive(Debug, Error)]
pub enum VerifyError {
    /// The notification declares a signature version other than "1".
    #[error("unsupported signature version '{found}', only version 1 is implemented")]
    UnsupportedSignatureVersion {
        /// The version string the notification carried
        found: String,
    },

    /// Fetching the signing certificate failed or returned non-200.
    #[error("failed to fetch signing certificate: {reason}")]
    CertFetch {
        /// Transport error or unexpected status description
        reason: String,
    },

    /// The fetched bytes are not a usable X.509 certificate.
    #[error("failed to parse signing certificate: {reason}")]
    CertParse {
        /// Parser or key-extraction error description
        reason: String,
    },

    /// The notification type has no registered signable field list.
    #[error("no signable field list for notification type '{kind}'")]
    UnknownNotificationType {
        /// The declared notification type
        kind: String,
    },

    /// The signature field is not valid base64.
    #[error("signature is not valid base64: {0}")]
    InvalidSignatureEncoding(#[from] base64::DecodeError),

    /// The signature does not match the canonical signable string.
    #[error("signature does not match the signed notification fields")]
    SignatureMismatch,
}

/// Errors from classifying and handling an inbound notification.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Signature verification rejected the notification.
    #[error(transparent)]
    Verify(#[from] VerifyError),

    /// A subscription confirmation arrived without a subscribe URL.
    #[error("subscription confirmation carries no subscribe URL")]
    InvalidSubscribeUrl,

    /// The subscription confirmation fetch failed.
    #[error("subscription confirmation failed: {reason}")]
    ConfirmationFailed {
        /// Transport error or unexpected status description
        reason: String,
    },

    /// The type header named no known notification type.
    #[error("unhandled notification type '{kind}'")]
    UnhandledNotificationType {
        /// The header value that could not be classified
        kind: String,
    },

    /// Routing the notification's message failed.
    #[error(transparent)]
    Route(#[from] RouteError),

    /// The dispatcher's HTTP client could not be built.
    #[error("invalid dispatcher configuration: {0}")]
    Configuration(String),
}

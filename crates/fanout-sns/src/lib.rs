//! SNS webhook ingestion: authenticity verification and dispatch.
//!
//! This crate implements the provider-facing half of the fanout
//! pipeline. Inbound webhook deliveries are classified by their
//! notification type header, optionally verified against the
//! provider-signed canonical string, and converted into routable
//! events handed to [`fanout_core::EventRouter`].
//!
//! Verification follows signature version "1" of the upstream
//! protocol: a SHA-1/RSA PKCS#1 v1.5 signature over a fixed, ordered
//! field list fetched together with the provider's X.509 signing
//! certificate. SHA-1 is a compatibility constraint of that protocol
//! version; a stronger-hash version would be a new, explicitly-typed
//! variant with its own field table.
//!
//! The signing certificate URL is taken from the notification itself.
//! Callers that cannot trust their network path should allow-list the
//! certificate host before enabling verification.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod dispatch;
pub mod error;
pub mod notification;
pub mod signature;

pub use dispatch::{DispatcherConfig, NotificationDispatcher, SNS_SOURCE};
pub use error::{DispatchError, VerifyError};
pub use notification::{NotificationKind, SnsNotification, MESSAGE_TYPE_HEADER};
pub use signature::{signable_string, verify_with_cert, SignatureVerifier};

//! Notification signature verification.
//!
//! A notification is trusted only if its base64 signature verifies
//! against the canonical signable string using the RSA public key of
//! the certificate named by `SigningCertURL`. The signable string is a
//! `\n`-joined sequence of label/value line pairs drawn from a fixed,
//! ordered field table per notification type; `Subject` is skipped
//! entirely when empty.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use rsa::{pkcs1::DecodeRsaPublicKey, Pkcs1v15Sign, RsaPublicKey};
use sha1::{Digest, Sha1};
use tracing::debug;
use x509_parser::{parse_x509_certificate, pem::parse_x509_pem};

use crate::{
    error::VerifyError,
    notification::{NotificationKind, SnsNotification},
};

/// The only signature protocol version this verifier implements.
pub const SUPPORTED_SIGNATURE_VERSION: &str = "1";

/// A field that participates in the canonical signable string.
///
/// The table entries below replace dynamic field-name lookup: field
/// order and spelling are fixed at build time, and adding a field to a
/// notification type means extending its table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SignedField {
    Message,
    MessageId,
    Subject,
    SubscribeUrl,
    Timestamp,
    Token,
    TopicArn,
    Type,
}

impl SignedField {
    /// Label line emitted into the signable string. Case-sensitive.
    const fn label(self) -> &'static str {
        match self {
            Self::Message => "Message",
            Self::MessageId => "MessageId",
            Self::Subject => "Subject",
            Self::SubscribeUrl => "SubscribeUrl",
            Self::Timestamp => "Timestamp",
            Self::Token => "Token",
            Self::TopicArn => "TopicArn",
            Self::Type => "Type",
        }
    }

    /// Value line emitted into the signable string.
    fn value(self, notification: &SnsNotification) -> &str {
        match self {
            Self::Message => &notification.message,
            Self::MessageId => &notification.message_id,
            Self::Subject => &notification.subject,
            Self::SubscribeUrl => &notification.subscribe_url,
            Self::Timestamp => &notification.timestamp,
            Self::Token => &notification.token,
            Self::TopicArn => &notification.topic_arn,
            Self::Type => &notification.kind,
        }
    }
}

const NOTIFICATION_FIELDS: [SignedField; 6] = [
    SignedField::Message,
    SignedField::MessageId,
    SignedField::Subject,
    SignedField::Timestamp,
    SignedField::TopicArn,
    SignedField::Type,
];

const CONFIRMATION_FIELDS: [SignedField; 7] = [
    SignedField::Message,
    SignedField::MessageId,
    SignedField::SubscribeUrl,
    SignedField::Timestamp,
    SignedField::Token,
    SignedField::TopicArn,
    SignedField::Type,
];

/// Builds the canonical signable string for a notification.
///
/// The field list is selected by the `Type` field inside the body, not
/// the request header. An empty `Subject` contributes neither its
/// label nor its value line.
///
/// # Errors
///
/// Returns [`VerifyError::UnknownNotificationType`] when the declared
/// type has no field table.
pub fn signable_string(notification: &SnsNotification) -> Result<String, VerifyError> {
    let fields: &[SignedField] = match NotificationKind::parse(&notification.kind) {
        Some(NotificationKind::Notification) => &NOTIFICATION_FIELDS,
        Some(_) => &CONFIRMATION_FIELDS,
        None => {
            return Err(VerifyError::UnknownNotificationType {
                kind: notification.kind.clone(),
            })
        },
    };

    let mut lines = Vec::with_capacity(fields.len() * 2);
    for field in fields {
        let value = field.value(notification);
        if *field == SignedField::Subject && value.is_empty() {
            continue;
        }
        lines.push(field.label());
        lines.push(value);
    }

    Ok(lines.join("\n"))
}

/// Verifies a notification against pre-fetched certificate bytes.
///
/// Accepts the certificate in PEM or DER form. This is the network-free
/// seam under [`SignatureVerifier::verify`].
///
/// # Errors
///
/// Returns [`VerifyError::CertParse`] for unusable certificate bytes,
/// [`VerifyError::UnknownNotificationType`] for an unsignable type,
/// [`VerifyError::InvalidSignatureEncoding`] for non-base64 signatures,
/// and [`VerifyError::SignatureMismatch`] when the signature does not
/// check out.
pub fn verify_with_cert(notification: &SnsNotification, cert: &[u8]) -> Result<(), VerifyError> {
    let public_key = rsa_public_key(cert)?;
    let signable = signable_string(notification)?;
    let signature = BASE64.decode(notification.signature.trim())?;

    let digest = Sha1::digest(signable.as_bytes());
    public_key
        .verify(Pkcs1v15Sign::new::<Sha1>(), digest.as_slice(), &signature)
        .map_err(|_| VerifyError::SignatureMismatch)
}

/// Extracts the RSA public key from PEM or DER certificate bytes.
fn rsa_public_key(raw: &[u8]) -> Result<RsaPublicKey, VerifyError> {
    let pem = if raw.starts_with(b"-----BEGIN") {
        let (_, pem) = parse_x509_pem(raw)
            .map_err(|e| VerifyError::CertParse { reason: format!("{e:?}") })?;
        Some(pem)
    } else {
        None
    };
    let der = pem.as_ref().map_or(raw, |pem| pem.contents.as_slice());

    let (_, certificate) = parse_x509_certificate(der)
        .map_err(|e| VerifyError::CertParse { reason: format!("{e:?}") })?;

    RsaPublicKey::from_pkcs1_der(certificate.public_key().subject_public_key.data.as_ref())
        .map_err(|e| VerifyError::CertParse {
            reason: format!("certificate key is not an RSA public key: {e}"),
        })
}

/// Verifies provider signatures by fetching the signing certificate
/// over HTTPS.
#[derive(Debug, Clone)]
pub struct SignatureVerifier {
    http: reqwest::Client,
}

impl SignatureVerifier {
    /// Creates a verifier over an existing HTTP client.
    ///
    /// The client should carry a request timeout; a hung certificate
    /// host must not stall the ingestion endpoint.
    pub fn with_client(http: reqwest::Client) -> Self {
        Self { http }
    }

    /// Verifies that a notification was signed by the certificate it
    /// names.
    ///
    /// # Errors
    ///
    /// Returns [`VerifyError::UnsupportedSignatureVersion`] for any
    /// version other than "1", [`VerifyError::CertFetch`] when the
    /// certificate cannot be retrieved, and the
    /// [`verify_with_cert`] errors for everything past the fetch.
    pub async fn verify(&self, notification: &SnsNotification) -> Result<(), VerifyError> {
        if notification.signature_version != SUPPORTED_SIGNATURE_VERSION {
            return Err(VerifyError::UnsupportedSignatureVersion {
                found: notification.signature_version.clone(),
            });
        }

        let cert = self.fetch_signing_cert(&notification.signing_cert_url).await?;
        debug!(
            cert_url = %notification.signing_cert_url,
            cert_bytes = cert.len(),
            "fetched signing certificate"
        );

        verify_with_cert(notification, &cert)
    }

    async fn fetch_signing_cert(&self, url: &str) -> Result<Vec<u8>, VerifyError> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| VerifyError::CertFetch { reason: e.to_string() })?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(VerifyError::CertFetch {
                reason: format!("status {status}, expected 200"),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| VerifyError::CertFetch { reason: e.to_string() })?;
        Ok(body.to_vec())
    }
}

//! Signature verification tests against a real RSA certificate.
//!
//! The certificate and signatures below were produced offline with
//! openssl: a 2048-bit self-signed RSA certificate, and SHA-1/RSA
//! PKCS#1 v1.5 signatures over the canonical signable strings of the
//! fixture notifications (one with a subject, one without).

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use fanout_sns::{verify_with_cert, SignatureVerifier, SnsNotification, VerifyError};
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};

const CERT_PEM: &str = "-----BEGIN CERTIFICATE-----
MIIDLTCCAhWgAwIBAgIUFUjF8cqKjOLzxrotLHTa79EBf6cwDQYJKoZIhvcNAQEL
BQAwJjEkMCIGA1UEAwwbc25zLnVzLWVhc3QtMS5hbWF6b25hd3MuY29tMB4XDTI2
MDgzMDIxNTk1NVoXDTQ2MDgyNTIxNTk1NVowJjEkMCIGA1UEAwwbc25zLnVzLWVh
c3QtMS5hbWF6b25hd3MuY29tMIIBIjANBgkqhkiG9w0BAQEFAAOCAQ8AMIIBCgKC
AQEAuYCPZGyPyRGiiCc+TcZkc39b3NPwdsLYLfoU3T/pW2qaFfRyrl4RPNsWwUQe
sTg8iNgDaMgMNmHDLZzLiRFSIUhuTDaExOod+rMuBWGShepy3ThotK9A1eVQioQZ
/PTmqxS7uwvB9l/dSbd25918kfOQha3eOrbTMb8eQZmOmD+3PZlpGVnPDnEF6WrX
kGUt//T4Bxctk507QVfqkBoXfJR9mbz89wegJlQjkvaFheLVM78EP2mHEWiwwqeJ
ojEeWqx8YWWQpNKNw5AZOeUjOmDDqmyokmrOOeBCGjufUGR4KYTEEHbXRujqB8Qs
fr0Ij4h/pVJDTkjhjtG8vtm1TwIDAQABo1MwUTAdBgNVHQ4EFgQUGcl1bKQoHOHR
+4Y1ZKk9/LN9RgUwHwYDVR0jBBgwFoAUGcl1bKQoHOHR+4Y1ZKk9/LN9RgUwDwYD
VR0TAQH/BAUwAwEB/zANBgkqhkiG9w0BAQsFAAOCAQEAS1PvNZIDSKt7U+W9m7mK
oDfiXf+BjWtuH2/BDd2r+IanYd6CnvgrOkdGvOmRzvw7uwJHJ3O8yoHLCMqL7UNh
+rUS0HOH7wAbQxdJ/7TXEGl9bQCaBGDCMqE9WzIuoCaKMuzW/L+HD29w22yAE7Qe
5aG1VBtiE98XbL23OjYUdzVPdQdvOes9M69myDY1/E4u6o9Lt1wUtWavlridm6l0
VWWP7hY0p6ov+I4e8PEMR4G/2931mIOjaaOoxLGgEOAj03DOVbtVpRiTPnyT3y6p
/y8t2uCfX2xkacDgtJ1up5oyB2M4U6/KDU5gl+zPtZ2Cli1OVB79w4wSyF/0ZNLq
CQ==
-----END CERTIFICATE-----
";

const SIGNATURE_WITH_SUBJECT: &str = "GXYr4cCvzjFiaZdWCFLpthIqs93CJFa3XUEmy77lkzuSItG+lnzZKmITPKNWjGVy8nA8POKg5t2gPPfoL5HAwHTyUhGlkSW53JpOYEjy0cq7sWHreOK+WS/9GDpflbCO+Fd/cgvV6Poq7qepVvxr29oMlTbd2yrcZR+tKdCx9bz2t29tcYhBic7kSqoWMc4OhN3ggGDg8deaYAsYhP/igF8unWpMAsYn/IB8w+bJSeOHaBxxDREIhSed/1Rh1fcsiBLQCNWuTv0Hq/U8Dd78XVIWxR1MHT70Ho5IoAOcyCXubUQBiTxTSAUGMXf3rtr7Ndn1a0OxSZScrEBk48V/Lw==";

const SIGNATURE_WITHOUT_SUBJECT: &str = "iIvbc7B2cXryzt4O9Puv26Lxse234R22bUloYHxcGlUH6YUmFAi8pqOwi2V1+Hj2EDudezMLrgFZ000OCLJ5HWniuHaFUhkoCW8rXWqbw2LI95z01iPk/CffuhQQlaNIqvWaf54ugEdxQmpTFowqhGB7As9xx9HBpr6DLwzw6Ujyi+CsFaSN0rj8yQtH7l7bnnpL76VroRkYZk3QF9u6uOd6WT6nWzWLvA93ss98V7QCPr0VU73v0MItCcVWd+/i8asHtL1v4Hy2ZOmFiLnX8Y9/TJAbPOfX8TgDJXxng/DZItrsCtAaTYl49iHZWpwYNspqYLxbBXrc5Ty6jyqKBQ==";

fn signed_notification(subject: &str, signature: &str) -> SnsNotification {
    SnsNotification {
        kind: "Notification".to_string(),
        message_id: "165545c9-2a5c-472c-8df2-7ff2be2b3b1b".to_string(),
        topic_arn: "arn:aws:sns:us-east-1:123456789012:events".to_string(),
        message: r#"{"event":"ServerCreated","data":{"server_id":"glade-dev"}}"#.to_string(),
        subject: subject.to_string(),
        timestamp: "2012-04-26T20:45:04.751Z".to_string(),
        signature_version: "1".to_string(),
        signature: signature.to_string(),
        ..SnsNotification::default()
    }
}

#[test]
fn valid_signature_with_subject_verifies() {
    let notification = signed_notification("ServerCreated", SIGNATURE_WITH_SUBJECT);
    verify_with_cert(&notification, CERT_PEM.as_bytes()).expect("signature verifies");
}

#[test]
fn valid_signature_with_empty_subject_verifies() {
    // The empty subject is skipped from the signable string entirely.
    let notification = signed_notification("", SIGNATURE_WITHOUT_SUBJECT);
    verify_with_cert(&notification, CERT_PEM.as_bytes()).expect("signature verifies");
}

#[test]
fn der_certificate_is_accepted() {
    let body: String = CERT_PEM
        .lines()
        .filter(|line| !line.starts_with("-----"))
        .collect();
    let der = BASE64.decode(body).expect("PEM body is base64");

    let notification = signed_notification("ServerCreated", SIGNATURE_WITH_SUBJECT);
    verify_with_cert(&notification, &der).expect("DER certificate verifies");
}

#[test]
fn tampered_message_is_rejected() {
    let mut notification = signed_notification("ServerCreated", SIGNATURE_WITH_SUBJECT);
    notification.message = r#"{"event":"ServerDeleted"}"#.to_string();

    let result = verify_with_cert(&notification, CERT_PEM.as_bytes());
    assert!(matches!(result, Err(VerifyError::SignatureMismatch)));
}

#[test]
fn signature_signed_over_wrong_subject_is_rejected() {
    // Valid signature bytes, but for the no-subject canonical string.
    let notification = signed_notification("ServerCreated", SIGNATURE_WITHOUT_SUBJECT);

    let result = verify_with_cert(&notification, CERT_PEM.as_bytes());
    assert!(matches!(result, Err(VerifyError::SignatureMismatch)));
}

#[test]
fn non_base64_signature_is_an_encoding_error() {
    let notification = signed_notification("ServerCreated", "!!! not base64 !!!");

    let result = verify_with_cert(&notification, CERT_PEM.as_bytes());
    assert!(matches!(result, Err(VerifyError::InvalidSignatureEncoding(_))));
}

#[tokio::test]
async fn verify_fetches_certificate_from_signing_cert_url() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/cert.pem"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(CERT_PEM.as_bytes()))
        .mount(&server)
        .await;

    let mut notification = signed_notification("ServerCreated", SIGNATURE_WITH_SUBJECT);
    notification.signing_cert_url = format!("{}/cert.pem", server.uri());

    let verifier = SignatureVerifier::with_client(reqwest::Client::new());
    verifier.verify(&notification).await.expect("end-to-end verification succeeds");
}

#[tokio::test]
async fn missing_certificate_is_a_fetch_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/cert.pem"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let mut notification = signed_notification("ServerCreated", SIGNATURE_WITH_SUBJECT);
    notification.signing_cert_url = format!("{}/cert.pem", server.uri());

    let verifier = SignatureVerifier::with_client(reqwest::Client::new());
    let result = verifier.verify(&notification).await;
    assert!(matches!(result, Err(VerifyError::CertFetch { .. })));
}

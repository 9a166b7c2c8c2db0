//! Signature verification tests

use hookd::authn::signature::{sign, SignatureVerifier};
use secrecy::SecretString;

fn verifier(secret: &str) -> SignatureVerifier {
    SignatureVerifier::new(SecretString::from(secret.to_string()))
}

const PAYLOADS: &[&[u8]] = &[
    b"",
    b"{}",
    br#"{"ref":"refs/heads/main","after":"0d1a26e67d8f5eaf1f6ba5c57fc3c7d91ac0fd1c"}"#,
    b"not json at all",
    &[0xff, 0x00, 0x7f, 0x80],
];

#[test]
fn test_signature_roundtrip_with_matching_secret() {
    for secret in ["s", "a much longer shared secret value", "ünïcødé"] {
        let v = verifier(secret);
        for payload in PAYLOADS {
            let signature = sign(secret, payload);
            assert!(v.verify(payload, Some(&signature)), "secret {secret:?}");
        }
    }
}

#[test]
fn test_signature_rejected_with_other_secret() {
    let v = verifier("right");
    for payload in PAYLOADS {
        let signature = sign("wrong", payload);
        assert!(!v.verify(payload, Some(&signature)));
    }
}

#[test]
fn test_signature_rejected_for_modified_body() {
    let v = verifier("secret");
    let signature = sign("secret", br#"{"ref":"refs/heads/main"}"#);
    assert!(!v.verify(br#"{"ref": "refs/heads/main"}"#, Some(&signature)));
}

#[test]
fn test_no_secret_accepts_anything() {
    let v = verifier("");
    assert!(!v.is_enabled());
    assert!(v.verify(b"{}", None));
    assert!(v.verify(b"{}", Some("garbage")));
    assert!(v.verify(b"{}", Some(&sign("other", b"{}"))));
}

#[test]
fn test_fails_closed_on_bad_headers() {
    let v = verifier("secret");
    let good = sign("secret", b"{}");
    let digest = good.trim_start_matches("sha256=");

    assert!(!v.verify(b"{}", None));
    assert!(!v.verify(b"{}", Some("")));
    assert!(!v.verify(b"{}", Some("sha256=")));
    assert!(!v.verify(b"{}", Some(digest)));
    assert!(!v.verify(b"{}", Some(&format!("sha1={digest}"))));
    assert!(!v.verify(b"{}", Some(&format!("sha256={digest}00"))));
    assert!(!v.verify(b"{}", Some(&format!("{good} "))));
    assert!(!v.verify(b"{}", Some(&format!("sha256={}", "z".repeat(64)))));
}

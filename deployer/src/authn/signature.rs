//! Webhook signature verification (`X-Hub-Signature-256`)

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use tracing::{debug, warn};

type HmacSha256 = Hmac<Sha256>;

/// Prefix of the signature header value
pub const SIGNATURE_PREFIX: &str = "sha256=";

/// Length of a hex encoded SHA-256 digest
const DIGEST_HEX_LEN: usize = 64;

/// Verifies HMAC-SHA256 signatures over raw request bodies
pub struct SignatureVerifier {
    secret: SecretString,
}

impl SignatureVerifier {
    pub fn new(secret: SecretString) -> Self {
        Self { secret }
    }

    /// Whether verification is actually enforced
    pub fn is_enabled(&self) -> bool {
        !self.secret.expose_secret().is_empty()
    }

    /// Decide whether `signature` authorizes `body`.
    ///
    /// With no secret configured every request is accepted. Otherwise the
    /// header must be exactly `sha256=` followed by the lowercase hex HMAC of
    /// the body; anything else is rejected.
    pub fn verify(&self, body: &[u8], signature: Option<&str>) -> bool {
        if !self.is_enabled() {
            warn!("Webhook secret not configured, skipping signature verification");
            return true;
        }

        let Some(signature) = signature else {
            debug!("Signature header missing");
            return false;
        };

        let Some(digest_hex) = signature.strip_prefix(SIGNATURE_PREFIX) else {
            debug!("Signature header has no '{}' prefix", SIGNATURE_PREFIX);
            return false;
        };

        if digest_hex.len() != DIGEST_HEX_LEN || !is_lower_hex(digest_hex) {
            debug!("Signature digest is not {} lowercase hex characters", DIGEST_HEX_LEN);
            return false;
        }

        let Ok(expected) = hex::decode(digest_hex) else {
            return false;
        };

        let Ok(mut mac) = HmacSha256::new_from_slice(self.secret.expose_secret().as_bytes()) else {
            return false;
        };
        mac.update(body);

        // Constant-time comparison
        mac.verify_slice(&expected).is_ok()
    }
}

fn is_lower_hex(s: &str) -> bool {
    s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

/// Compute the `sha256=<hex>` header value for `body` under `secret`
pub fn sign(secret: &str, body: &[u8]) -> String {
    // HMAC accepts keys of any length
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .unwrap_or_else(|_| unreachable!("HMAC key length is unrestricted"));
    mac.update(body);
    format!("{}{}", SIGNATURE_PREFIX, hex::encode(mac.finalize().into_bytes()))
}

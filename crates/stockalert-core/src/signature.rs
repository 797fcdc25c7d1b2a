//! Webhook delivery signatures.
//!
//! Deliveries carry `X-StockAlert-Signature: sha256=<hex>`, an HMAC-SHA256 of
//! the raw request body keyed with the webhook secret.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

pub const SIGNATURE_HEADER: &str = "X-StockAlert-Signature";

const SCHEME_PREFIX: &str = "sha256=";

/// Signature value for `payload`, in header form.
pub fn sign_payload(payload: impl AsRef<[u8]>, secret: &str) -> String {
    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        unreachable!("HMAC accepts keys of any length");
    };
    mac.update(payload.as_ref());
    format!("{SCHEME_PREFIX}{}", hex::encode(mac.finalize().into_bytes()))
}

/// Checks `signature` against the raw `payload` in constant time.
///
/// Returns `false` for a missing `sha256=` prefix or malformed hex.
pub fn verify_signature(payload: impl AsRef<[u8]>, signature: &str, secret: &str) -> bool {
    let Some(encoded) = signature.trim().strip_prefix(SCHEME_PREFIX) else {
        return false;
    };
    let Ok(expected) = hex::decode(encoded) else {
        return false;
    };
    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return false;
    };

    mac.update(payload.as_ref());
    mac.verify_slice(&expected).is_ok()
}

//! SKPort request signing.
//!
//! The API expects a `sign` header on every authenticated call:
//! HMAC-SHA256 over `path + body + timestamp + headers_json`, keyed by the
//! per-session sign token, then MD5 of the lowercase hex digest. The
//! `headers_json` blob is the compact JSON of the signed header fields with a
//! fixed key order; any deviation (spaces, reordering) invalidates the
//! signature server-side.

use hmac::{Hmac, Mac};
use md5::{Digest, Md5};
use sha2::Sha256;

pub(crate) const PLATFORM: &str = "3";
pub(crate) const VNAME: &str = "1.0.0";

type HmacSha256 = Hmac<Sha256>;

pub(crate) fn compute_sign(sign_token: &str, path: &str, body: &str, timestamp: &str) -> String {
    let headers_json = format!(
        "{{\"platform\":\"{PLATFORM}\",\"timestamp\":\"{timestamp}\",\"dId\":\"\",\"vName\":\"{VNAME}\"}}"
    );
    let payload = format!("{path}{body}{timestamp}{headers_json}");

    let mut mac = HmacSha256::new_from_slice(sign_token.as_bytes())
        .expect("hmac accepts keys of any length");
    mac.update(payload.as_bytes());
    let hmac_hex = hex::encode(mac.finalize().into_bytes());

    hex::encode(Md5::digest(hmac_hex.as_bytes()))
}

pub(crate) fn unix_timestamp() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
        .to_string()
}

/// Cache key for sign tokens; raw session tokens never become map keys.
pub(crate) fn token_digest(token: &str) -> String {
    let digest = Sha256::digest(token.as_bytes());
    hex::encode(&digest[..8])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_is_deterministic() {
        let a = compute_sign("tok", "/game/endfield/attendance", "", "1700000000");
        let b = compute_sign("tok", "/game/endfield/attendance", "", "1700000000");
        assert_eq!(a, b);
    }

    #[test]
    fn sign_is_a_32_char_hex_digest() {
        let s = compute_sign("tok", "/p", "", "1");
        assert_eq!(s.len(), 32);
        assert!(s.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(s, s.to_lowercase());
    }

    #[test]
    fn sign_depends_on_every_input() {
        let base = compute_sign("tok", "/p", "", "1");
        assert_ne!(base, compute_sign("other", "/p", "", "1"));
        assert_ne!(base, compute_sign("tok", "/q", "", "1"));
        assert_ne!(base, compute_sign("tok", "/p", "x", "1"));
        assert_ne!(base, compute_sign("tok", "/p", "", "2"));
    }

    #[test]
    fn token_digest_is_stable_and_short() {
        assert_eq!(token_digest("abc"), token_digest("abc"));
        assert_ne!(token_digest("abc"), token_digest("abd"));
        assert_eq!(token_digest("abc").len(), 16);
    }
}

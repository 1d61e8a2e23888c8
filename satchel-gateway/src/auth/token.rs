//! Deterministic write-token derivation and verification
//!
//! The token is HMAC-SHA256 over the canonical lowercase username,
//! keyed by the server secret, rendered as lowercase hex. The same
//! username always yields the same token, so no issued-token state is
//! needed anywhere.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use satchel_core::Username;

type HmacSha256 = Hmac<Sha256>;

/// Derive the write token for a username.
pub fn derive_token(username: &Username, secret: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .expect("HMAC can take a key of any size");
    mac.update(username.as_str().as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Verify a supplied token against the expected one.
///
/// Returns false for any length or content mismatch; never errors.
pub fn verify_token(username: &Username, supplied: &str, secret: &str) -> bool {
    let expected = derive_token(username, secret);
    constant_time_compare(supplied, &expected)
}

/// Constant-time string comparison to prevent timing attacks.
/// Length check first, then a full-length XOR accumulate so the time
/// taken does not depend on where the first mismatch occurs.
fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }
    result == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    fn user(raw: &str) -> Username {
        Username::parse(raw).unwrap()
    }

    #[test]
    fn test_token_round_trip() {
        let alice = user("alice123");
        let token = derive_token(&alice, SECRET);
        assert!(verify_token(&alice, &token, SECRET));
    }

    #[test]
    fn test_token_is_deterministic_and_case_insensitive() {
        assert_eq!(
            derive_token(&user("Alice123"), SECRET),
            derive_token(&user("alice123"), SECRET)
        );
    }

    #[test]
    fn test_token_is_lowercase_hex_digest() {
        let token = derive_token(&user("alice123"), SECRET);
        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_cross_username_token_rejected() {
        let token_for_bob = derive_token(&user("bob-the-kid"), SECRET);
        assert!(!verify_token(&user("alice123"), &token_for_bob, SECRET));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = derive_token(&user("alice123"), SECRET);
        assert!(!verify_token(&user("alice123"), &token, "other-secret"));
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let alice = user("alice123");
        let token = derive_token(&alice, SECRET);
        assert!(!verify_token(&alice, &token[..10], SECRET));
        assert!(!verify_token(&alice, "", SECRET));
    }

    #[test]
    fn test_constant_time_compare_basics() {
        assert!(constant_time_compare("abc", "abc"));
        assert!(!constant_time_compare("abc", "abd"));
        assert!(!constant_time_compare("abc", "ab"));
    }
}

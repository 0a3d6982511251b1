//! # NOWPayments IPN Signature Verification
//!
//! IPN notifications carry an `x-nowpayments-sig` header: an HMAC-SHA512
//! over the JSON body with its top-level keys sorted alphabetically.
//! This module only verifies authenticity; acting on notifications is
//! outside this crate.

use checkout_core::{PaymentError, PaymentResult};
use hmac::{Hmac, Mac};
use sha2::Sha512;
use std::collections::BTreeMap;

type HmacSha512 = Hmac<Sha512>;

/// Verify an IPN payload against the configured secret.
///
/// Returns `Ok(true)` only when the recomputed digest matches the supplied
/// signature; malformed payloads are errors, not mismatches.
pub fn verify_ipn_signature(
    ipn_secret: &str,
    payload: &[u8],
    signature: &str,
) -> PaymentResult<bool> {
    if ipn_secret.is_empty() {
        return Err(PaymentError::Configuration(
            "NOWPAYMENTS_IPN_SECRET is not set".to_string(),
        ));
    }

    let expected = compute_ipn_signature(ipn_secret, payload)?;
    Ok(constant_time_eq(&expected, &signature.to_lowercase()))
}

/// Recompute the digest for a payload: sorted-key JSON, HMAC-SHA512, hex.
fn compute_ipn_signature(ipn_secret: &str, payload: &[u8]) -> PaymentResult<String> {
    let parsed: BTreeMap<String, serde_json::Value> = serde_json::from_slice(payload)
        .map_err(|e| PaymentError::Serialization(format!("Invalid IPN payload: {e}")))?;

    let sorted = serde_json::to_string(&parsed)
        .map_err(|e| PaymentError::Serialization(e.to_string()))?;

    let mut mac = HmacSha512::new_from_slice(ipn_secret.as_bytes())
        .expect("HMAC can take key of any size");
    mac.update(sorted.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.bytes()
        .zip(b.bytes())
        .fold(0, |acc, (x, y)| acc | (x ^ y))
        == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "ipn-secret-1";

    #[test]
    fn test_roundtrip_accepts() {
        let payload = br#"{"payment_id":123,"payment_status":"finished","order_id":"order_1_a"}"#;
        let signature = compute_ipn_signature(SECRET, payload).unwrap();

        assert!(verify_ipn_signature(SECRET, payload, &signature).unwrap());
    }

    #[test]
    fn test_key_order_does_not_matter() {
        let a = br#"{"b":2,"a":1}"#;
        let b = br#"{"a":1,"b":2}"#;

        assert_eq!(
            compute_ipn_signature(SECRET, a).unwrap(),
            compute_ipn_signature(SECRET, b).unwrap()
        );
    }

    #[test]
    fn test_mutated_signature_rejected() {
        let payload = br#"{"payment_id":123}"#;
        let mut signature = compute_ipn_signature(SECRET, payload).unwrap();
        signature.replace_range(0..1, if signature.starts_with('0') { "1" } else { "0" });

        assert!(!verify_ipn_signature(SECRET, payload, &signature).unwrap());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let payload = br#"{"payment_id":123}"#;
        let signature = compute_ipn_signature("other-secret", payload).unwrap();

        assert!(!verify_ipn_signature(SECRET, payload, &signature).unwrap());
    }

    #[test]
    fn test_missing_secret_is_configuration_error() {
        let err = verify_ipn_signature("", b"{}", "abc").unwrap_err();
        assert!(matches!(err, PaymentError::Configuration(_)));
    }

    #[test]
    fn test_malformed_payload_is_error_not_mismatch() {
        let err = verify_ipn_signature(SECRET, b"not json", "abc").unwrap_err();
        assert!(matches!(err, PaymentError::Serialization(_)));
    }
}

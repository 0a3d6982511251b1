//! # RoboKassa Result Callback Verification
//!
//! The gateway notifies the merchant with `OutSum`, `InvId` and a
//! `SignatureValue` digest keyed on password #2. Verification recomputes
//! the digest and compares case-insensitively in constant time.
//!
//! Known gap: the protocol carries no nonce, so a captured valid signature
//! can be replayed for the same invoice. Left as documented.

use crate::config::RoboKassaConfig;
use crate::payment::md5_hex;
use serde::Deserialize;
use tracing::warn;

/// Parameters of an incoming result callback
#[derive(Debug, Clone, Deserialize)]
pub struct CallbackParams {
    #[serde(rename = "OutSum")]
    pub out_sum: String,

    #[serde(rename = "InvId")]
    pub inv_id: String,

    #[serde(rename = "SignatureValue")]
    pub signature: String,
}

/// Verify the authenticity of a result callback.
///
/// Expected digest: `md5(out_sum:inv_id:password2)`.
pub fn verify_callback(config: &RoboKassaConfig, params: &CallbackParams) -> bool {
    let expected = md5_hex(&format!(
        "{}:{}:{}",
        params.out_sum, params.inv_id, config.password2
    ));

    let valid = constant_time_eq_ignore_case(&expected, &params.signature);
    if !valid {
        warn!(inv_id = %params.inv_id, "RoboKassa callback signature mismatch");
    }
    valid
}

/// Case-insensitive comparison without early exit on the first differing
/// byte. Both sides are hex digests, so ASCII lowercasing is lossless.
fn constant_time_eq_ignore_case(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.bytes()
        .zip(b.bytes())
        .fold(0u8, |acc, (x, y)| {
            acc | (x.to_ascii_lowercase() ^ y.to_ascii_lowercase())
        })
        == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> RoboKassaConfig {
        RoboKassaConfig::new("nomadshop", "password_one", "password_two")
    }

    fn signed_params(out_sum: &str, inv_id: &str) -> CallbackParams {
        CallbackParams {
            out_sum: out_sum.to_string(),
            inv_id: inv_id.to_string(),
            signature: md5_hex(&format!("{out_sum}:{inv_id}:password_two")),
        }
    }

    #[test]
    fn test_accepts_matching_signature() {
        assert!(verify_callback(&config(), &signed_params("12000", "42")));
    }

    #[test]
    fn test_signature_comparison_is_case_insensitive() {
        let mut params = signed_params("12000", "42");
        params.signature = params.signature.to_uppercase();
        assert!(verify_callback(&config(), &params));
    }

    #[test]
    fn test_rejects_every_single_character_mutation() {
        let params = signed_params("12000", "42");

        for i in 0..params.signature.len() {
            let mut mutated = params.signature.clone().into_bytes();
            mutated[i] = if mutated[i] == b'0' { b'1' } else { b'0' };

            let bad = CallbackParams {
                signature: String::from_utf8(mutated).unwrap(),
                ..params.clone()
            };
            assert!(
                !verify_callback(&config(), &bad),
                "mutation at byte {i} was accepted"
            );
        }
    }

    #[test]
    fn test_rejects_wrong_amount_or_invoice() {
        let params = signed_params("12000", "42");

        let wrong_amount = CallbackParams {
            out_sum: "11999".to_string(),
            ..params.clone()
        };
        assert!(!verify_callback(&config(), &wrong_amount));

        let wrong_invoice = CallbackParams {
            inv_id: "43".to_string(),
            ..params
        };
        assert!(!verify_callback(&config(), &wrong_invoice));
    }

    #[test]
    fn test_rejects_truncated_signature() {
        let mut params = signed_params("12000", "42");
        params.signature.pop();
        assert!(!verify_callback(&config(), &params));
    }
}

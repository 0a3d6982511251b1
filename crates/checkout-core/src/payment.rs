//! # Payment Request & Outcome Types
//!
//! One dispatch attempt = one [`PaymentRequest`]; providers answer with a
//! redirect target or a typed error, which the dispatcher normalizes into a
//! [`PaymentOutcome`] for the caller.

use crate::contact::ContactInfo;
use crate::currency::SettlementCurrency;
use crate::error::{ErrorKind, PaymentError};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Generate an order identifier: `order_<unix-ts>_<random suffix>`.
///
/// Generated at the dispatch boundary so identifiers are comparable across
/// providers. Timestamp plus random suffix is a correlation key, not a
/// security token.
pub fn generate_order_id() -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("order_{}_{}", Utc::now().timestamp(), &suffix[..8])
}

/// A single payment attempt handed to exactly one provider.
///
/// `settlement_amount` is pre-converted by the dispatcher: identical to
/// `amount_eur` for EUR, the rounded whole-ruble amount for RUB, and the
/// EUR amount again for crypto (the provider quotes its own rate).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentRequest {
    /// Opaque identifier, unique per attempt
    pub order_id: String,

    /// Order description shown on the provider's payment page
    pub description: String,

    /// Customer contact record (validated upstream)
    pub contact: ContactInfo,

    /// Order total in EUR
    pub amount_eur: f64,

    /// Currency the customer pays in
    pub settlement_currency: SettlementCurrency,

    /// Amount in the settlement currency
    pub settlement_amount: f64,
}

/// Successful payment initiation: where to send the customer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentRedirect {
    /// Hosted payment page to navigate to
    pub url: String,

    /// Provider name ("stripe", "robokassa", "nowpayments")
    pub provider: String,

    /// Provider-side payment/session identifier, when one exists
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_payment_id: Option<String>,
}

impl PaymentRedirect {
    pub fn new(url: impl Into<String>, provider: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            provider: provider.into(),
            provider_payment_id: None,
        }
    }

    /// Builder: attach the provider's payment identifier
    pub fn with_payment_id(mut self, id: impl Into<String>) -> Self {
        self.provider_payment_id = Some(id.into());
        self
    }
}

/// Normalized result of one dispatch attempt
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PaymentOutcome {
    /// Provider produced a hosted payment page; caller navigates away
    Redirect {
        url: String,
        provider: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        provider_payment_id: Option<String>,
    },
    /// Attempt failed; terminal, user must explicitly retry
    Failure { kind: ErrorKind, message: String },
}

impl PaymentOutcome {
    /// Normalize a provider result
    pub fn from_result(result: Result<PaymentRedirect, PaymentError>) -> Self {
        match result {
            Ok(redirect) => PaymentOutcome::Redirect {
                url: redirect.url,
                provider: redirect.provider,
                provider_payment_id: redirect.provider_payment_id,
            },
            Err(err) => PaymentOutcome::Failure {
                kind: err.kind(),
                message: err.to_string(),
            },
        }
    }

    pub fn is_redirect(&self) -> bool {
        matches!(self, PaymentOutcome::Redirect { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_id_format() {
        let id = generate_order_id();
        let parts: Vec<&str> = id.splitn(3, '_').collect();

        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "order");
        assert!(parts[1].parse::<i64>().is_ok());
        assert_eq!(parts[2].len(), 8);
    }

    #[test]
    fn test_order_ids_are_unique_enough() {
        let a = generate_order_id();
        let b = generate_order_id();
        assert_ne!(a, b);
    }

    #[test]
    fn test_outcome_normalization() {
        let ok = PaymentOutcome::from_result(Ok(
            PaymentRedirect::new("https://pay.example/x", "stripe").with_payment_id("cs_123")
        ));
        assert!(ok.is_redirect());

        let err = PaymentOutcome::from_result(Err(PaymentError::ProviderUnavailable {
            provider: "nowpayments".into(),
        }));
        match err {
            PaymentOutcome::Failure { kind, .. } => {
                assert_eq!(kind, ErrorKind::ProviderUnavailable)
            }
            _ => panic!("expected failure"),
        }
    }

    #[test]
    fn test_outcome_serialization_shape() {
        let outcome = PaymentOutcome::Redirect {
            url: "https://pay.example/x".into(),
            provider: "stripe".into(),
            provider_payment_id: None,
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["outcome"], "redirect");
        assert!(json.get("provider_payment_id").is_none());
    }
}

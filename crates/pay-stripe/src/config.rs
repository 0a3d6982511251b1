//! # Stripe Configuration
//!
//! Configuration for the Stripe integration. All secrets come from
//! environment variables with empty-string defaults: a missing key is not
//! fatal at load time and only becomes a configuration error when a
//! payment is actually attempted.

use checkout_core::{PaymentError, PaymentResult};
use std::env;

/// Stripe API configuration
#[derive(Debug, Clone)]
pub struct StripeConfig {
    /// Secret API key (sk_test_... or sk_live_...)
    pub secret_key: String,

    /// Publishable key (pk_test_... or pk_live_...)
    pub publishable_key: String,

    /// API base URL (overridable for testing/mocking)
    pub api_base_url: String,

    /// Application origin for success/cancel redirect targets
    pub origin: String,

    /// Test-mode flag
    pub test_mode: bool,
}

impl StripeConfig {
    /// Load configuration from environment variables.
    ///
    /// Env vars: `STRIPE_SECRET_KEY`, `STRIPE_PUBLISHABLE_KEY`,
    /// `STRIPE_TEST_MODE`, `APP_ORIGIN`. Absent values default to empty
    /// strings (or `http://localhost:8080` for the origin).
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            secret_key: env::var("STRIPE_SECRET_KEY").unwrap_or_default(),
            publishable_key: env::var("STRIPE_PUBLISHABLE_KEY").unwrap_or_default(),
            api_base_url: "https://api.stripe.com".to_string(),
            origin: env::var("APP_ORIGIN")
                .unwrap_or_else(|_| "http://localhost:8080".to_string()),
            test_mode: env::var("STRIPE_TEST_MODE").as_deref() == Ok("true"),
        }
    }

    /// Create config with explicit values (for testing)
    pub fn new(secret_key: impl Into<String>, origin: impl Into<String>) -> Self {
        Self {
            secret_key: secret_key.into(),
            publishable_key: String::new(),
            api_base_url: "https://api.stripe.com".to_string(),
            origin: origin.into(),
            test_mode: true,
        }
    }

    /// Builder: set custom API base URL (for testing)
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    /// Check that the key needed for an API call is present.
    pub fn ensure_configured(&self) -> PaymentResult<()> {
        if self.secret_key.is_empty() {
            return Err(PaymentError::Configuration(
                "STRIPE_SECRET_KEY is not set".to_string(),
            ));
        }
        Ok(())
    }

    /// Check if using test keys
    pub fn is_test_mode(&self) -> bool {
        self.test_mode || self.secret_key.starts_with("sk_test_")
    }

    /// Get authorization header value
    pub fn auth_header(&self) -> String {
        format!("Bearer {}", self.secret_key)
    }

    /// Success redirect target with the session-id placeholder Stripe fills in
    pub fn success_url(&self) -> String {
        format!("{}/payment/success?session_id={{CHECKOUT_SESSION_ID}}", self.origin)
    }

    /// Cancel redirect target
    pub fn cancel_url(&self) -> String {
        format!("{}/payment/cancel", self.origin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_key_is_deferred_to_invoke_time() {
        let config = StripeConfig::new("", "https://example.com");
        let err = config.ensure_configured().unwrap_err();
        assert!(matches!(err, PaymentError::Configuration(_)));

        let config = StripeConfig::new("sk_test_abc123", "https://example.com");
        assert!(config.ensure_configured().is_ok());
    }

    #[test]
    fn test_auth_header() {
        let config = StripeConfig::new("sk_test_abc123", "https://example.com");
        assert_eq!(config.auth_header(), "Bearer sk_test_abc123");
        assert!(config.is_test_mode());
    }

    #[test]
    fn test_redirect_targets() {
        let config = StripeConfig::new("sk_test_abc", "https://nomad.example");
        assert_eq!(
            config.success_url(),
            "https://nomad.example/payment/success?session_id={CHECKOUT_SESSION_ID}"
        );
        assert_eq!(config.cancel_url(), "https://nomad.example/payment/cancel");
    }
}

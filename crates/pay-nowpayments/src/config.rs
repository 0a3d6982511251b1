//! # NOWPayments Configuration
//!
//! API credentials for the NOWPayments integration, loaded from
//! environment variables with empty-string defaults. The public key falls
//! back to the API key when not set separately.

use std::env;

/// Default API endpoint (production URL is used in test mode as well)
pub const DEFAULT_BASE_URL: &str = "https://api.nowpayments.io/v1";

/// NOWPayments API configuration
#[derive(Debug, Clone)]
pub struct NowPaymentsConfig {
    /// Privileged API key
    pub api_key: String,

    /// Restricted public key (diagnostics); defaults to the API key
    pub public_key: String,

    /// IPN HMAC secret
    pub ipn_secret: String,

    /// API base URL (overridable for testing/mocking)
    pub base_url: String,

    /// Application origin for callback/redirect targets
    pub origin: String,
}

impl NowPaymentsConfig {
    /// Load configuration from environment variables.
    ///
    /// Env vars: `NOWPAYMENTS_API_KEY`, `NOWPAYMENTS_PUBLIC_KEY`,
    /// `NOWPAYMENTS_IPN_SECRET`, `APP_ORIGIN`.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let api_key = env::var("NOWPAYMENTS_API_KEY").unwrap_or_default();
        let public_key =
            env::var("NOWPAYMENTS_PUBLIC_KEY").unwrap_or_else(|_| api_key.clone());

        Self {
            api_key,
            public_key,
            ipn_secret: env::var("NOWPAYMENTS_IPN_SECRET").unwrap_or_default(),
            base_url: DEFAULT_BASE_URL.to_string(),
            origin: env::var("APP_ORIGIN")
                .unwrap_or_else(|_| "http://localhost:8080".to_string()),
        }
    }

    /// Create config with explicit values (for testing)
    pub fn new(api_key: impl Into<String>, origin: impl Into<String>) -> Self {
        let api_key = api_key.into();
        Self {
            public_key: api_key.clone(),
            api_key,
            ipn_secret: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            origin: origin.into(),
        }
    }

    /// Builder: set custom API base URL (for testing)
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Builder: set a distinct public key
    pub fn with_public_key(mut self, key: impl Into<String>) -> Self {
        self.public_key = key.into();
        self
    }

    /// Builder: set the IPN secret
    pub fn with_ipn_secret(mut self, secret: impl Into<String>) -> Self {
        self.ipn_secret = secret.into();
        self
    }

    /// IPN notification target
    pub fn ipn_callback_url(&self) -> String {
        format!("{}/api/nowpayments/callback", self.origin)
    }

    /// Post-payment redirect targets
    pub fn success_url(&self) -> String {
        format!("{}/payment/success", self.origin)
    }

    pub fn cancel_url(&self) -> String {
        format!("{}/payment/cancel", self.origin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_key_defaults_to_api_key() {
        let config = NowPaymentsConfig::new("api-key-1", "https://example.com");
        assert_eq!(config.public_key, "api-key-1");

        let config = config.with_public_key("public-key-1");
        assert_eq!(config.public_key, "public-key-1");
        assert_eq!(config.api_key, "api-key-1");
    }

    #[test]
    fn test_callback_urls() {
        let config = NowPaymentsConfig::new("k", "https://nomad.example");
        assert_eq!(
            config.ipn_callback_url(),
            "https://nomad.example/api/nowpayments/callback"
        );
        assert_eq!(config.success_url(), "https://nomad.example/payment/success");
        assert_eq!(config.cancel_url(), "https://nomad.example/payment/cancel");
    }
}

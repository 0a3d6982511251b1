//! # RoboKassa Configuration
//!
//! Merchant credentials for the RoboKassa integration, loaded from
//! environment variables with empty-string defaults. A missing merchant
//! login surfaces as a configuration error at payment time, not at load.

use std::env;

/// Default merchant gateway endpoint
pub const DEFAULT_BASE_URL: &str = "https://auth.robokassa.ru/Merchant/Index.aspx";

/// RoboKassa merchant configuration
#[derive(Debug, Clone)]
pub struct RoboKassaConfig {
    /// Merchant identifier (MerchantLogin)
    pub merchant_login: String,

    /// Password #1: signs outgoing payment links
    pub password1: String,

    /// Password #2: verifies result callbacks
    pub password2: String,

    /// Test-mode flag (adds IsTest=1 to the redirect)
    pub test_mode: bool,

    /// Gateway base URL
    pub base_url: String,
}

impl RoboKassaConfig {
    /// Load configuration from environment variables.
    ///
    /// Env vars: `ROBOKASSA_MERCHANT_LOGIN`, `ROBOKASSA_PASSWORD1`,
    /// `ROBOKASSA_PASSWORD2`, `ROBOKASSA_TEST_MODE`.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            merchant_login: env::var("ROBOKASSA_MERCHANT_LOGIN").unwrap_or_default(),
            password1: env::var("ROBOKASSA_PASSWORD1").unwrap_or_default(),
            password2: env::var("ROBOKASSA_PASSWORD2").unwrap_or_default(),
            test_mode: env::var("ROBOKASSA_TEST_MODE").as_deref() == Ok("true"),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Create config with explicit values (for testing)
    pub fn new(
        merchant_login: impl Into<String>,
        password1: impl Into<String>,
        password2: impl Into<String>,
    ) -> Self {
        Self {
            merchant_login: merchant_login.into(),
            password1: password1.into(),
            password2: password2.into(),
            test_mode: false,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Builder: enable test mode
    pub fn with_test_mode(mut self, test_mode: bool) -> Self {
        self.test_mode = test_mode;
        self
    }
}

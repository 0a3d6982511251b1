//! # RoboKassa Payment Links
//!
//! RoboKassa has no session-creation API: the payment is a signed GET
//! redirect to the merchant gateway. The signature covers the merchant
//! login and the charge amount, so the amount must be rounded to whole
//! rubles *before* signing; signing the raw decimal would fail gateway
//! verification downstream.

use crate::config::RoboKassaConfig;
use async_trait::async_trait;
use checkout_core::{
    PaymentError, PaymentProvider, PaymentRedirect, PaymentRequest, PaymentResult,
    SettlementCurrency,
};
use md5::{Digest, Md5};
use tracing::{debug, instrument};
use url::Url;

/// RoboKassa signed-redirect provider (RUB settlement).
pub struct RoboKassaProvider {
    config: RoboKassaConfig,
}

impl RoboKassaProvider {
    pub fn new(config: RoboKassaConfig) -> Self {
        Self { config }
    }

    /// Create from environment variables
    pub fn from_env() -> Self {
        Self::new(RoboKassaConfig::from_env())
    }

    /// Sign an outgoing payment: `md5(login:out_sum::password1)`.
    fn sign_payment(&self, out_sum: &str) -> String {
        md5_hex(&format!(
            "{}:{}::{}",
            self.config.merchant_login, out_sum, self.config.password1
        ))
    }

    /// Build the signed redirect URL for a request.
    pub fn payment_url(&self, request: &PaymentRequest) -> PaymentResult<Url> {
        if self.config.merchant_login.is_empty() {
            return Err(PaymentError::Configuration(
                "ROBOKASSA_MERCHANT_LOGIN is not set".to_string(),
            ));
        }

        // Whole rubles; the dispatcher pre-converts but the rounding is
        // re-applied here because the signature depends on it.
        let out_sum = (request.settlement_amount.round() as i64).to_string();
        let signature = self.sign_payment(&out_sum);

        let mut params: Vec<(&str, &str)> = vec![
            ("MerchantLogin", &self.config.merchant_login),
            ("OutSum", &out_sum),
            ("Description", &request.description),
            ("SignatureValue", &signature),
        ];
        if self.config.test_mode {
            params.push(("IsTest", "1"));
        }

        Url::parse_with_params(&self.config.base_url, &params)
            .map_err(|e| PaymentError::Internal(format!("Invalid gateway URL: {e}")))
    }
}

#[async_trait]
impl PaymentProvider for RoboKassaProvider {
    #[instrument(skip(self, request), fields(order_id = %request.order_id))]
    async fn initiate(&self, request: &PaymentRequest) -> PaymentResult<PaymentRedirect> {
        let url = self.payment_url(request)?;

        debug!(out_sum = request.settlement_amount, "Built RoboKassa redirect");

        Ok(PaymentRedirect::new(url, "robokassa"))
    }

    fn provider_name(&self) -> &'static str {
        "robokassa"
    }

    fn settlement_currency(&self) -> SettlementCurrency {
        SettlementCurrency::Rub
    }
}

/// Lowercase hex MD5 digest
pub(crate) fn md5_hex(input: &str) -> String {
    let mut hasher = Md5::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}

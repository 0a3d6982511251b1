//! # NOWPayments Diagnostics
//!
//! Best-effort helpers around the NOWPayments read APIs: currency listing,
//! minimum amounts, rate estimates and payment status. None of these ever
//! fail the caller; every error degrades to a usable default.

use crate::invoice::NowPaymentsProvider;
use serde::Deserialize;
use tracing::{debug, warn};

/// Currencies assumed available when the listing cannot be fetched
pub const FALLBACK_CURRENCIES: &[&str] = &["BTC", "ETH", "USDT", "TRX"];

#[derive(Debug, Deserialize)]
struct CurrenciesResponse {
    #[serde(default)]
    currencies: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct MinAmountResponse {
    #[serde(default)]
    min_amount: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct EstimateResponse {
    #[serde(default)]
    estimated_amount: Option<f64>,
}

/// Snapshot of one payment's provider-side state
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentStatus {
    #[serde(default)]
    pub payment_id: Option<serde_json::Value>,
    #[serde(default)]
    pub payment_status: Option<String>,
    #[serde(default)]
    pub pay_address: Option<String>,
    #[serde(default)]
    pub price_amount: Option<f64>,
    #[serde(default)]
    pub pay_amount: Option<f64>,
    #[serde(default)]
    pub pay_currency: Option<String>,
    #[serde(default)]
    pub order_id: Option<String>,
}

impl NowPaymentsProvider {
    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        endpoint: &str,
        api_key: &str,
    ) -> Result<T, String> {
        if api_key.is_empty() {
            return Err("no API key configured".to_string());
        }

        let url = format!("{}{}", self.config.base_url, endpoint);
        let response = self
            .client
            .get(&url)
            .header("x-api-key", api_key)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(crate::invoice::extract_error_message(status, &body));
        }

        response.json().await.map_err(|e| e.to_string())
    }

    /// List available pay currencies.
    ///
    /// Tries the restricted public key first, then the privileged key,
    /// then a hardcoded set; the caller always gets a list.
    pub async fn available_currencies(&self) -> Vec<String> {
        match self
            .get_json::<CurrenciesResponse>("/currencies", &self.config.public_key)
            .await
        {
            Ok(response) if !response.currencies.is_empty() => response.currencies,
            Ok(_) | Err(_) => {
                debug!("Currency listing with public key failed, retrying with API key");
                match self
                    .get_json::<CurrenciesResponse>("/currencies", &self.config.api_key)
                    .await
                {
                    Ok(response) if !response.currencies.is_empty() => response.currencies,
                    Ok(_) => fallback_currencies(),
                    Err(e) => {
                        warn!("Currency listing failed: {e}");
                        fallback_currencies()
                    }
                }
            }
        }
    }

    /// Minimum payable amount for a pay currency, in EUR terms.
    pub async fn minimum_amount(&self, currency: &str) -> f64 {
        let endpoint = format!(
            "/min-amount?currency_from=eur&currency_to={}",
            currency.to_lowercase()
        );
        match self
            .get_json::<MinAmountResponse>(&endpoint, &self.config.api_key)
            .await
        {
            Ok(response) => response.min_amount.unwrap_or(0.0001),
            Err(e) => {
                warn!("Minimum-amount lookup failed: {e}");
                0.0001
            }
        }
    }

    /// Estimated conversion of an amount between two currencies.
    /// Falls back to the input amount on any failure.
    pub async fn estimate(&self, amount: f64, from: &str, to: &str) -> f64 {
        let endpoint = format!(
            "/estimate?amount={amount}&currency_from={}&currency_to={}",
            from.to_lowercase(),
            to.to_lowercase()
        );
        match self
            .get_json::<EstimateResponse>(&endpoint, &self.config.api_key)
            .await
        {
            Ok(response) => response.estimated_amount.unwrap_or(amount),
            Err(e) => {
                warn!("Estimate lookup failed: {e}");
                amount
            }
        }
    }

    /// Read one payment's status; `None` when the lookup fails.
    pub async fn payment_status(&self, payment_id: &str) -> Option<PaymentStatus> {
        match self
            .get_json::<PaymentStatus>(&format!("/payment/{payment_id}"), &self.config.api_key)
            .await
        {
            Ok(status) => Some(status),
            Err(e) => {
                warn!(payment_id, "Payment status lookup failed: {e}");
                None
            }
        }
    }
}

fn fallback_currencies() -> Vec<String> {
    FALLBACK_CURRENCIES.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NowPaymentsConfig;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider(base_url: &str) -> NowPaymentsProvider {
        NowPaymentsProvider::new(
            NowPaymentsConfig::new("np-api-key", "https://nomad.example")
                .with_public_key("np-public-key")
                .with_base_url(base_url),
        )
    }

    #[tokio::test]
    async fn test_currencies_with_public_key() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/currencies"))
            .and(header("x-api-key", "np-public-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "currencies": ["btc", "eth", "usdttrc20"]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let currencies = provider(&server.uri()).available_currencies().await;
        assert_eq!(currencies, vec!["btc", "eth", "usdttrc20"]);
    }

    #[tokio::test]
    async fn test_currencies_fall_back_to_api_key_then_hardcoded() {
        let server = MockServer::start().await;

        // Both keys rejected
        Mock::given(method("GET"))
            .and(path("/currencies"))
            .respond_with(ResponseTemplate::new(403).set_body_json(serde_json::json!({
                "message": "Invalid api key"
            })))
            .expect(2)
            .mount(&server)
            .await;

        let currencies = provider(&server.uri()).available_currencies().await;
        assert_eq!(currencies, vec!["BTC", "ETH", "USDT", "TRX"]);
    }

    #[tokio::test]
    async fn test_minimum_amount_and_default() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/min-amount"))
            .and(query_param("currency_to", "usdttrc20"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "min_amount": 8.5
            })))
            .mount(&server)
            .await;

        let provider = provider(&server.uri());
        assert_eq!(provider.minimum_amount("USDTTRC20").await, 8.5);
        // Unknown currency: endpoint mismatch -> default
        assert_eq!(provider.minimum_amount("xyz").await, 0.0001);
    }

    #[tokio::test]
    async fn test_estimate_falls_back_to_input() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/estimate"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let estimated = provider(&server.uri()).estimate(120.0, "eur", "usdttrc20").await;
        assert_eq!(estimated, 120.0);
    }

    #[tokio::test]
    async fn test_payment_status_none_on_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/payment/123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "payment_id": 123,
                "payment_status": "finished",
                "order_id": "order_1_a"
            })))
            .mount(&server)
            .await;

        let provider = provider(&server.uri());

        let status = provider.payment_status("123").await.unwrap();
        assert_eq!(status.payment_status.as_deref(), Some("finished"));
        assert_eq!(status.order_id.as_deref(), Some("order_1_a"));

        assert!(provider.payment_status("missing").await.is_none());
    }
}

//! # NOWPayments Crypto Invoices
//!
//! Invoice creation for the USDT (TRC20) settlement path.
//!
//! The flow is two-step: a liveness probe against `/status` first, then
//! the invoice POST. If the API is unreachable the attempt fails fast with
//! a distinct error before any creation is tried. The invoice is priced in
//! EUR; the provider quotes its own crypto rate at payment time.

use crate::config::NowPaymentsConfig;
use async_trait::async_trait;
use checkout_core::{
    PaymentError, PaymentProvider, PaymentRedirect, PaymentRequest, PaymentResult,
    SettlementCurrency,
};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};

/// Settlement ticker sent as `pay_currency`
const PAY_CURRENCY: &str = "usdttrc20";

/// NOWPayments hosted-invoice provider.
pub struct NowPaymentsProvider {
    pub(crate) config: NowPaymentsConfig,
    pub(crate) client: Client,
}

impl NowPaymentsProvider {
    /// Create a new NOWPayments provider
    pub fn new(config: NowPaymentsConfig) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self { config, client }
    }

    /// Create from environment variables
    pub fn from_env() -> Self {
        Self::new(NowPaymentsConfig::from_env())
    }

    /// Liveness probe: `GET /status` must answer `{"message":"OK"}`.
    pub async fn check_status(&self) -> bool {
        let url = format!("{}/status", self.config.base_url);

        match self.client.get(&url).send().await {
            Ok(response) if response.status().is_success() => response
                .json::<StatusResponse>()
                .await
                .map(|s| s.message == "OK")
                .unwrap_or(false),
            Ok(response) => {
                warn!(status = %response.status(), "NOWPayments status probe failed");
                false
            }
            Err(e) => {
                warn!("NOWPayments status probe unreachable: {e}");
                false
            }
        }
    }
}

#[async_trait]
impl PaymentProvider for NowPaymentsProvider {
    #[instrument(skip(self, request), fields(order_id = %request.order_id))]
    async fn initiate(&self, request: &PaymentRequest) -> PaymentResult<PaymentRedirect> {
        if self.config.api_key.is_empty() {
            return Err(PaymentError::Configuration(
                "NOWPAYMENTS_API_KEY is not set".to_string(),
            ));
        }

        // Fail fast before attempting creation
        if !self.check_status().await {
            return Err(PaymentError::ProviderUnavailable {
                provider: "nowpayments".to_string(),
            });
        }

        let body = InvoiceRequest {
            price_amount: request.amount_eur,
            price_currency: "eur",
            pay_currency: PAY_CURRENCY,
            order_id: &request.order_id,
            order_description: &request.description,
            ipn_callback_url: self.config.ipn_callback_url(),
            success_url: self.config.success_url(),
            cancel_url: self.config.cancel_url(),
        };

        debug!(amount_eur = request.amount_eur, "Creating NOWPayments invoice");

        let url = format!("{}/invoice", self.config.base_url);

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| PaymentError::Transport(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| PaymentError::Transport(e.to_string()))?;

        if !status.is_success() {
            error!("NOWPayments API error: status={status}, body={text}");
            return Err(PaymentError::Provider {
                provider: "nowpayments".to_string(),
                message: extract_error_message(status, &text),
            });
        }

        let invoice: InvoiceResponse = serde_json::from_str(&text).map_err(|e| {
            PaymentError::Serialization(format!("Failed to parse NOWPayments response: {e}"))
        })?;

        let payment_id = invoice.payment_id();

        // Some responses omit invoice_url; derive the hosted page from the
        // id rather than failing the attempt.
        let url = match invoice.invoice_url {
            Some(url) => url,
            None => {
                let id = payment_id.clone().ok_or_else(|| {
                    PaymentError::Serialization(
                        "NOWPayments response carried neither invoice_url nor id".to_string(),
                    )
                })?;
                format!("https://nowpayments.io/payment/?iid={id}")
            }
        };

        info!(payment_id = ?payment_id, "Created NOWPayments invoice");

        let mut redirect = PaymentRedirect::new(url, "nowpayments");
        if let Some(id) = payment_id {
            redirect = redirect.with_payment_id(id);
        }
        Ok(redirect)
    }

    fn provider_name(&self) -> &'static str {
        "nowpayments"
    }

    fn settlement_currency(&self) -> SettlementCurrency {
        SettlementCurrency::Usdt
    }
}

/// Best-effort message extraction: structured `message`/`error` fields
/// preferred, raw body text as fallback.
pub(crate) fn extract_error_message(status: reqwest::StatusCode, body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<ApiErrorBody>(body) {
        if let Some(message) = parsed.message.or(parsed.error) {
            return message;
        }
    }
    if body.is_empty() {
        format!("HTTP {status}")
    } else {
        body.to_string()
    }
}

// =============================================================================
// NOWPayments API Types
// =============================================================================

#[derive(Debug, Deserialize)]
struct StatusResponse {
    #[serde(default)]
    message: String,
}

#[derive(Debug, Serialize)]
struct InvoiceRequest<'a> {
    price_amount: f64,
    price_currency: &'static str,
    pay_currency: &'static str,
    order_id: &'a str,
    order_description: &'a str,
    ipn_callback_url: String,
    success_url: String,
    cancel_url: String,
}

#[derive(Debug, Deserialize)]
struct InvoiceResponse {
    #[serde(default)]
    id: Option<serde_json::Value>,
    #[serde(default)]
    payment_id: Option<serde_json::Value>,
    #[serde(default)]
    invoice_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl InvoiceResponse {
    /// The provider's identifier, from `id` or `payment_id`, as a string
    /// whether the wire carried a string or a number.
    fn payment_id(&self) -> Option<String> {
        self.id
            .as_ref()
            .or(self.payment_id.as_ref())
            .and_then(value_to_id)
    }
}

fn value_to_id(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

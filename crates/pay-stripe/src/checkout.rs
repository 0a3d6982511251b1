//! # Stripe Checkout Sessions
//!
//! Hosted checkout session creation plus the session read used by the
//! post-payment landing page.
//!
//! The whole order goes to Stripe as one aggregated line item: the catalog
//! breakdown stays on our side, and the order id travels in session
//! metadata for later correlation.

use crate::config::StripeConfig;
use async_trait::async_trait;
use checkout_core::{
    PaymentError, PaymentProvider, PaymentRedirect, PaymentRequest, PaymentResult,
    SettlementCurrency,
};
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::{debug, error, info, instrument};

/// Display name of the aggregated line item on the hosted page
const LINE_ITEM_NAME: &str = "Digital Nomad services";

/// Stripe Checkout Sessions provider.
///
/// Uses Stripe's hosted checkout page; the card never touches this process.
pub struct StripeProvider {
    config: StripeConfig,
    client: Client,
}

impl StripeProvider {
    /// Create a new Stripe provider
    pub fn new(config: StripeConfig) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self { config, client }
    }

    /// Create from environment variables
    pub fn from_env() -> Self {
        Self::new(StripeConfig::from_env())
    }

    /// Build the form body for the session-creation call.
    ///
    /// Exactly one line item carrying the discounted total; the per-service
    /// breakdown goes into the item description.
    fn build_form_params(&self, request: &PaymentRequest) -> Vec<(String, String)> {
        let amount_in_cents = (request.amount_eur * 100.0).round() as i64;

        let mut params: Vec<(String, String)> = vec![
            ("success_url".into(), self.config.success_url()),
            ("cancel_url".into(), self.config.cancel_url()),
            ("payment_method_types[0]".into(), "card".into()),
            ("mode".into(), "payment".into()),
            (
                "line_items[0][price_data][currency]".into(),
                "eur".into(),
            ),
            (
                "line_items[0][price_data][product_data][name]".into(),
                LINE_ITEM_NAME.into(),
            ),
            (
                "line_items[0][price_data][product_data][description]".into(),
                request.description.clone(),
            ),
            (
                "line_items[0][price_data][unit_amount]".into(),
                amount_in_cents.to_string(),
            ),
            ("line_items[0][quantity]".into(), "1".into()),
            ("metadata[orderId]".into(), request.order_id.clone()),
        ];

        if !request.contact.email.is_empty() {
            params.push(("customer_email".into(), request.contact.email.clone()));
        }

        params
    }

    /// Read back a checkout session for the confirmation page.
    #[instrument(skip(self))]
    pub async fn retrieve_session(&self, session_id: &str) -> PaymentResult<SessionSnapshot> {
        self.config.ensure_configured()?;

        let url = format!(
            "{}/v1/checkout/sessions/{}",
            self.config.api_base_url, session_id
        );

        let response = self
            .client
            .get(&url)
            .header("Authorization", self.config.auth_header())
            .send()
            .await
            .map_err(|e| PaymentError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| PaymentError::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(provider_error(status, &body));
        }

        serde_json::from_str(&body).map_err(|e| {
            PaymentError::Serialization(format!("Failed to parse Stripe session: {e}"))
        })
    }
}

#[async_trait]
impl PaymentProvider for StripeProvider {
    #[instrument(skip(self, request), fields(order_id = %request.order_id))]
    async fn initiate(&self, request: &PaymentRequest) -> PaymentResult<PaymentRedirect> {
        self.config.ensure_configured()?;

        let form_params = self.build_form_params(request);

        debug!(
            amount_eur = request.amount_eur,
            "Creating Stripe checkout session"
        );

        let url = format!("{}/v1/checkout/sessions", self.config.api_base_url);

        let response = self
            .client
            .post(&url)
            .header("Authorization", self.config.auth_header())
            .form(&form_params)
            .send()
            .await
            .map_err(|e| PaymentError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| PaymentError::Transport(e.to_string()))?;

        if !status.is_success() {
            error!("Stripe API error: status={status}, body={body}");
            return Err(provider_error(status, &body));
        }

        let session: CheckoutSessionResponse = serde_json::from_str(&body).map_err(|e| {
            PaymentError::Serialization(format!("Failed to parse Stripe response: {e}"))
        })?;

        info!(session_id = %session.id, "Created Stripe checkout session");

        Ok(PaymentRedirect::new(session.url, "stripe").with_payment_id(session.id))
    }

    fn provider_name(&self) -> &'static str {
        "stripe"
    }

    fn settlement_currency(&self) -> SettlementCurrency {
        SettlementCurrency::Eur
    }
}

/// Map a non-2xx response to a provider error, preferring the structured
/// error message and falling back to the raw body text.
fn provider_error(status: reqwest::StatusCode, body: &str) -> PaymentError {
    let message = serde_json::from_str::<ErrorResponse>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| {
            if body.is_empty() {
                format!("HTTP {status}")
            } else {
                body.to_string()
            }
        });

    PaymentError::Provider {
        provider: "stripe".to_string(),
        message,
    }
}

// =============================================================================
// Stripe API Types
// =============================================================================

#[derive(Debug, Deserialize)]
struct CheckoutSessionResponse {
    id: String,
    url: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Snapshot of a checkout session, rendered on the confirmation page
#[derive(Debug, Clone, Deserialize)]
pub struct SessionSnapshot {
    pub id: String,
    /// Total charged, in minor units
    #[serde(default)]
    pub amount_total: Option<i64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub customer_email: Option<String>,
    #[serde(default)]
    pub payment_status: Option<String>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl SessionSnapshot {
    /// The order id recorded at session creation
    pub fn order_id(&self) -> Option<&str> {
        self.metadata.get("orderId").map(String::as_str)
    }

    /// Check if payment has settled
    pub fn is_paid(&self) -> bool {
        self.payment_status.as_deref() == Some("paid")
    }
}

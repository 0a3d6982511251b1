//! # Request Handlers
//!
//! Axum request handlers for the checkout API. Each checkout request runs
//! through a fresh `CheckoutSession`, so every guard of the step machine
//! applies and the quotation is recomputed immediately before dispatch.

use crate::state::AppState;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse},
    Json,
};
use checkout_core::{
    CheckoutSession, ContactInfo, FieldError, PaymentError, PaymentMethod, PaymentOutcome,
    Quotation, Selection,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{error, info, instrument};

// =============================================================================
// Request/Response Types
// =============================================================================

/// Quote request: selected service ids plus the (possibly partial) contact
/// record, since the promo code affects pricing before contact validation.
#[derive(Debug, Deserialize)]
pub struct QuoteRequest {
    #[serde(default)]
    pub services: Vec<String>,
    #[serde(default)]
    pub contact: ContactInfo,
}

/// Per-method advisory amount shown on the payment buttons
#[derive(Debug, Serialize)]
pub struct MethodAmount {
    pub method: &'static str,
    pub label: &'static str,
    pub amount: f64,
    pub display: String,
}

/// Quote response: the priced order plus converted display amounts
#[derive(Debug, Serialize)]
pub struct QuoteResponse {
    #[serde(flatten)]
    pub quotation: Quotation,
    pub converted: Vec<MethodAmount>,
}

/// Checkout request: one full dispatch attempt
#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    #[serde(default)]
    pub services: Vec<String>,
    #[serde(default)]
    pub contact: ContactInfo,
    /// Payment method id: "eur" | "rub" | "crypto"
    pub method: String,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<FieldError>>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: u16) -> Self {
        Self {
            error: error.into(),
            code,
            fields: None,
        }
    }
}

fn payment_error_to_response(err: PaymentError) -> (StatusCode, Json<ErrorResponse>) {
    let code = err.status_code();
    let fields = match &err {
        PaymentError::FieldValidation(errors) => Some(errors.clone()),
        _ => None,
    };
    let response = ErrorResponse {
        error: err.to_string(),
        code,
        fields,
    };
    (
        StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        Json(response),
    )
}

// =============================================================================
// Handlers
// =============================================================================

/// Health check endpoint
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "nomad-checkout",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// List the active service catalog
pub async fn list_services(State(state): State<AppState>) -> impl IntoResponse {
    let services: Vec<_> = state.catalog.active_services().collect();
    Json(serde_json::json!({
        "services": services,
        "count": services.len()
    }))
}

/// Price a selection without dispatching a payment
#[instrument(skip(state, request), fields(services = request.services.len()))]
pub async fn quote(
    State(state): State<AppState>,
    Json(request): Json<QuoteRequest>,
) -> Result<Json<QuoteResponse>, (StatusCode, Json<ErrorResponse>)> {
    validate_service_ids(&state, &request.services)?;

    let selection = Selection::from_ids(request.services);
    let quotation = state.engine.price(&state.catalog, &selection, &request.contact);

    let converted = PaymentMethod::all()
        .into_iter()
        .map(|method| {
            let converted = state
                .dispatcher
                .converter()
                .convert(quotation.total, method.settlement_currency());
            MethodAmount {
                method: method.id(),
                label: method.label(),
                amount: converted.amount,
                display: converted.display(),
            }
        })
        .collect();

    Ok(Json(QuoteResponse {
        quotation,
        converted,
    }))
}

/// Run one checkout attempt: selection -> contact -> payment -> dispatch.
#[instrument(skip(state, request), fields(method = %request.method))]
pub async fn create_checkout(
    State(state): State<AppState>,
    Json(request): Json<CheckoutRequest>,
) -> Result<Json<PaymentOutcome>, (StatusCode, Json<ErrorResponse>)> {
    let method = PaymentMethod::from_id(&request.method).ok_or_else(|| {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new(
                format!("Unknown payment method: {}", request.method),
                400,
            )),
        )
    })?;

    validate_service_ids(&state, &request.services)?;

    // Drive a fresh session through the step machine so every transition
    // guard applies to this request.
    let mut session = CheckoutSession::new();
    session.selection = Selection::from_ids(request.services);
    session.contact = request.contact;

    session.advance().map_err(payment_error_to_response)?; // -> contact
    session.advance().map_err(payment_error_to_response)?; // -> payment

    let outcome = session
        .pay(&state.dispatcher, &state.catalog, &state.engine, method)
        .await
        .map_err(payment_error_to_response)?;

    match &outcome {
        PaymentOutcome::Redirect { provider, .. } => {
            info!(provider, "Checkout dispatched, redirecting customer")
        }
        PaymentOutcome::Failure { kind, message } => {
            error!(?kind, "Checkout failed: {message}")
        }
    }

    Ok(Json(outcome))
}

fn validate_service_ids(
    state: &AppState,
    ids: &[String],
) -> Result<(), (StatusCode, Json<ErrorResponse>)> {
    for id in ids {
        if state.catalog.get(id).is_none() {
            return Err((
                StatusCode::NOT_FOUND,
                Json(ErrorResponse::new(format!("Service not found: {id}"), 404)),
            ));
        }
    }
    Ok(())
}

/// Post-payment confirmation page; reads the Stripe session back to show
/// what was actually charged.
pub async fn payment_success(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Html<String> {
    let Some(session_id) = params.get("session_id") else {
        return error_page("Missing session id");
    };

    match state.stripe.retrieve_session(session_id).await {
        Ok(snapshot) => {
            let amount = snapshot
                .amount_total
                .map(|cents| format!("{:.2} €", cents as f64 / 100.0))
                .unwrap_or_else(|| "—".to_string());

            Html(format!(
                r#"
<!DOCTYPE html>
<html>
<head><title>Payment Successful</title></head>
<body style="font-family: system-ui; display: flex; justify-content: center; align-items: center; height: 100vh; margin: 0; background: linear-gradient(135deg, #1a1a2e 0%, #16213e 100%);">
    <div style="background: white; padding: 60px; border-radius: 16px; text-align: center;">
        <div style="font-size: 60px;">✅</div>
        <h1>Payment Successful!</h1>
        <p>Amount: <strong>{}</strong></p>
        <p>Order: <code>{}</code></p>
        <p style="color: #666;">A confirmation has been sent to {}.</p>
    </div>
</body>
</html>
"#,
                amount,
                snapshot.order_id().unwrap_or("unknown"),
                snapshot.customer_email.as_deref().unwrap_or("your email"),
            ))
        }
        Err(e) => {
            error!("Failed to retrieve session {session_id}: {e}");
            error_page(&e.to_string())
        }
    }
}

/// Payment cancel page
pub async fn payment_cancel() -> Html<&'static str> {
    Html(
        r#"
<!DOCTYPE html>
<html>
<head><title>Payment Cancelled</title></head>
<body style="font-family: system-ui; display: flex; justify-content: center; align-items: center; height: 100vh; margin: 0; background: linear-gradient(135deg, #1a1a2e 0%, #16213e 100%);">
    <div style="background: white; padding: 60px; border-radius: 16px; text-align: center;">
        <div style="font-size: 60px;">⚠️</div>
        <h1>Payment Cancelled</h1>
        <p style="color: #666;">You cancelled the payment. No charges were made.</p>
    </div>
</body>
</html>
"#,
    )
}

fn error_page(message: &str) -> Html<String> {
    Html(format!(
        r#"
<!DOCTYPE html>
<html>
<head><title>Payment Status</title></head>
<body style="font-family: system-ui; display: flex; justify-content: center; align-items: center; height: 100vh; margin: 0; background: linear-gradient(135deg, #1a1a2e 0%, #16213e 100%);">
    <div style="background: white; padding: 60px; border-radius: 16px; text-align: center;">
        <div style="font-size: 60px;">❌</div>
        <h1>Something went wrong</h1>
        <p style="color: #666;">{message}</p>
    </div>
</body>
</html>
"#
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::create_router;
    use async_trait::async_trait;
    use axum_test::TestServer;
    use checkout_core::{
        PaymentDispatcher, PaymentProvider, PaymentRedirect, PaymentRequest, PaymentResult,
        PricingEngine, ServiceCatalog, SettlementCurrency,
    };
    use pay_stripe::{StripeConfig, StripeProvider};
    use std::sync::Arc;

    struct FakeEurProvider;

    #[async_trait]
    impl PaymentProvider for FakeEurProvider {
        async fn initiate(&self, request: &PaymentRequest) -> PaymentResult<PaymentRedirect> {
            Ok(
                PaymentRedirect::new(format!("https://pay.example/{}", request.order_id), "fake")
                    .with_payment_id("pay_1"),
            )
        }

        fn provider_name(&self) -> &'static str {
            "fake"
        }

        fn settlement_currency(&self) -> SettlementCurrency {
            SettlementCurrency::Eur
        }
    }

    fn test_server() -> TestServer {
        let dispatcher = PaymentDispatcher::default().with_provider(Arc::new(FakeEurProvider));
        let state = AppState::with_parts(
            ServiceCatalog::default_bundle(),
            PricingEngine::default(),
            dispatcher,
            Arc::new(StripeProvider::new(StripeConfig::new(
                "sk_test_abc",
                "http://localhost:8080",
            ))),
        );
        TestServer::new(create_router(state)).unwrap()
    }

    fn contact_json() -> serde_json::Value {
        serde_json::json!({
            "name": "Ana Silva",
            "email": "ana@example.com",
            "phone": "+351 912 345 678",
            "promo_code": ""
        })
    }

    #[tokio::test]
    async fn test_health() {
        let server = test_server();
        let response = server.get("/health").await;
        response.assert_status_ok();
        assert_eq!(response.json::<serde_json::Value>()["status"], "healthy");
    }

    #[tokio::test]
    async fn test_list_services() {
        let server = test_server();
        let response = server.get("/api/v1/services").await;
        response.assert_status_ok();
        assert_eq!(response.json::<serde_json::Value>()["count"], 7);
    }

    #[tokio::test]
    async fn test_quote_two_services_gets_first_time_discount() {
        let server = test_server();
        let response = server
            .post("/api/v1/quote")
            .json(&serde_json::json!({
                "services": ["nif", "consulate-appointment"],
                "contact": {}
            }))
            .await;

        response.assert_status_ok();
        let body = response.json::<serde_json::Value>();
        assert_eq!(body["subtotal"], 220);
        assert_eq!(body["discount_fraction"], 0.05);
        assert_eq!(body["total"], 209.0);

        // Converted display amounts for every method
        let converted = body["converted"].as_array().unwrap();
        assert_eq!(converted.len(), 3);
        let rub = converted.iter().find(|m| m["method"] == "rub").unwrap();
        assert_eq!(rub["amount"], 20900.0);
        assert_eq!(rub["display"], "20900 ₽");
    }

    #[tokio::test]
    async fn test_checkout_dispatches_and_redirects() {
        let server = test_server();
        let response = server
            .post("/api/v1/checkout")
            .json(&serde_json::json!({
                "services": ["nif"],
                "contact": contact_json(),
                "method": "eur"
            }))
            .await;

        response.assert_status_ok();
        let body = response.json::<serde_json::Value>();
        assert_eq!(body["outcome"], "redirect");
        assert!(body["url"].as_str().unwrap().starts_with("https://pay.example/order_"));
    }

    #[tokio::test]
    async fn test_checkout_empty_selection_rejected() {
        let server = test_server();
        let response = server
            .post("/api/v1/checkout")
            .json(&serde_json::json!({
                "services": [],
                "contact": contact_json(),
                "method": "eur"
            }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_checkout_invalid_contact_surfaces_field_errors() {
        let server = test_server();
        let response = server
            .post("/api/v1/checkout")
            .json(&serde_json::json!({
                "services": ["nif"],
                "contact": { "name": "A", "email": "bad", "phone": "1" },
                "method": "eur"
            }))
            .await;

        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        let body = response.json::<serde_json::Value>();
        let fields = body["fields"].as_array().unwrap();
        assert_eq!(fields.len(), 3);
    }

    #[tokio::test]
    async fn test_checkout_unknown_method_rejected() {
        let server = test_server();
        let response = server
            .post("/api/v1/checkout")
            .json(&serde_json::json!({
                "services": ["nif"],
                "contact": contact_json(),
                "method": "sbp"
            }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_checkout_unknown_service_rejected() {
        let server = test_server();
        let response = server
            .post("/api/v1/checkout")
            .json(&serde_json::json!({
                "services": ["yacht-charter"],
                "contact": contact_json(),
                "method": "eur"
            }))
            .await;

        response.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_checkout_unregistered_provider_is_normalized_failure() {
        // RUB has no provider registered in the test dispatcher: the
        // request itself succeeds, the outcome reports the failure.
        let server = test_server();
        let response = server
            .post("/api/v1/checkout")
            .json(&serde_json::json!({
                "services": ["nif"],
                "contact": contact_json(),
                "method": "rub"
            }))
            .await;

        response.assert_status_ok();
        let body = response.json::<serde_json::Value>();
        assert_eq!(body["outcome"], "failure");
        assert_eq!(body["kind"], "configuration");
    }

    #[tokio::test]
    async fn test_payment_cancel_page() {
        let server = test_server();
        let response = server.get("/payment/cancel").await;
        response.assert_status_ok();
        assert!(response.text().contains("Payment Cancelled"));
    }
}

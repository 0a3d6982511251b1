//! # Payment Provider Trait & Dispatcher
//!
//! Strategy trait for payment providers plus the dispatcher that picks
//! exactly one of them per attempt.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   PaymentProvider (trait)                   │
//! │  ├── initiate()                                             │
//! │  ├── provider_name()                                        │
//! │  └── settlement_currency()                                  │
//! └─────────────────────────────────────────────────────────────┘
//!                            ▲
//!          ┌─────────────────┼─────────────────┐
//!          │                 │                 │
//!  ┌───────┴───────┐ ┌───────┴───────┐ ┌───────┴───────┐
//!  │StripeProvider │ │  RoboKassa    │ │ NowPayments   │
//!  │     (EUR)     │ │Provider (RUB) │ │Provider (USDT)│
//!  └───────────────┘ └───────────────┘ └───────────────┘
//! ```
//!
//! The dispatcher maps a UI-level method id to a settlement currency, and
//! that currency to one registered provider. One provider call per
//! dispatch; a failure is terminal for the attempt, with no fallback to a
//! different provider and no retry.

use crate::contact::ContactInfo;
use crate::currency::{CurrencyConverter, SettlementCurrency};
use crate::error::{PaymentError, PaymentResult};
use crate::payment::{generate_order_id, PaymentOutcome, PaymentRedirect, PaymentRequest};
use crate::pricing::Quotation;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, info, instrument};

/// Core trait for payment provider implementations.
///
/// Implementations may perform network I/O but never panic: every failure
/// surfaces as a typed [`PaymentError`]. Providers hold only immutable
/// configuration between calls.
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// Turn a payment request into a provider-native payment initiation.
    async fn initiate(&self, request: &PaymentRequest) -> PaymentResult<PaymentRedirect>;

    /// Provider name, for logging and correlation.
    fn provider_name(&self) -> &'static str;

    /// The settlement currency this provider charges in.
    fn settlement_currency(&self) -> SettlementCurrency;
}

/// Type alias for a shared payment provider (dynamic dispatch)
pub type BoxedPaymentProvider = Arc<dyn PaymentProvider>;

/// UI-level payment method chosen by the customer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Card payment in euro
    Eur,
    /// Russian ruble payment
    Rub,
    /// USDT (TRC20) crypto payment
    Crypto,
}

impl PaymentMethod {
    /// All selectable methods, in display order
    pub fn all() -> [PaymentMethod; 3] {
        [PaymentMethod::Eur, PaymentMethod::Rub, PaymentMethod::Crypto]
    }

    /// Wire/UI identifier
    pub fn id(&self) -> &'static str {
        match self {
            PaymentMethod::Eur => "eur",
            PaymentMethod::Rub => "rub",
            PaymentMethod::Crypto => "crypto",
        }
    }

    /// Parse a UI identifier
    pub fn from_id(id: &str) -> Option<Self> {
        match id {
            "eur" => Some(PaymentMethod::Eur),
            "rub" => Some(PaymentMethod::Rub),
            "crypto" => Some(PaymentMethod::Crypto),
            _ => None,
        }
    }

    /// The settlement currency this method resolves to
    pub fn settlement_currency(&self) -> SettlementCurrency {
        match self {
            PaymentMethod::Eur => SettlementCurrency::Eur,
            PaymentMethod::Rub => SettlementCurrency::Rub,
            PaymentMethod::Crypto => SettlementCurrency::Usdt,
        }
    }

    /// Customer-facing label
    pub fn label(&self) -> &'static str {
        match self {
            PaymentMethod::Eur => "Pay in euro",
            PaymentMethod::Rub => "Pay in rubles",
            PaymentMethod::Crypto => "Pay with crypto",
        }
    }
}

/// Selects and invokes exactly one payment provider per request.
///
/// Providers are registered once at startup, keyed by settlement currency;
/// there is no runtime type inspection and no fallback chain.
#[derive(Clone, Default)]
pub struct PaymentDispatcher {
    providers: HashMap<SettlementCurrency, BoxedPaymentProvider>,
    converter: CurrencyConverter,
}

impl PaymentDispatcher {
    pub fn new(converter: CurrencyConverter) -> Self {
        Self {
            providers: HashMap::new(),
            converter,
        }
    }

    /// Register a provider under its settlement currency
    pub fn register(&mut self, provider: BoxedPaymentProvider) {
        self.providers.insert(provider.settlement_currency(), provider);
    }

    /// Builder: register a provider
    pub fn with_provider(mut self, provider: BoxedPaymentProvider) -> Self {
        self.register(provider);
        self
    }

    /// Get the provider for a settlement currency
    pub fn provider_for(&self, currency: SettlementCurrency) -> Option<&BoxedPaymentProvider> {
        self.providers.get(&currency)
    }

    /// Names of all registered providers
    pub fn providers(&self) -> Vec<&'static str> {
        self.providers.values().map(|p| p.provider_name()).collect()
    }

    /// The converter used for settlement amounts
    pub fn converter(&self) -> &CurrencyConverter {
        &self.converter
    }

    /// Build the payment request for a quotation.
    ///
    /// The quotation is expected to be freshly computed from current state;
    /// the order id is minted here so every provider sees the same format.
    pub fn build_request(
        &self,
        quotation: &Quotation,
        contact: &ContactInfo,
        method: PaymentMethod,
    ) -> PaymentRequest {
        let currency = method.settlement_currency();
        let settlement_amount = self.converter.convert(quotation.total, currency).amount;

        PaymentRequest {
            order_id: generate_order_id(),
            description: format!(
                "Digital nomad visa services: {}",
                quotation.service_names().join(", ")
            ),
            contact: contact.clone(),
            amount_eur: quotation.total,
            settlement_currency: currency,
            settlement_amount,
        }
    }

    /// Dispatch one payment attempt and normalize the result.
    #[instrument(skip(self, quotation, contact), fields(method = method.id()))]
    pub async fn dispatch(
        &self,
        quotation: &Quotation,
        contact: &ContactInfo,
        method: PaymentMethod,
    ) -> PaymentOutcome {
        if quotation.is_empty() {
            return PaymentOutcome::from_result(Err(PaymentError::Validation(
                "Cannot dispatch a payment for an empty order".to_string(),
            )));
        }

        let currency = method.settlement_currency();
        let Some(provider) = self.providers.get(&currency) else {
            return PaymentOutcome::from_result(Err(PaymentError::Configuration(format!(
                "No payment provider registered for {}",
                currency
            ))));
        };

        let request = self.build_request(quotation, contact, method);

        info!(
            order_id = %request.order_id,
            provider = provider.provider_name(),
            amount_eur = request.amount_eur,
            "Dispatching payment"
        );

        let result = provider.initiate(&request).await;

        if let Err(ref err) = result {
            error!(
                order_id = %request.order_id,
                provider = provider.provider_name(),
                "Payment initiation failed: {err}"
            );
        }

        PaymentOutcome::from_result(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Selection, ServiceCatalog};
    use crate::currency::ExchangeRates;
    use crate::error::ErrorKind;
    use crate::pricing::PricingEngine;

    struct FakeProvider {
        currency: SettlementCurrency,
        fail: bool,
    }

    #[async_trait]
    impl PaymentProvider for FakeProvider {
        async fn initiate(&self, request: &PaymentRequest) -> PaymentResult<PaymentRedirect> {
            if self.fail {
                return Err(PaymentError::Transport("connection refused".into()));
            }
            Ok(
                PaymentRedirect::new(format!("https://pay.example/{}", request.order_id), "fake")
                    .with_payment_id("pay_1"),
            )
        }

        fn provider_name(&self) -> &'static str {
            "fake"
        }

        fn settlement_currency(&self) -> SettlementCurrency {
            self.currency
        }
    }

    fn quotation() -> Quotation {
        PricingEngine::default().price(
            &ServiceCatalog::default_bundle(),
            &Selection::from_ids(["nif"]),
            &ContactInfo::default(),
        )
    }

    #[test]
    fn test_method_mapping() {
        assert_eq!(PaymentMethod::from_id("eur"), Some(PaymentMethod::Eur));
        assert_eq!(PaymentMethod::from_id("sbp"), None);
        assert_eq!(
            PaymentMethod::Crypto.settlement_currency(),
            SettlementCurrency::Usdt
        );
    }

    #[test]
    fn test_build_request_preconverts_rub() {
        let dispatcher = PaymentDispatcher::new(CurrencyConverter::new(ExchangeRates {
            eur_to_rub: 100.0,
            eur_to_usdt: 1.05,
        }));

        let request =
            dispatcher.build_request(&quotation(), &ContactInfo::default(), PaymentMethod::Rub);

        assert_eq!(request.amount_eur, 120.0);
        assert_eq!(request.settlement_amount, 12000.0);
        assert_eq!(request.settlement_currency, SettlementCurrency::Rub);
        assert!(request.description.contains("NIF"));
        assert!(request.order_id.starts_with("order_"));
    }

    #[tokio::test]
    async fn test_dispatch_success() {
        let dispatcher = PaymentDispatcher::default().with_provider(Arc::new(FakeProvider {
            currency: SettlementCurrency::Eur,
            fail: false,
        }));

        let outcome = dispatcher
            .dispatch(&quotation(), &ContactInfo::default(), PaymentMethod::Eur)
            .await;

        assert!(outcome.is_redirect());
    }

    #[tokio::test]
    async fn test_dispatch_normalizes_provider_error() {
        let dispatcher = PaymentDispatcher::default().with_provider(Arc::new(FakeProvider {
            currency: SettlementCurrency::Eur,
            fail: true,
        }));

        let outcome = dispatcher
            .dispatch(&quotation(), &ContactInfo::default(), PaymentMethod::Eur)
            .await;

        match outcome {
            PaymentOutcome::Failure { kind, message } => {
                assert_eq!(kind, ErrorKind::Transport);
                assert!(message.contains("connection refused"));
            }
            _ => panic!("expected failure"),
        }
    }

    #[tokio::test]
    async fn test_dispatch_rejects_empty_order() {
        let dispatcher = PaymentDispatcher::default();
        let empty = PricingEngine::default().price(
            &ServiceCatalog::default_bundle(),
            &Selection::new(),
            &ContactInfo::default(),
        );

        let outcome = dispatcher
            .dispatch(&empty, &ContactInfo::default(), PaymentMethod::Eur)
            .await;

        match outcome {
            PaymentOutcome::Failure { kind, .. } => assert_eq!(kind, ErrorKind::Validation),
            _ => panic!("expected failure"),
        }
    }

    #[tokio::test]
    async fn test_dispatch_unregistered_currency_is_configuration_error() {
        let dispatcher = PaymentDispatcher::default().with_provider(Arc::new(FakeProvider {
            currency: SettlementCurrency::Eur,
            fail: false,
        }));

        let outcome = dispatcher
            .dispatch(&quotation(), &ContactInfo::default(), PaymentMethod::Rub)
            .await;

        match outcome {
            PaymentOutcome::Failure { kind, .. } => assert_eq!(kind, ErrorKind::Configuration),
            _ => panic!("expected failure"),
        }
    }
}

//! # Application State
//!
//! Shared state for the Axum application: the service catalog, pricing
//! engine, currency converter and the provider dispatcher. Everything is
//! loaded once at startup and immutable for the process lifetime.

use checkout_core::{
    CurrencyConverter, ExchangeRates, PaymentDispatcher, PricingEngine, ServiceCatalog,
};
use pay_nowpayments::NowPaymentsProvider;
use pay_robokassa::RoboKassaProvider;
use pay_stripe::StripeProvider;
use std::sync::Arc;

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Environment (development, staging, production)
    pub environment: String,
}

impl AppConfig {
    /// Load from environment variables
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
        }
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> std::net::SocketAddr {
        format!("{}:{}", self.host, self.port)
            .parse()
            .expect("Invalid socket address")
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Fixed service catalog
    pub catalog: ServiceCatalog,
    /// Discount-rule evaluator
    pub engine: PricingEngine,
    /// Provider dispatcher, keyed by settlement currency
    pub dispatcher: PaymentDispatcher,
    /// Stripe provider handle (session retrieval on the success page)
    pub stripe: Arc<StripeProvider>,
    /// Application config
    pub config: AppConfig,
}

impl AppState {
    /// Build the full state from environment and config files.
    pub fn new() -> anyhow::Result<Self> {
        let config = AppConfig::from_env();
        let catalog = load_service_catalog()?;
        let converter = CurrencyConverter::new(load_exchange_rates());

        let stripe = Arc::new(StripeProvider::from_env());

        let dispatcher = PaymentDispatcher::new(converter)
            .with_provider(stripe.clone())
            .with_provider(Arc::new(RoboKassaProvider::from_env()))
            .with_provider(Arc::new(NowPaymentsProvider::from_env()));

        Ok(Self {
            catalog,
            engine: PricingEngine::default(),
            dispatcher,
            stripe,
            config,
        })
    }

    /// Build a state around explicit parts (tests)
    pub fn with_parts(
        catalog: ServiceCatalog,
        engine: PricingEngine,
        dispatcher: PaymentDispatcher,
        stripe: Arc<StripeProvider>,
    ) -> Self {
        Self {
            catalog,
            engine,
            dispatcher,
            stripe,
            config: AppConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                environment: "test".to_string(),
            },
        }
    }
}

/// Static exchange rates from env, with the documented defaults.
fn load_exchange_rates() -> ExchangeRates {
    let defaults = ExchangeRates::default();

    let read_rate = |var: &str, default: f64| {
        std::env::var(var)
            .ok()
            .and_then(|v| v.parse::<f64>().ok())
            .unwrap_or(default)
    };

    ExchangeRates {
        eur_to_rub: read_rate("EUR_TO_RUB", defaults.eur_to_rub),
        eur_to_usdt: read_rate("EUR_TO_USDT", defaults.eur_to_usdt),
    }
}

/// Load the service catalog from config, falling back to the built-in
/// bundle so the engine stays usable without a config file.
fn load_service_catalog() -> anyhow::Result<ServiceCatalog> {
    let config_paths = [
        "config/services.toml",
        "../config/services.toml",
        "../../config/services.toml",
    ];

    for path in config_paths {
        if let Ok(content) = std::fs::read_to_string(path) {
            let catalog = ServiceCatalog::from_toml(&content)
                .map_err(|e| anyhow::anyhow!("Failed to parse {}: {}", path, e))?;
            tracing::info!("Loaded {} services from {}", catalog.len(), path);
            return Ok(catalog);
        }
    }

    tracing::warn!("No service catalog found, using built-in bundle");
    Ok(ServiceCatalog::default_bundle())
}

//! # Nomad-Checkout
//!
//! Payment engine for the digital-nomad visa service bundle.
//!
//! ## Usage
//!
//! ```bash
//! # Set environment variables
//! export STRIPE_SECRET_KEY=sk_test_...
//! export ROBOKASSA_MERCHANT_LOGIN=...
//! export NOWPAYMENTS_API_KEY=...
//!
//! # Run the server
//! nomad-checkout
//! ```

use checkout_api::{routes, state::AppState};
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    print_banner();

    // Initialize application state
    let state = AppState::new()?;

    let addr = state.config.socket_addr();
    let is_prod = state.config.is_production();

    info!("Environment: {}", state.config.environment);
    info!("Services loaded: {}", state.catalog.len());
    info!("Payment providers: {:?}", state.dispatcher.providers());

    // Create router
    let app = routes::create_router(state);

    // Start server
    info!("🚀 Nomad-Checkout starting on http://{}", addr);

    if !is_prod {
        info!("📝 Catalog: GET http://{}/api/v1/services", addr);
        info!("💶 Quote: POST http://{}/api/v1/quote", addr);
        info!("💳 Checkout: POST http://{}/api/v1/checkout", addr);
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn print_banner() {
    println!(
        r#"
  🌍 Nomad-Checkout 🌍
  ━━━━━━━━━━━━━━━━━━━━━
  Visa-service payment engine
  Version: {}

"#,
        env!("CARGO_PKG_VERSION")
    );
}

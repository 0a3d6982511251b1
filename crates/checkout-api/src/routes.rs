//! # Routes
//!
//! Axum router configuration for the checkout API.

use crate::handlers;
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Create the main application router
///
/// Routes:
/// - GET  /health - Health check
/// - GET  /api/v1/services - List the service catalog
/// - POST /api/v1/quote - Price a selection
/// - POST /api/v1/checkout - Dispatch one payment attempt
/// - GET  /payment/success - Post-payment confirmation page
/// - GET  /payment/cancel - Cancel page
pub fn create_router(state: AppState) -> Router {
    // Permissive CORS; the checkout frontend may be served from another
    // origin during development.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/services", get(handlers::list_services))
        .route("/quote", post(handlers::quote))
        .route("/checkout", post(handlers::create_checkout));

    let payment_routes = Router::new()
        .route("/success", get(handlers::payment_success))
        .route("/cancel", get(handlers::payment_cancel));

    Router::new()
        .route("/health", get(handlers::health))
        .route("/", get(handlers::health))
        .nest("/api/v1", api_routes)
        .nest("/payment", payment_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

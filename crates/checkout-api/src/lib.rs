//! # checkout-api
//!
//! HTTP API layer for nomad-checkout.
//!
//! This crate provides:
//! - Axum-based HTTP server
//! - REST endpoints for the catalog, quoting and checkout dispatch
//! - Post-payment confirmation and cancel pages
//!
//! ## Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/health` | Health check |
//! | GET | `/api/v1/services` | List the service catalog |
//! | POST | `/api/v1/quote` | Price a selection |
//! | POST | `/api/v1/checkout` | Dispatch one payment attempt |
//! | GET | `/payment/success` | Confirmation page |
//! | GET | `/payment/cancel` | Cancel page |

pub mod handlers;
pub mod routes;
pub mod state;

pub use routes::create_router;
pub use state::{AppConfig, AppState};

//! # pay-robokassa
//!
//! RoboKassa payment provider for nomad-checkout (RUB settlement).
//!
//! Unlike the other providers there is no creation API call: the payment
//! is a signed redirect URL built locally from merchant credentials.
//! The crate also provides result-callback signature verification.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use pay_robokassa::RoboKassaProvider;
//! use checkout_core::PaymentProvider;
//!
//! let provider = RoboKassaProvider::from_env();
//! let redirect = provider.initiate(&request).await?;
//! // redirect.url is the signed gateway link
//! ```

pub mod callback;
pub mod config;
pub mod payment;

// Re-exports
pub use callback::{verify_callback, CallbackParams};
pub use config::RoboKassaConfig;
pub use payment::RoboKassaProvider;

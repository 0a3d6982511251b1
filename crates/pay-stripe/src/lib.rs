//! # pay-stripe
//!
//! Stripe payment provider for nomad-checkout.
//!
//! This crate turns a priced order into a Stripe-hosted checkout session
//! (the EUR settlement path) and exposes the session read used by the
//! post-payment confirmation page.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use pay_stripe::StripeProvider;
//! use checkout_core::PaymentProvider;
//!
//! // Create provider from environment
//! let provider = StripeProvider::from_env();
//!
//! // Initiate a payment; redirect the user to the returned URL
//! let redirect = provider.initiate(&request).await?;
//! ```

pub mod checkout;
pub mod config;

// Re-exports
pub use checkout::{SessionSnapshot, StripeProvider};
pub use config::StripeConfig;

//! # pay-nowpayments
//!
//! NOWPayments crypto payment provider for nomad-checkout (USDT TRC20
//! settlement).
//!
//! Payment creation is a two-step flow: a `/status` liveness probe, then a
//! hosted-invoice POST priced in EUR. The crate also ships best-effort
//! diagnostics (currency listing, minimum amounts, estimates, payment
//! status) and IPN signature verification.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use pay_nowpayments::NowPaymentsProvider;
//! use checkout_core::PaymentProvider;
//!
//! let provider = NowPaymentsProvider::from_env();
//! let redirect = provider.initiate(&request).await?;
//! // redirect.url is the hosted invoice page
//! ```

pub mod config;
pub mod diagnostics;
pub mod invoice;
pub mod ipn;

// Re-exports
pub use config::NowPaymentsConfig;
pub use diagnostics::{PaymentStatus, FALLBACK_CURRENCIES};
pub use invoice::NowPaymentsProvider;
pub use ipn::verify_ipn_signature;

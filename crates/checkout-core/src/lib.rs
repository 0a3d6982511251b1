//! # checkout-core
//!
//! Core types and traits for the nomad-checkout payment engine.
//!
//! This crate provides:
//! - `ServiceCatalog` and `Selection` for the fixed service bundle
//! - `PricingEngine` and `Quotation` for discount evaluation
//! - `CurrencyConverter` for advisory settlement-currency amounts
//! - `PaymentProvider` trait and `PaymentDispatcher` for provider dispatch
//! - `CheckoutSession` for the selection/contact/payment step machine
//! - `PaymentError` for typed error handling
//!
//! ## Example
//!
//! ```rust,ignore
//! use checkout_core::{
//!     CheckoutSession, PaymentDispatcher, PaymentMethod, PricingEngine, ServiceCatalog,
//! };
//!
//! let catalog = ServiceCatalog::default_bundle();
//! let engine = PricingEngine::default();
//!
//! let mut session = CheckoutSession::new();
//! session.toggle_service("nif");
//! session.advance()?; // -> contact step
//!
//! session.contact.name = "Ana Silva".into();
//! session.contact.email = "ana@example.com".into();
//! session.contact.phone = "+351 912 345 678".into();
//! session.advance()?; // -> payment step
//!
//! let outcome = session
//!     .pay(&dispatcher, &catalog, &engine, PaymentMethod::Eur)
//!     .await?;
//! // On a redirect outcome the caller navigates to outcome's URL.
//! ```

pub mod catalog;
pub mod contact;
pub mod currency;
pub mod dispatch;
pub mod error;
pub mod payment;
pub mod pricing;
pub mod session;

// Re-exports for convenience
pub use catalog::{Selection, Service, ServiceCatalog, ServiceCategory};
pub use contact::ContactInfo;
pub use currency::{Converted, CurrencyConverter, ExchangeRates, SettlementCurrency};
pub use dispatch::{BoxedPaymentProvider, PaymentDispatcher, PaymentMethod, PaymentProvider};
pub use error::{ErrorKind, FieldError, PaymentError, PaymentResult};
pub use payment::{generate_order_id, PaymentOutcome, PaymentRedirect, PaymentRequest};
pub use pricing::{DiscountKind, DiscountRule, PricingContext, PricingEngine, Quotation};
pub use session::{CheckoutSession, CheckoutStep};

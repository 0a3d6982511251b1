//! # Checkout Session State Machine
//!
//! Governs the `selection -> contact -> payment` flow and gates each
//! forward transition. Completion is implicit: a successful payment resets
//! the session back to the selection step with all state cleared.
//!
//! The session is an explicit value passed through the engine; it owns no
//! provider handles and holds no global state.

use crate::catalog::{Selection, ServiceCatalog};
use crate::contact::ContactInfo;
use crate::dispatch::{PaymentDispatcher, PaymentMethod};
use crate::error::{PaymentError, PaymentResult};
use crate::payment::PaymentOutcome;
use crate::pricing::{PricingEngine, Quotation};
use serde::{Deserialize, Serialize};
use tracing::info;

/// The three visible checkout steps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutStep {
    Selection,
    Contact,
    Payment,
}

impl Default for CheckoutStep {
    fn default() -> Self {
        CheckoutStep::Selection
    }
}

/// One customer's checkout session.
///
/// Selection and contact state are plain fields; the step and the
/// in-flight payment flag only change through the transition methods.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckoutSession {
    step: CheckoutStep,
    pub selection: Selection,
    pub contact: ContactInfo,
    terms_accepted: bool,
    #[serde(skip)]
    processing: bool,
}

impl CheckoutSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current step
    pub fn step(&self) -> CheckoutStep {
        self.step
    }

    /// Whether a payment attempt is currently outstanding
    pub fn is_processing(&self) -> bool {
        self.processing
    }

    pub fn terms_accepted(&self) -> bool {
        self.terms_accepted
    }

    pub fn set_terms_accepted(&mut self, accepted: bool) {
        self.terms_accepted = accepted;
    }

    /// Flip one service's selected state
    pub fn toggle_service(&mut self, id: &str) {
        self.selection.toggle(id);
    }

    /// Recompute the quotation from current state.
    ///
    /// Always called immediately before building a payment request, so a
    /// dispatch can never run against a stale quotation.
    pub fn quote(&self, catalog: &ServiceCatalog, engine: &PricingEngine) -> Quotation {
        engine.price(catalog, &self.selection, &self.contact)
    }

    /// Advance one step forward, enforcing the step's guard.
    ///
    /// On violation the step does not change and the guard's error is
    /// returned for inline display.
    pub fn advance(&mut self) -> PaymentResult<CheckoutStep> {
        match self.step {
            CheckoutStep::Selection => {
                if self.selection.is_empty() {
                    return Err(PaymentError::Validation(
                        "Select at least one service".to_string(),
                    ));
                }
                self.step = CheckoutStep::Contact;
            }
            CheckoutStep::Contact => {
                let errors = self.contact.validate();
                if !errors.is_empty() {
                    return Err(PaymentError::FieldValidation(errors));
                }
                self.step = CheckoutStep::Payment;
            }
            CheckoutStep::Payment => {
                return Err(PaymentError::Validation(
                    "Payment completes through a successful payment result".to_string(),
                ));
            }
        }
        Ok(self.step)
    }

    /// Step backward. Always permitted; clears nothing.
    pub fn back(&mut self) -> CheckoutStep {
        self.step = match self.step {
            CheckoutStep::Selection | CheckoutStep::Contact => CheckoutStep::Selection,
            CheckoutStep::Payment => CheckoutStep::Contact,
        };
        self.step
    }

    /// Mark a payment attempt as in flight.
    ///
    /// Rejects re-entrant dispatch: while one attempt is outstanding a
    /// second one is refused until the first resolves.
    pub fn begin_payment(&mut self) -> PaymentResult<()> {
        if self.step != CheckoutStep::Payment {
            return Err(PaymentError::Validation(
                "Not on the payment step".to_string(),
            ));
        }
        if self.processing {
            return Err(PaymentError::Validation(
                "A payment attempt is already in progress".to_string(),
            ));
        }
        self.processing = true;
        Ok(())
    }

    /// Record the outcome of the in-flight attempt.
    ///
    /// A redirect completes the checkout and resets the session; a failure
    /// leaves the machine on the payment step for an explicit retry.
    pub fn finish_payment(&mut self, outcome: &PaymentOutcome) {
        self.processing = false;
        if outcome.is_redirect() {
            self.complete();
        }
    }

    /// Run one full payment attempt through the dispatcher.
    ///
    /// Recomputes the quotation from current state, dispatches to exactly
    /// one provider, and applies the outcome to the session.
    pub async fn pay(
        &mut self,
        dispatcher: &PaymentDispatcher,
        catalog: &ServiceCatalog,
        engine: &PricingEngine,
        method: PaymentMethod,
    ) -> PaymentResult<PaymentOutcome> {
        self.begin_payment()?;
        let quotation = self.quote(catalog, engine);
        let outcome = dispatcher.dispatch(&quotation, &self.contact, method).await;
        self.finish_payment(&outcome);
        Ok(outcome)
    }

    /// Reset to a fresh selection step; selection, contact and terms are
    /// cleared together.
    fn complete(&mut self) {
        info!("Checkout completed, resetting session");
        self.selection.clear();
        self.contact.clear();
        self.terms_accepted = false;
        self.step = CheckoutStep::Selection;
    }
}

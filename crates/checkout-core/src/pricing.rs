//! # Pricing Engine
//!
//! Discount-rule evaluation over a selection and contact record, producing
//! an immutable [`Quotation`].
//!
//! Rules are plain data matched by an enum-dispatched evaluator; there are
//! no embedded predicates, so the rule set stays describable in
//! configuration and testable in isolation. Discounts never stack: the
//! highest matching value wins, while every matching rule's description is
//! still surfaced to the customer.

use crate::catalog::{Selection, Service, ServiceCatalog};
use crate::contact::ContactInfo;
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Rule kind with its matching parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum DiscountKind {
    /// Every catalog service is selected
    Bulk,
    /// Contact entered the matching promo code (case-insensitive)
    Promo { code: String },
    /// At least `min_services` services selected
    FirstTime { min_services: usize },
    /// Order date falls inside the window (inclusive)
    Seasonal { from: NaiveDate, until: NaiveDate },
}

/// A configured discount rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscountRule {
    #[serde(flatten)]
    pub kind: DiscountKind,
    /// Discount fraction in (0, 1]
    pub value: f64,
    /// Customer-facing reason, surfaced on the order summary
    pub description: String,
}

impl DiscountRule {
    pub fn new(kind: DiscountKind, value: f64, description: impl Into<String>) -> Self {
        Self {
            kind,
            value,
            description: description.into(),
        }
    }

    /// Evaluate this rule against the full pricing context.
    ///
    /// Predicates see the whole catalog plus selection state, not just the
    /// selected subset: the bulk rule must know whether *every* service is
    /// selected.
    pub fn matches(&self, ctx: &PricingContext<'_>) -> bool {
        match &self.kind {
            DiscountKind::Bulk => {
                !ctx.catalog.is_empty()
                    && ctx
                        .catalog
                        .services
                        .iter()
                        .all(|s| ctx.selection.contains(&s.id))
            }
            DiscountKind::Promo { code } => {
                let entered = ctx.contact.promo_code.trim();
                !entered.is_empty() && entered.eq_ignore_ascii_case(code)
            }
            DiscountKind::FirstTime { min_services } => ctx.selection.len() >= *min_services,
            DiscountKind::Seasonal { from, until } => {
                ctx.today >= *from && ctx.today <= *until
            }
        }
    }
}

/// Everything a rule may look at when matching
#[derive(Debug, Clone, Copy)]
pub struct PricingContext<'a> {
    pub catalog: &'a ServiceCatalog,
    pub selection: &'a Selection,
    pub contact: &'a ContactInfo,
    pub today: NaiveDate,
}

impl<'a> PricingContext<'a> {
    pub fn new(
        catalog: &'a ServiceCatalog,
        selection: &'a Selection,
        contact: &'a ContactInfo,
    ) -> Self {
        Self {
            catalog,
            selection,
            contact,
            today: Utc::now().date_naive(),
        }
    }

    /// Pin the evaluation date (seasonal rules)
    pub fn at(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }
}

/// Immutable priced snapshot of a selection after discount evaluation.
///
/// Recomputed from scratch on every selection or contact change and
/// discarded once a payment request is built from it; it is never patched
/// incrementally.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quotation {
    /// Selected services, in catalog order
    pub services: Vec<Service>,
    /// Sum of selected service prices, whole EUR
    pub subtotal: i64,
    /// Effective discount fraction in [0, 1)
    pub discount_fraction: f64,
    /// `subtotal * discount_fraction`, unrounded
    pub discount_amount: f64,
    /// `subtotal - discount_amount`
    pub total: f64,
    /// Descriptions of every matching rule, in rule order
    pub applied_discounts: Vec<String>,
}

impl Quotation {
    /// Check if nothing was selected
    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    /// Names of the selected services, in catalog order
    pub fn service_names(&self) -> Vec<&str> {
        self.services.iter().map(|s| s.name.as_str()).collect()
    }
}

/// The discount-rule evaluator
#[derive(Debug, Clone)]
pub struct PricingEngine {
    rules: Vec<DiscountRule>,
}

impl PricingEngine {
    /// Create an engine with an explicit rule set
    pub fn new(rules: Vec<DiscountRule>) -> Self {
        Self { rules }
    }

    /// The standard rule set: 15% for the full bundle, 10% promo code,
    /// 5% when at least two services are selected.
    pub fn default_rules() -> Vec<DiscountRule> {
        vec![
            DiscountRule::new(
                DiscountKind::Bulk,
                0.15,
                "15% off when ordering every service",
            ),
            DiscountRule::new(
                DiscountKind::Promo {
                    code: "DIGITAL2024".to_string(),
                },
                0.10,
                "10% promo code discount",
            ),
            DiscountRule::new(
                DiscountKind::FirstTime { min_services: 2 },
                0.05,
                "5% new-client discount",
            ),
        ]
    }

    /// Configured rules
    pub fn rules(&self) -> &[DiscountRule] {
        &self.rules
    }

    /// Price a selection against the catalog and contact record.
    ///
    /// Total function: an empty selection yields an all-zero quotation.
    /// Rejecting empty orders is the state machine's job, not the engine's.
    pub fn price(
        &self,
        catalog: &ServiceCatalog,
        selection: &Selection,
        contact: &ContactInfo,
    ) -> Quotation {
        self.price_in_context(PricingContext::new(catalog, selection, contact))
    }

    /// Price with an explicit context (pinned date in tests)
    pub fn price_in_context(&self, ctx: PricingContext<'_>) -> Quotation {
        let services: Vec<Service> = ctx
            .catalog
            .services
            .iter()
            .filter(|s| ctx.selection.contains(&s.id))
            .cloned()
            .collect();

        let subtotal: i64 = services.iter().map(|s| s.price_eur).sum();

        let mut discount_fraction: f64 = 0.0;
        let mut applied_discounts = Vec::new();

        for rule in &self.rules {
            if rule.matches(&ctx) {
                discount_fraction = discount_fraction.max(rule.value);
                applied_discounts.push(rule.description.clone());
            }
        }

        let discount_amount = subtotal as f64 * discount_fraction;
        let total = subtotal as f64 - discount_amount;

        Quotation {
            services,
            subtotal,
            discount_fraction,
            discount_amount,
            total,
            applied_discounts,
        }
    }
}

impl Default for PricingEngine {
    fn default() -> Self {
        Self::new(Self::default_rules())
    }
}

//! # Service Catalog
//!
//! Catalog types for nomad-checkout.
//! Services are loaded from `config/services.toml`; a built-in default
//! catalog covers the standard visa-service bundle when no file is present.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Service tier shown on the selection screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceCategory {
    Essential,
    Additional,
    Premium,
}

impl Default for ServiceCategory {
    fn default() -> Self {
        ServiceCategory::Essential
    }
}

impl std::fmt::Display for ServiceCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ServiceCategory::Essential => "essential",
            ServiceCategory::Additional => "additional",
            ServiceCategory::Premium => "premium",
        };
        write!(f, "{}", s)
    }
}

/// A consulting service in the catalog.
///
/// Prices are whole EUR; there is no sub-unit pricing in the catalog.
/// Selection state is tracked separately in [`Selection`], never on the
/// catalog entry itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Service {
    /// Unique service identifier
    pub id: String,

    /// Display name
    pub name: String,

    /// Long-form description
    pub description: String,

    /// Price in whole EUR
    pub price_eur: i64,

    /// Service tier
    #[serde(default)]
    pub category: ServiceCategory,

    /// Whether this service can currently be ordered
    #[serde(default = "default_true")]
    pub active: bool,
}

fn default_true() -> bool {
    true
}

impl Service {
    /// Create a new service entry
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        price_eur: i64,
        category: ServiceCategory,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            price_eur,
            category,
            active: true,
        }
    }

    /// Builder: set description
    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = desc.into();
        self
    }
}

/// The fixed service catalog (loaded from config)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceCatalog {
    pub services: Vec<Service>,
}

impl ServiceCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self {
            services: Vec::new(),
        }
    }

    /// Add a service to the catalog
    pub fn add(&mut self, service: Service) {
        self.services.push(service);
    }

    /// Builder: add a service
    pub fn with_service(mut self, service: Service) -> Self {
        self.add(service);
        self
    }

    /// Find a service by ID
    pub fn get(&self, id: &str) -> Option<&Service> {
        self.services.iter().find(|s| s.id == id)
    }

    /// All active services, in catalog order
    pub fn active_services(&self) -> impl Iterator<Item = &Service> {
        self.services.iter().filter(|s| s.active)
    }

    /// Number of catalog entries
    pub fn len(&self) -> usize {
        self.services.len()
    }

    /// Check if the catalog is empty
    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    /// Load catalog from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }

    /// The standard digital-nomad visa service bundle.
    ///
    /// Used when no `services.toml` is found so the engine stays usable
    /// out of the box.
    pub fn default_bundle() -> Self {
        Self::new()
            .with_service(
                Service::new(
                    "immigration-consult",
                    "Individual immigration consultation",
                    150,
                    ServiceCategory::Essential,
                )
                .with_description(
                    "One-on-one session with an immigration expert covering relocation \
                     strategy, housing, schooling and any case-specific questions.",
                ),
            )
            .with_service(
                Service::new("nif", "NIF (tax number)", 120, ServiceCategory::Essential)
                    .with_description(
                        "Obtaining the Portuguese tax number, required for residents and \
                         non-residents operating in Portugal. Turnaround 7 business days.",
                    ),
            )
            .with_service(
                Service::new(
                    "consulate-appointment",
                    "Consulate appointment booking",
                    100,
                    ServiceCategory::Essential,
                )
                .with_description(
                    "Securing a submission slot at the consulate of your citizenship or \
                     residence, including the preliminary application form and 24/7 slot \
                     monitoring.",
                ),
            )
            .with_service(
                Service::new(
                    "document-checkup",
                    "Document check-up",
                    250,
                    ServiceCategory::Essential,
                )
                .with_description(
                    "Review of the full submission package for completeness and \
                     compliance, with per-document remarks and a final checklist.",
                ),
            )
            .with_service(
                Service::new(
                    "sole-trader",
                    "Sole trader registration in Portugal",
                    160,
                    ServiceCategory::Additional,
                )
                .with_description(
                    "Registration with the tax authority as self-employed, including the \
                     choice of tax regime.",
                ),
            )
            .with_service(
                Service::new(
                    "bank-dossier",
                    "Bank submission dossier",
                    450,
                    ServiceCategory::Premium,
                )
                .with_description(
                    "Case preparation ahead of a bank application: expert consultation, \
                     document templates, translations and compliance guidance.",
                ),
            )
            .with_service(
                Service::new(
                    "bank-account-consult",
                    "Bank account opening consultation",
                    150,
                    ServiceCategory::Premium,
                )
                .with_description(
                    "Which documents to prepare and which branches to approach when \
                     opening a Portuguese bank account.",
                ),
            )
    }
}

/// Per-session selection state: the set of chosen service ids.
///
/// Kept apart from the catalog so quotations can be recomputed from scratch
/// against an immutable catalog on every change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Selection {
    ids: HashSet<String>,
}

impl Selection {
    /// Create an empty selection
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a selection from service ids
    pub fn from_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ids: ids.into_iter().map(Into::into).collect(),
        }
    }

    /// Flip the selected state of one service
    pub fn toggle(&mut self, id: &str) {
        if !self.ids.remove(id) {
            self.ids.insert(id.to_string());
        }
    }

    /// Mark a service selected
    pub fn select(&mut self, id: impl Into<String>) {
        self.ids.insert(id.into());
    }

    /// Check whether a service is selected
    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    /// Number of selected services
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Check if nothing is selected
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Drop all selections
    pub fn clear(&mut self) {
        self.ids.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_bundle() {
        let catalog = ServiceCatalog::default_bundle();
        assert_eq!(catalog.len(), 7);
        assert_eq!(catalog.get("nif").unwrap().price_eur, 120);
        assert_eq!(
            catalog.get("bank-dossier").unwrap().category,
            ServiceCategory::Premium
        );
        assert!(catalog.active_services().count() == 7);
    }

    #[test]
    fn test_selection_toggle() {
        let mut selection = Selection::new();
        assert!(selection.is_empty());

        selection.toggle("nif");
        assert!(selection.contains("nif"));
        assert_eq!(selection.len(), 1);

        selection.toggle("nif");
        assert!(!selection.contains("nif"));
        assert!(selection.is_empty());
    }

    #[test]
    fn test_catalog_from_toml() {
        let toml_str = r#"
            [[services]]
            id = "nif"
            name = "NIF (tax number)"
            description = "Tax number"
            price_eur = 120
            category = "essential"

            [[services]]
            id = "bank-dossier"
            name = "Bank submission dossier"
            description = "Case preparation"
            price_eur = 450
            category = "premium"
            active = false
        "#;

        let catalog = ServiceCatalog::from_toml(toml_str).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.active_services().count(), 1);
        assert_eq!(catalog.get("bank-dossier").unwrap().price_eur, 450);
    }
}

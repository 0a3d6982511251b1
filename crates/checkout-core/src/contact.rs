//! # Contact Capture
//!
//! Contact record collected on the second checkout step, with the field
//! validation that gates the transition into payment.

use crate::error::FieldError;
use serde::{Deserialize, Serialize};

/// Contact information entered by the customer.
///
/// All fields are raw strings; [`ContactInfo::validate`] decides whether the
/// record is complete enough to advance to payment. The promo code is
/// optional and only interpreted by the pricing engine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub promo_code: String,
}

impl ContactInfo {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        phone: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            phone: phone.into(),
            promo_code: String::new(),
        }
    }

    /// Builder: set promo code
    pub fn with_promo_code(mut self, code: impl Into<String>) -> Self {
        self.promo_code = code.into();
        self
    }

    /// Validate all required fields, collecting every violation.
    ///
    /// Rules: name non-empty and at least 2 characters, well-formed email,
    /// phone made of digits and loose punctuation with at least 10
    /// characters.
    pub fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();

        let name = self.name.trim();
        if name.is_empty() {
            errors.push(FieldError::new("name", "Name is required"));
        } else if name.chars().count() < 2 {
            errors.push(FieldError::new("name", "Name must be at least 2 characters"));
        }

        if self.email.trim().is_empty() {
            errors.push(FieldError::new("email", "Email is required"));
        } else if !is_well_formed_email(&self.email) {
            errors.push(FieldError::new("email", "Enter a valid email address"));
        }

        if self.phone.trim().is_empty() {
            errors.push(FieldError::new("phone", "Phone is required"));
        } else if !is_plausible_phone(&self.phone) {
            errors.push(FieldError::new("phone", "Enter a valid phone number"));
        }

        errors
    }

    /// Convenience check used by the state machine guard
    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }

    /// Clear all fields (on checkout completion)
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Loose well-formedness check: exactly one `@`, a dotted domain, no
/// whitespace anywhere.
fn is_well_formed_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}

/// Loose phone pattern: optional leading `+`, then at least 10 characters
/// drawn from digits, spaces, dashes and parentheses.
fn is_plausible_phone(phone: &str) -> bool {
    let rest = phone.strip_prefix('+').unwrap_or(phone);
    rest.chars().count() >= 10
        && rest
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '-' | '(' | ')'))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_contact() -> ContactInfo {
        ContactInfo::new("Ana Silva", "ana@example.com", "+351 912 345 678")
    }

    #[test]
    fn test_valid_contact_passes() {
        assert!(valid_contact().is_valid());
    }

    #[test]
    fn test_name_too_short() {
        let mut contact = valid_contact();
        contact.name = "A".to_string();
        let errors = contact.validate();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "name");
    }

    #[test]
    fn test_malformed_emails() {
        for bad in ["no-at-sign", "a@b", "a@@b.com", "a b@c.com", "@c.com", "a@.com"] {
            let mut contact = valid_contact();
            contact.email = bad.to_string();
            assert!(
                contact.validate().iter().any(|e| e.field == "email"),
                "expected rejection of {bad:?}"
            );
        }
    }

    #[test]
    fn test_phone_patterns() {
        let mut contact = valid_contact();

        contact.phone = "+7 (999) 123-45-67".to_string();
        assert!(contact.is_valid());

        contact.phone = "12345".to_string();
        assert!(contact.validate().iter().any(|e| e.field == "phone"));

        contact.phone = "abc4567890123".to_string();
        assert!(contact.validate().iter().any(|e| e.field == "phone"));
    }

    #[test]
    fn test_all_fields_missing_collects_every_error() {
        let contact = ContactInfo::default();
        let errors = contact.validate();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn test_clear() {
        let mut contact = valid_contact().with_promo_code("DIGITAL2024");
        contact.clear();
        assert_eq!(contact, ContactInfo::default());
    }
}

//! # Payment Error Types
//!
//! Typed error handling for the nomad-checkout payment engine.
//! All fallible operations return `Result<T, PaymentError>`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single invalid contact-form field, surfaced inline to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Field name ("name", "email", "phone")
    pub field: String,
    /// Human-readable message
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Core error type for all checkout and payment operations
#[derive(Debug, Error)]
pub enum PaymentError {
    /// Selection/contact input rejected before reaching any provider
    #[error("Validation error: {0}")]
    Validation(String),

    /// Per-field contact form violations
    #[error("Invalid contact fields: {}", format_fields(.0))]
    FieldValidation(Vec<FieldError>),

    /// Missing merchant identity or API key; fatal for one attempt only
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Network/HTTP failure communicating with a provider
    #[error("Transport error: {0}")]
    Transport(String),

    /// Provider liveness probe failed; creation never attempted
    #[error("Provider unavailable: {provider}")]
    ProviderUnavailable { provider: String },

    /// Provider accepted the request but returned an error surface
    #[error("Provider error [{provider}]: {message}")]
    Provider { provider: String, message: String },

    /// Response body could not be decoded
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Internal invariant violation (should not happen)
    #[error("Internal error: {0}")]
    Internal(String),
}

fn format_fields(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| e.field.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Coarse error class carried on a normalized payment failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    Configuration,
    Transport,
    ProviderUnavailable,
    Provider,
    Internal,
}

impl PaymentError {
    /// Classify this error for a normalized `PaymentOutcome::Failure`
    pub fn kind(&self) -> ErrorKind {
        match self {
            PaymentError::Validation(_) | PaymentError::FieldValidation(_) => ErrorKind::Validation,
            PaymentError::Configuration(_) => ErrorKind::Configuration,
            PaymentError::Transport(_) => ErrorKind::Transport,
            PaymentError::ProviderUnavailable { .. } => ErrorKind::ProviderUnavailable,
            PaymentError::Provider { .. } => ErrorKind::Provider,
            PaymentError::Serialization(_) | PaymentError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Returns the HTTP status code appropriate for this error
    pub fn status_code(&self) -> u16 {
        match self {
            PaymentError::Validation(_) => 400,
            PaymentError::FieldValidation(_) => 422,
            PaymentError::Configuration(_) => 500,
            PaymentError::Transport(_) => 503,
            PaymentError::ProviderUnavailable { .. } => 503,
            PaymentError::Provider { .. } => 502,
            PaymentError::Serialization(_) => 500,
            PaymentError::Internal(_) => 500,
        }
    }
}

/// Result type alias for payment operations
pub type PaymentResult<T> = Result<T, PaymentError>;

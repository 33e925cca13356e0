//! Domain validation errors.

use thiserror::Error;

/// Errors raised when domain invariants would be violated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// An identifier is not a 24-character hexadecimal string.
    #[error("Invalid {kind} ID")]
    InvalidIdentifier {
        /// Which entity the identifier belongs to.
        kind: &'static str,
        /// The rejected input.
        value: String,
    },

    /// A required field is missing or empty.
    #[error("Missing required fields: {0}")]
    MissingField(&'static str),

    /// A field has a value outside of its domain.
    #[error("Invalid value for {field}: {message}")]
    InvalidField {
        /// Name of the offending field.
        field: &'static str,
        /// Why the value was rejected.
        message: String,
    },

    /// An order was submitted without line items.
    #[error("Cart is empty")]
    EmptyOrder,

    /// An order status outside of `pending | completed | cancelled`.
    #[error("Invalid order status: '{0}'. Expected 'pending', 'completed' or 'cancelled'")]
    InvalidStatus(String),
}

impl DomainError {
    /// Shorthand for [`DomainError::InvalidField`].
    #[must_use]
    pub fn invalid_field(field: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidField {
            field,
            message: message.into(),
        }
    }

    /// Returns true for identifier format failures.
    #[must_use]
    pub const fn is_invalid_identifier(&self) -> bool {
        matches!(self, Self::InvalidIdentifier { .. })
    }
}

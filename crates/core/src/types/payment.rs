//! Payment method tag.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`PaymentMethod`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PaymentMethodError {
    /// No method was selected.
    #[error("payment method cannot be empty")]
    Empty,
    /// The tag is too long.
    #[error("payment method must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The tag contains characters outside `[a-z0-9_-]`.
    #[error("payment method contains invalid characters")]
    InvalidCharacters,
}

/// The payment method a customer picked at checkout (`card`, `pix`,
/// `boleto`, ...).
///
/// Only recorded on the payment intent; no gateway interprets it here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PaymentMethod(String);

impl PaymentMethod {
    /// Maximum length of a method tag.
    pub const MAX_LENGTH: usize = 32;

    /// Parse a method tag. Input is trimmed and lowercased.
    ///
    /// # Errors
    ///
    /// Returns an error if the tag is empty, too long, or contains characters
    /// other than ASCII letters, digits, `_` and `-`.
    pub fn parse(s: &str) -> Result<Self, PaymentMethodError> {
        let tag = s.trim().to_ascii_lowercase();
        if tag.is_empty() {
            return Err(PaymentMethodError::Empty);
        }
        if tag.len() > Self::MAX_LENGTH {
            return Err(PaymentMethodError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }
        if !tag
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(PaymentMethodError::InvalidCharacters);
        }
        Ok(Self(tag))
    }

    /// The tag as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for PaymentMethod {
    type Error = PaymentMethodError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<PaymentMethod> for String {
    fn from(method: PaymentMethod) -> Self {
        method.0
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_normalizes() {
        assert_eq!(PaymentMethod::parse(" PIX ").unwrap().as_str(), "pix");
        assert_eq!(
            PaymentMethod::parse("credit_card").unwrap().as_str(),
            "credit_card"
        );
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert_eq!(PaymentMethod::parse("  "), Err(PaymentMethodError::Empty));
        assert_eq!(
            PaymentMethod::parse("card; drop"),
            Err(PaymentMethodError::InvalidCharacters)
        );
        assert!(matches!(
            PaymentMethod::parse(&"x".repeat(33)),
            Err(PaymentMethodError::TooLong { .. })
        ));
    }
}

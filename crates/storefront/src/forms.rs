//! Untyped form input and its conversion into typed requests.
//!
//! The transport layer deserializes request bodies into these structs, every
//! field an optional string, and calls `parse` before touching the
//! [`Storefront`](crate::Storefront). Business rules (positive quantities,
//! password strength, stock) stay in the services; this module only checks
//! presence and shape.

use serde::Deserialize;
use thiserror::Error;

use corner_shop_core::{CartLineId, GuestToken, PaymentMethod, PaymentMethodError, ProductId};

/// Errors produced while parsing form input.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormError {
    /// A required field was absent or blank.
    #[error("{0} is required")]
    Missing(&'static str),

    /// A field that must be an integer wasn't.
    #[error("{field} must be a whole number (got {value:?})")]
    NotAnInteger { field: &'static str, value: String },

    /// Payment method tag rejected.
    #[error("payment method: {0}")]
    PaymentMethod(#[from] PaymentMethodError),

    /// Guest token is not a UUID.
    #[error("invalid guest token")]
    GuestToken,
}

fn required(field: &'static str, value: Option<&str>) -> Result<String, FormError> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
        .ok_or(FormError::Missing(field))
}

fn integer(field: &'static str, value: Option<&str>) -> Result<i64, FormError> {
    let raw = required(field, value)?;
    raw.parse::<i64>().map_err(|_| FormError::NotAnInteger {
        field,
        value: raw,
    })
}

/// Parse the guest token carried by an anonymous visitor, if any.
///
/// A blank value means "no guest cart".
///
/// # Errors
///
/// Returns `FormError::GuestToken` if the value is present but not a UUID.
pub fn parse_guest_token(value: Option<&str>) -> Result<Option<GuestToken>, FormError> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(raw) => GuestToken::parse(raw)
            .map(Some)
            .map_err(|_| FormError::GuestToken),
    }
}

/// Registration form.
#[derive(Debug, Default, Deserialize)]
pub struct RegisterForm {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub phone: Option<String>,
}

/// Registration fields after presence checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone: String,
}

impl RegisterForm {
    /// Check that name, email and password are present. Phone is optional.
    ///
    /// # Errors
    ///
    /// Returns `FormError::Missing` naming the first absent field.
    pub fn parse(&self) -> Result<Registration, FormError> {
        Ok(Registration {
            name: required("name", self.name.as_deref())?,
            email: required("email", self.email.as_deref())?,
            // Passwords are not trimmed.
            password: self
                .password
                .clone()
                .filter(|p| !p.is_empty())
                .ok_or(FormError::Missing("password"))?,
            phone: self.phone.as_deref().map(str::trim).unwrap_or_default().to_owned(),
        })
    }
}

/// Login form.
#[derive(Debug, Default, Deserialize)]
pub struct LoginForm {
    pub email: Option<String>,
    pub password: Option<String>,
}

impl LoginForm {
    /// Returns `(email, password)`.
    ///
    /// # Errors
    ///
    /// Returns `FormError::Missing` if either field is absent.
    pub fn parse(&self) -> Result<(String, String), FormError> {
        let email = required("email", self.email.as_deref())?;
        let password = self
            .password
            .clone()
            .filter(|p| !p.is_empty())
            .ok_or(FormError::Missing("password"))?;
        Ok((email, password))
    }
}

/// Add-to-cart form.
#[derive(Debug, Default, Deserialize)]
pub struct AddToCartForm {
    pub product_id: Option<String>,
    /// Defaults to 1 when absent.
    pub quantity: Option<String>,
}

impl AddToCartForm {
    /// Returns `(product_id, quantity)`. Quantity sign is not checked here.
    ///
    /// # Errors
    ///
    /// Returns `FormError` if the product id is missing or either field is
    /// not an integer.
    pub fn parse(&self) -> Result<(ProductId, i64), FormError> {
        let product_id = ProductId::new(integer("product_id", self.product_id.as_deref())?);
        let quantity = match self.quantity.as_deref().map(str::trim) {
            None | Some("") => 1,
            Some(raw) => integer("quantity", Some(raw))?,
        };
        Ok((product_id, quantity))
    }
}

/// Cart line quantity update form.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateCartForm {
    pub line_id: Option<String>,
    pub quantity: Option<String>,
}

impl UpdateCartForm {
    /// Returns `(line_id, quantity)`.
    ///
    /// # Errors
    ///
    /// Returns `FormError` if a field is missing or not an integer.
    pub fn parse(&self) -> Result<(CartLineId, i64), FormError> {
        let line_id = CartLineId::new(integer("line_id", self.line_id.as_deref())?);
        let quantity = integer("quantity", self.quantity.as_deref())?;
        Ok((line_id, quantity))
    }
}

/// Cart line removal form.
#[derive(Debug, Default, Deserialize)]
pub struct RemoveFromCartForm {
    pub line_id: Option<String>,
}

impl RemoveFromCartForm {
    /// # Errors
    ///
    /// Returns `FormError` if the line id is missing or not an integer.
    pub fn parse(&self) -> Result<CartLineId, FormError> {
        integer("line_id", self.line_id.as_deref()).map(CartLineId::new)
    }
}

/// Checkout form.
#[derive(Debug, Default, Deserialize)]
pub struct CheckoutForm {
    pub payment_method: Option<String>,
}

impl CheckoutForm {
    /// # Errors
    ///
    /// Returns `FormError::Missing` if no method was chosen, or
    /// `FormError::PaymentMethod` if the tag is malformed.
    pub fn parse(&self) -> Result<PaymentMethod, FormError> {
        let raw = required("payment_method", self.payment_method.as_deref())?;
        Ok(PaymentMethod::parse(&raw)?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_register_requires_name_email_password() {
        let form = RegisterForm {
            name: Some("  ".to_owned()),
            email: Some("ana@example.com".to_owned()),
            password: Some("hunter22".to_owned()),
            phone: None,
        };
        assert_eq!(form.parse().unwrap_err(), FormError::Missing("name"));

        let form = RegisterForm {
            name: Some("Ana".to_owned()),
            email: Some("ana@example.com".to_owned()),
            password: None,
            phone: None,
        };
        assert_eq!(form.parse().unwrap_err(), FormError::Missing("password"));
    }

    #[test]
    fn test_register_phone_is_optional() {
        let form = RegisterForm {
            name: Some(" Ana ".to_owned()),
            email: Some("ana@example.com".to_owned()),
            password: Some(" spaced password ".to_owned()),
            phone: None,
        };
        let parsed = form.parse().unwrap();
        assert_eq!(parsed.name, "Ana");
        assert_eq!(parsed.phone, "");
        assert_eq!(parsed.password, " spaced password ");
    }

    #[test]
    fn test_add_to_cart_defaults_quantity() {
        let form = AddToCartForm {
            product_id: Some("12".to_owned()),
            quantity: None,
        };
        assert_eq!(form.parse().unwrap(), (ProductId::new(12), 1));
    }

    #[test]
    fn test_add_to_cart_keeps_non_positive_quantity() {
        let form = AddToCartForm {
            product_id: Some("3".to_owned()),
            quantity: Some("-2".to_owned()),
        };
        assert_eq!(form.parse().unwrap(), (ProductId::new(3), -2));
    }

    #[test]
    fn test_non_integer_is_rejected() {
        let form = UpdateCartForm {
            line_id: Some("abc".to_owned()),
            quantity: Some("1".to_owned()),
        };
        assert!(matches!(
            form.parse().unwrap_err(),
            FormError::NotAnInteger { field: "line_id", .. }
        ));
    }

    #[test]
    fn test_checkout_requires_method() {
        let form = CheckoutForm::default();
        assert_eq!(form.parse().unwrap_err(), FormError::Missing("payment_method"));

        let form = CheckoutForm {
            payment_method: Some(" PIX ".to_owned()),
        };
        assert_eq!(form.parse().unwrap().as_str(), "pix");
    }

    #[test]
    fn test_guest_token_parsing() {
        assert_eq!(parse_guest_token(None).unwrap(), None);
        assert_eq!(parse_guest_token(Some(" ")).unwrap(), None);
        assert_eq!(
            parse_guest_token(Some("not-a-uuid")).unwrap_err(),
            FormError::GuestToken
        );

        let token = GuestToken::generate();
        assert_eq!(
            parse_guest_token(Some(&token.to_string())).unwrap(),
            Some(token)
        );
    }
}

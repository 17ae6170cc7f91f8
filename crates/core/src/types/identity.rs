//! Who a cart belongs to.
//!
//! Every cart and checkout call takes an explicit [`Identity`]; nothing in
//! the storefront reads the caller from ambient session state.

use core::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::id::CustomerId;

/// Opaque token naming one anonymous visitor's cart.
///
/// The transport layer mints one per browser session (usually stored in a
/// cookie) and passes it back on every request until login.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GuestToken(Uuid);

impl GuestToken {
    /// Mint a fresh random token.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Parse a token received from the client.
    ///
    /// # Errors
    ///
    /// Returns `uuid::Error` if `s` is not a UUID.
    pub fn parse(s: &str) -> Result<Self, uuid::Error> {
        Uuid::parse_str(s.trim()).map(Self)
    }

    /// The token in its canonical hyphenated form, as persisted.
    #[must_use]
    pub fn to_db_string(&self) -> String {
        self.0.hyphenated().to_string()
    }
}

impl fmt::Display for GuestToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

/// The owner of a cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum Identity {
    /// A logged-in customer.
    Customer(CustomerId),
    /// An anonymous visitor.
    Guest(GuestToken),
}

impl Identity {
    /// The customer id, if this identity is authenticated.
    #[must_use]
    pub const fn customer_id(&self) -> Option<CustomerId> {
        match self {
            Self::Customer(id) => Some(*id),
            Self::Guest(_) => None,
        }
    }

    /// Whether this is an anonymous visitor.
    #[must_use]
    pub const fn is_guest(&self) -> bool {
        matches!(self, Self::Guest(_))
    }
}

impl From<CustomerId> for Identity {
    fn from(id: CustomerId) -> Self {
        Self::Customer(id)
    }
}

impl From<GuestToken> for Identity {
    fn from(token: GuestToken) -> Self {
        Self::Guest(token)
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Customer(id) => write!(f, "customer:{id}"),
            Self::Guest(token) => write!(f, "guest:{token}"),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_guest_tokens_are_distinct() {
        assert_ne!(GuestToken::generate(), GuestToken::generate());
    }

    #[test]
    fn test_guest_token_parse_round_trip() {
        let token = GuestToken::generate();
        let parsed = GuestToken::parse(&token.to_string()).unwrap();
        assert_eq!(parsed, token);
        assert_eq!(parsed.to_db_string(), token.to_string());
        assert!(GuestToken::parse("not-a-token").is_err());
    }

    #[test]
    fn test_identity_accessors() {
        let customer = Identity::from(CustomerId::new(3));
        assert_eq!(customer.customer_id(), Some(CustomerId::new(3)));
        assert!(!customer.is_guest());

        let guest = Identity::from(GuestToken::generate());
        assert_eq!(guest.customer_id(), None);
        assert!(guest.is_guest());
    }

    #[test]
    fn test_identity_display() {
        assert_eq!(Identity::Customer(CustomerId::new(9)).to_string(), "customer:9");
    }
}

//! Strongly-typed identifiers used across the domain.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Identifier of a product.
///
/// Supplied by the caller at creation time, positive, and immutable afterwards.
/// Ordering follows the integer value, which is also the listing order.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(i64);

impl ProductId {
    /// Build an identifier from a raw integer, rejecting zero and negatives.
    pub fn new(value: i64) -> Result<Self, DomainError> {
        if value < 1 {
            return Err(DomainError::invalid_id(format!(
                "ProductId: must be a positive integer, got {value}"
            )));
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl core::fmt::Display for ProductId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl From<ProductId> for i64 {
    fn from(value: ProductId) -> Self {
        value.0
    }
}

impl TryFrom<i64> for ProductId {
    type Error = DomainError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl FromStr for ProductId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s
            .trim()
            .parse::<i64>()
            .map_err(|e| DomainError::invalid_id(format!("ProductId: {e}")))?;
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_positive_integers() {
        let id: ProductId = "42".parse().unwrap();
        assert_eq!(id.value(), 42);
        assert_eq!(id.to_string(), "42");
    }

    #[test]
    fn rejects_non_numeric_and_non_positive() {
        assert!(matches!("abc".parse::<ProductId>(), Err(DomainError::InvalidId(_))));
        assert!(matches!("0".parse::<ProductId>(), Err(DomainError::InvalidId(_))));
        assert!(matches!(ProductId::new(-3), Err(DomainError::InvalidId(_))));
    }

    #[test]
    fn serializes_as_bare_integer() {
        let id = ProductId::new(7).unwrap();
        assert_eq!(serde_json::to_value(id).unwrap(), serde_json::json!(7));
    }
}

//! Value objects: equality by value, not identity.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// Marker trait for value objects (immutable, compared by value).
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}

/// A strictly positive amount of stock.
///
/// Movements, recipe lines and purchase lines carry a `Quantity`; direction is
/// expressed by the movement's source/destination, never by a sign.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Quantity(Decimal);

impl Quantity {
    /// Build a quantity, rejecting zero and negative values.
    pub fn positive(value: Decimal) -> DomainResult<Self> {
        if value <= Decimal::ZERO {
            return Err(DomainError::validation(format!(
                "quantity must be positive (got {value})"
            )));
        }
        Ok(Self(value.normalize()))
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    /// Scale by a positive multiplier (recipe explosion).
    pub fn times(self, other: Quantity) -> DomainResult<Quantity> {
        let product = self.0.checked_mul(other.0).ok_or_else(|| {
            DomainError::validation(format!("quantity {self} x {other} is out of range"))
        })?;
        Ok(Quantity(product.normalize()))
    }
}

impl ValueObject for Quantity {}

impl TryFrom<Decimal> for Quantity {
    type Error = DomainError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::positive(value)
    }
}

impl From<Quantity> for Decimal {
    fn from(value: Quantity) -> Self {
        value.0
    }
}

impl core::fmt::Display for Quantity {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn rejects_zero_and_negative() {
        assert!(Quantity::positive(Decimal::ZERO).is_err());
        assert!(Quantity::positive(dec!(-1)).is_err());
        assert_eq!(Quantity::positive(dec!(2.50)).unwrap().value(), dec!(2.5));
    }

    #[test]
    fn times_multiplies_exactly() {
        let per_unit = Quantity::positive(dec!(0.3)).unwrap();
        let sold = Quantity::positive(dec!(3)).unwrap();
        assert_eq!(per_unit.times(sold).unwrap().value(), dec!(0.9));
    }

    #[test]
    fn times_rejects_overflow() {
        let huge = Quantity::positive(Decimal::MAX).unwrap();
        let two = Quantity::positive(dec!(2)).unwrap();
        let err = huge.times(two).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn deserializing_a_non_positive_value_fails() {
        let err = serde_json::from_str::<Quantity>("\"0\"");
        assert!(err.is_err());
        let ok: Quantity = serde_json::from_str("\"4.5\"").unwrap();
        assert_eq!(ok.value(), dec!(4.5));
    }
}

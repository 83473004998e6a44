use serde::{Deserialize, Serialize};
use validator::Validate;

use boteco_core::{DomainError, DomainResult, Entity, ProductId};

use crate::{normalize_name, validation_failed};

pub const DEFAULT_UNIT_OF_MEASURE: &str = "unidade";

/// What a product is for.
///
/// Only ingredients are stock-tracked raw items; composites are sold and
/// consume ingredients through their recipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductKind {
    Ingredient,
    Composite,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub unit_of_measure: String,
    pub kind: ProductKind,
}

impl Product {
    pub fn is_ingredient(&self) -> bool {
        self.kind == ProductKind::Ingredient
    }

    pub fn is_composite(&self) -> bool {
        self.kind == ProductKind::Composite
    }

    /// Reject anything but an ingredient for `purpose` (recipe component,
    /// replenishment line, count line).
    pub fn ensure_ingredient(&self, purpose: &str) -> DomainResult<()> {
        if !self.is_ingredient() {
            return Err(DomainError::invariant(format!(
                "product '{}' is not an ingredient and cannot be used as {purpose}",
                self.name
            )));
        }
        Ok(())
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Input for registering a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct NewProduct {
    #[validate(length(min = 1, max = 100, message = "product name must have 1 to 100 characters"))]
    pub name: String,
    #[validate(length(min = 1, max = 20))]
    pub unit_of_measure: String,
    pub kind: ProductKind,
}

impl NewProduct {
    pub fn ingredient(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            unit_of_measure: DEFAULT_UNIT_OF_MEASURE.to_string(),
            kind: ProductKind::Ingredient,
        }
    }

    pub fn composite(name: impl Into<String>) -> Self {
        Self {
            kind: ProductKind::Composite,
            ..Self::ingredient(name)
        }
    }

    pub fn measured_in(mut self, unit: impl Into<String>) -> Self {
        self.unit_of_measure = unit.into();
        self
    }

    pub fn into_product(self, id: ProductId) -> DomainResult<Product> {
        let normalized = Self {
            name: normalize_name(&self.name),
            unit_of_measure: self.unit_of_measure.trim().to_string(),
            kind: self.kind,
        };
        normalized.validate().map_err(validation_failed)?;
        Ok(Product {
            id,
            name: normalized.name,
            unit_of_measure: normalized.unit_of_measure,
            kind: normalized.kind,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_unidade() {
        let p = NewProduct::ingredient("Batata Congelada")
            .into_product(ProductId::new())
            .unwrap();
        assert_eq!(p.unit_of_measure, DEFAULT_UNIT_OF_MEASURE);
        assert!(p.is_ingredient());
    }

    #[test]
    fn composite_is_not_an_ingredient() {
        let p = NewProduct::composite("Porção de Fritas")
            .into_product(ProductId::new())
            .unwrap();
        let err = p.ensure_ingredient("a count line").unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));
    }

    #[test]
    fn empty_unit_is_rejected() {
        let err = NewProduct::ingredient("Chopp")
            .measured_in(" ")
            .into_product(ProductId::new())
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }
}

//! Recipes ("fichas técnicas"): how many units of each ingredient one unit of a
//! composite product consumes.

use std::collections::HashSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use boteco_core::{DomainError, DomainResult, ProductId, Quantity};

use crate::product::Product;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeLine {
    pub composite: ProductId,
    pub ingredient: ProductId,
    pub quantity_per_unit: Quantity,
}

impl RecipeLine {
    /// Ingredient quantity consumed by selling `sold` units of the composite.
    pub fn consumption_for(&self, sold: Quantity) -> DomainResult<Quantity> {
        self.quantity_per_unit.times(sold)
    }
}

/// One requested component of a recipe, before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeComponent {
    pub ingredient: Product,
    pub quantity_per_unit: Decimal,
}

/// Validate a full recipe for `composite`.
///
/// Only composites may own a recipe, only ingredients may be components, each
/// ingredient appears once and every per-unit quantity is positive. An empty
/// component list is allowed (it clears the recipe).
pub fn build_recipe(
    composite: &Product,
    components: &[RecipeComponent],
) -> DomainResult<Vec<RecipeLine>> {
    if !composite.is_composite() {
        return Err(DomainError::invariant(format!(
            "product '{}' is not a composite product and cannot own a recipe",
            composite.name
        )));
    }

    let mut seen = HashSet::new();
    let mut lines = Vec::with_capacity(components.len());
    for component in components {
        component.ingredient.ensure_ingredient("a recipe component")?;
        if !seen.insert(component.ingredient.id) {
            return Err(DomainError::validation(format!(
                "ingredient '{}' appears more than once in the recipe",
                component.ingredient.name
            )));
        }
        lines.push(RecipeLine {
            composite: composite.id,
            ingredient: component.ingredient.id,
            quantity_per_unit: Quantity::positive(component.quantity_per_unit)?,
        });
    }
    Ok(lines)
}

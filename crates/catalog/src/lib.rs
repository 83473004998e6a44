//! Reference data for the stock ledger: locations, products, suppliers and recipes.
//!
//! These are long-lived records. Nothing here touches stock quantities; deleting
//! a record that is still referenced is refused by the infrastructure layer.

pub mod location;
pub mod product;
pub mod recipe;
pub mod supplier;

pub use location::{Location, NewLocation};
pub use product::{NewProduct, Product, ProductKind, DEFAULT_UNIT_OF_MEASURE};
pub use recipe::{RecipeComponent, RecipeLine, build_recipe};
pub use supplier::{NewSupplier, Supplier};

use boteco_core::DomainError;

/// Map `validator` failures into the domain taxonomy.
pub(crate) fn validation_failed(errors: validator::ValidationErrors) -> DomainError {
    DomainError::validation(errors.to_string())
}

/// Trim and collapse internal whitespace, the canonical form of every name.
pub fn normalize_name(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

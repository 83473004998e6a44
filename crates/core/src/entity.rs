//! Reference data with a stable identity.

/// Locations, products and suppliers keep their id while their name, unit or
/// contact details change.
pub trait Entity {
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    fn id(&self) -> &Self::Id;
}

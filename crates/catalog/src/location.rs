use serde::{Deserialize, Serialize};
use validator::Validate;

use boteco_core::{DomainResult, Entity, LocationId};

use crate::{normalize_name, validation_failed};

/// A place that holds stock: a bar/restaurant unit or the central kitchen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub id: LocationId,
    pub name: String,
    pub address: Option<String>,
}

impl Entity for Location {
    type Id = LocationId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Input for registering a location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct NewLocation {
    #[validate(length(min = 1, max = 100, message = "location name must have 1 to 100 characters"))]
    pub name: String,
    #[validate(length(max = 200))]
    pub address: Option<String>,
}

impl NewLocation {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: None,
        }
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    /// Validate and assign an identity.
    pub fn into_location(self, id: LocationId) -> DomainResult<Location> {
        let normalized = Self {
            name: normalize_name(&self.name),
            address: self
                .address
                .map(|a| a.trim().to_string())
                .filter(|a| !a.is_empty()),
        };
        normalized.validate().map_err(validation_failed)?;
        Ok(Location {
            id,
            name: normalized.name,
            address: normalized.address,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_name_is_rejected() {
        assert!(NewLocation::new("   ").into_location(LocationId::new()).is_err());
    }

    #[test]
    fn name_is_normalized_and_blank_address_dropped() {
        let loc = NewLocation::new("  Cozinha   Central ")
            .with_address("  ")
            .into_location(LocationId::new())
            .unwrap();
        assert_eq!(loc.name, "Cozinha Central");
        assert_eq!(loc.address, None);
    }
}

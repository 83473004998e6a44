use serde::{Deserialize, Serialize};
use validator::Validate;

use boteco_core::{DomainResult, Entity, SupplierId};

use crate::{normalize_name, validation_failed};

/// Who purchase orders are placed with. Pure reference data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Supplier {
    pub id: SupplierId,
    pub name: String,
    pub contact_name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

impl Entity for Supplier {
    type Id = SupplierId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct NewSupplier {
    #[validate(length(min = 1, max = 200, message = "supplier name must have 1 to 200 characters"))]
    pub name: String,
    #[validate(length(max = 100))]
    pub contact_name: Option<String>,
    #[validate(length(max = 20))]
    pub phone: Option<String>,
    #[validate(email(message = "invalid supplier e-mail"))]
    pub email: Option<String>,
}

impl NewSupplier {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn into_supplier(self, id: SupplierId) -> DomainResult<Supplier> {
        let clean = |v: Option<String>| v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
        let normalized = Self {
            name: normalize_name(&self.name),
            contact_name: clean(self.contact_name),
            phone: clean(self.phone),
            email: clean(self.email),
        };
        normalized.validate().map_err(validation_failed)?;
        Ok(Supplier {
            id,
            name: normalized.name,
            contact_name: normalized.contact_name,
            phone: normalized.phone,
            email: normalized.email,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_email_is_rejected() {
        let input = NewSupplier {
            email: Some("not-an-email".to_string()),
            ..NewSupplier::new("Ambev")
        };
        assert!(input.into_supplier(SupplierId::new()).is_err());
    }

    #[test]
    fn optional_contact_fields_are_trimmed() {
        let input = NewSupplier {
            contact_name: Some("  ".to_string()),
            phone: Some(" 11 99999-0000 ".to_string()),
            ..NewSupplier::new("Hortifruti  Silva")
        };
        let supplier = input.into_supplier(SupplierId::new()).unwrap();
        assert_eq!(supplier.name, "Hortifruti Silva");
        assert_eq!(supplier.contact_name, None);
        assert_eq!(supplier.phone.as_deref(), Some("11 99999-0000"));
    }
}

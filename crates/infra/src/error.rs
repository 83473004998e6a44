use thiserror::Error;

use boteco_core::DomainError;

/// Storage failure, independent of business rules.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("store lock poisoned")]
    Poisoned,

    #[error("record not found in store: {0}")]
    Missing(String),
}

/// Error returned by every `InventoryCore` operation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    pub fn domain(&self) -> Option<&DomainError> {
        match self {
            CoreError::Domain(e) => Some(e),
            CoreError::Store(_) => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.domain().is_some_and(DomainError::is_not_found)
    }

    pub fn is_invalid_state(&self) -> bool {
        self.domain().is_some_and(DomainError::is_invalid_state)
    }

    pub fn is_empty_operation(&self) -> bool {
        matches!(self, CoreError::Domain(DomainError::EmptyOperation(_)))
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, CoreError::Domain(DomainError::Validation(_)))
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, CoreError::Domain(DomainError::Conflict(_)))
    }
}

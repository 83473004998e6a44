//! Replenishment domain module: moving stock from the central hub to a unit.
//!
//! Suggestions are advisory reads over the ledger; a manager turns the lines
//! they accept into a Pending request, and completing it emits one transfer
//! per line from the central hub.

pub mod request;
pub mod suggestion;

pub use request::{
    CancelRequest, CompleteRequest, CreateRequest, ReplenishmentCommand, ReplenishmentEvent,
    ReplenishmentLine, ReplenishmentRequest, ReplenishmentStatus, RequestCancelled,
    RequestCompleted, RequestCreated,
};
pub use suggestion::{ReplenishmentSuggestion, suggest};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use boteco_core::{
    Aggregate, AggregateRoot, DomainError, LocationId, ProductId, Quantity, ReplenishmentRequestId,
};
use boteco_events::Event;
use boteco_inventory::MovementDraft;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplenishmentStatus {
    Pending,
    Completed,
    Cancelled,
}

impl ReplenishmentStatus {
    pub fn is_terminal(self) -> bool {
        self != ReplenishmentStatus::Pending
    }
}

/// One product asked for in a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplenishmentLine {
    pub product: ProductId,
    pub quantity: Decimal,
    pub justification: Option<String>,
}

impl ReplenishmentLine {
    pub fn new(product: ProductId, quantity: Decimal) -> Self {
        Self {
            product,
            quantity,
            justification: None,
        }
    }

    pub fn justified(mut self, justification: impl Into<String>) -> Self {
        self.justification = Some(justification.into());
        self
    }
}

/// Aggregate root: ReplenishmentRequest (header + owned lines).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplenishmentRequest {
    id: ReplenishmentRequestId,
    destination: Option<LocationId>,
    created_at: Option<DateTime<Utc>>,
    status: ReplenishmentStatus,
    lines: Vec<ReplenishmentLine>,
    version: u64,
    created: bool,
}

impl ReplenishmentRequest {
    /// Create an empty, not-yet-created aggregate instance.
    pub fn empty(id: ReplenishmentRequestId) -> Self {
        Self {
            id,
            destination: None,
            created_at: None,
            status: ReplenishmentStatus::Pending,
            lines: Vec::new(),
            version: 0,
            created: false,
        }
    }

    pub fn id_typed(&self) -> ReplenishmentRequestId {
        self.id
    }

    pub fn destination(&self) -> Option<LocationId> {
        self.destination
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    pub fn status(&self) -> ReplenishmentStatus {
        self.status
    }

    pub fn lines(&self) -> &[ReplenishmentLine] {
        &self.lines
    }

    pub fn is_created(&self) -> bool {
        self.created
    }
}

impl AggregateRoot for ReplenishmentRequest {
    type Id = ReplenishmentRequestId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: CreateRequest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateRequest {
    pub request_id: ReplenishmentRequestId,
    pub destination: LocationId,
    pub lines: Vec<ReplenishmentLine>,
    pub occurred_at: DateTime<Utc>,
}

/// Command: CompleteRequest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompleteRequest {
    pub request_id: ReplenishmentRequestId,
    pub central_hub: LocationId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: CancelRequest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelRequest {
    pub request_id: ReplenishmentRequestId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReplenishmentCommand {
    Create(CreateRequest),
    Complete(CompleteRequest),
    Cancel(CancelRequest),
}

/// Event: RequestCreated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestCreated {
    pub request_id: ReplenishmentRequestId,
    pub destination: LocationId,
    pub lines: Vec<ReplenishmentLine>,
    pub occurred_at: DateTime<Utc>,
}

/// Event: RequestCompleted.
///
/// Carries the transfers to emit; the infrastructure layer turns them into
/// movements in the same unit of work that stores the new status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestCompleted {
    pub request_id: ReplenishmentRequestId,
    pub source: LocationId,
    pub destination: LocationId,
    pub transfers: Vec<ReplenishmentLine>,
    pub occurred_at: DateTime<Utc>,
}

impl RequestCompleted {
    pub fn transfer_drafts(&self) -> Result<Vec<MovementDraft>, DomainError> {
        self.transfers
            .iter()
            .map(|line| {
                Ok(MovementDraft::transfer(
                    line.product,
                    Quantity::positive(line.quantity)?,
                    self.source,
                    self.destination,
                ))
            })
            .collect()
    }
}

/// Event: RequestCancelled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestCancelled {
    pub request_id: ReplenishmentRequestId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReplenishmentEvent {
    RequestCreated(RequestCreated),
    RequestCompleted(RequestCompleted),
    RequestCancelled(RequestCancelled),
}

impl Event for ReplenishmentEvent {
    fn event_type(&self) -> &'static str {
        match self {
            ReplenishmentEvent::RequestCreated(_) => "replenishment.request.created",
            ReplenishmentEvent::RequestCompleted(_) => "replenishment.request.completed",
            ReplenishmentEvent::RequestCancelled(_) => "replenishment.request.cancelled",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            ReplenishmentEvent::RequestCreated(e) => e.occurred_at,
            ReplenishmentEvent::RequestCompleted(e) => e.occurred_at,
            ReplenishmentEvent::RequestCancelled(e) => e.occurred_at,
        }
    }
}

impl Aggregate for ReplenishmentRequest {
    type Command = ReplenishmentCommand;
    type Event = ReplenishmentEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            ReplenishmentEvent::RequestCreated(e) => {
                self.id = e.request_id;
                self.destination = Some(e.destination);
                self.created_at = Some(e.occurred_at);
                self.status = ReplenishmentStatus::Pending;
                self.lines = e.lines.clone();
                self.created = true;
            }
            ReplenishmentEvent::RequestCompleted(_) => {
                self.status = ReplenishmentStatus::Completed;
            }
            ReplenishmentEvent::RequestCancelled(_) => {
                self.status = ReplenishmentStatus::Cancelled;
            }
        }

        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            ReplenishmentCommand::Create(cmd) => self.handle_create(cmd),
            ReplenishmentCommand::Complete(cmd) => self.handle_complete(cmd),
            ReplenishmentCommand::Cancel(cmd) => self.handle_cancel(cmd),
        }
    }
}

impl ReplenishmentRequest {
    fn ensure_request_id(&self, request_id: ReplenishmentRequestId) -> Result<(), DomainError> {
        if self.id != request_id {
            return Err(DomainError::invariant("request_id mismatch"));
        }
        Ok(())
    }

    fn ensure_pending(&self, action: &str) -> Result<(), DomainError> {
        if self.status != ReplenishmentStatus::Pending {
            return Err(DomainError::invalid_state(format!(
                "cannot {action} replenishment request {} in status {:?}",
                self.id, self.status
            )));
        }
        Ok(())
    }

    fn handle_create(&self, cmd: &CreateRequest) -> Result<Vec<ReplenishmentEvent>, DomainError> {
        if self.created {
            return Err(DomainError::conflict("replenishment request already exists"));
        }

        if let Some(line) = cmd.lines.iter().find(|l| l.quantity < Decimal::ZERO) {
            return Err(DomainError::validation(format!(
                "requested quantity for product {} is negative",
                line.product
            )));
        }

        // Zero-quantity lines are the untouched rows of the suggestion form.
        let lines: Vec<ReplenishmentLine> = cmd
            .lines
            .iter()
            .filter(|l| l.quantity > Decimal::ZERO)
            .cloned()
            .collect();
        if lines.is_empty() {
            return Err(DomainError::empty(
                "no line with a quantity greater than zero",
            ));
        }

        Ok(vec![ReplenishmentEvent::RequestCreated(RequestCreated {
            request_id: cmd.request_id,
            destination: cmd.destination,
            lines,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_complete(
        &self,
        cmd: &CompleteRequest,
    ) -> Result<Vec<ReplenishmentEvent>, DomainError> {
        if !self.created {
            return Err(DomainError::not_found(format!("replenishment request {}", cmd.request_id)));
        }
        self.ensure_request_id(cmd.request_id)?;
        self.ensure_pending("complete")?;

        let destination = self
            .destination
            .ok_or_else(|| DomainError::invariant("destination must be set"))?;
        if destination == cmd.central_hub {
            return Err(DomainError::invariant(
                "the central hub cannot replenish itself",
            ));
        }

        let transfers = self
            .lines
            .iter()
            .filter(|l| l.quantity > Decimal::ZERO)
            .cloned()
            .collect();

        Ok(vec![ReplenishmentEvent::RequestCompleted(RequestCompleted {
            request_id: cmd.request_id,
            source: cmd.central_hub,
            destination,
            transfers,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_cancel(&self, cmd: &CancelRequest) -> Result<Vec<ReplenishmentEvent>, DomainError> {
        if !self.created {
            return Err(DomainError::not_found(format!("replenishment request {}", cmd.request_id)));
        }
        self.ensure_request_id(cmd.request_id)?;
        self.ensure_pending("cancel")?;

        Ok(vec![ReplenishmentEvent::RequestCancelled(RequestCancelled {
            request_id: cmd.request_id,
            occurred_at: cmd.occurred_at,
        })])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn test_time() -> DateTime<Utc> {
        Utc::now()
    }

    fn created(lines: Vec<ReplenishmentLine>) -> ReplenishmentRequest {
        let id = ReplenishmentRequestId::new();
        let mut request = ReplenishmentRequest::empty(id);
        request
            .execute(&ReplenishmentCommand::Create(CreateRequest {
                request_id: id,
                destination: LocationId::new(),
                lines,
                occurred_at: test_time(),
            }))
            .unwrap();
        request
    }

    #[test]
    fn create_discards_zero_lines() {
        let (p1, p2) = (ProductId::new(), ProductId::new());
        let request = created(vec![
            ReplenishmentLine::new(p1, dec!(3)),
            ReplenishmentLine::new(p2, dec!(0)),
        ]);
        assert_eq!(request.status(), ReplenishmentStatus::Pending);
        assert_eq!(request.lines().len(), 1);
        assert_eq!(request.lines()[0].product, p1);
        assert_eq!(request.version(), 1);
    }

    #[test]
    fn create_with_only_zero_lines_is_an_empty_operation() {
        let id = ReplenishmentRequestId::new();
        let err = ReplenishmentRequest::empty(id)
            .handle(&ReplenishmentCommand::Create(CreateRequest {
                request_id: id,
                destination: LocationId::new(),
                lines: vec![ReplenishmentLine::new(ProductId::new(), dec!(0))],
                occurred_at: test_time(),
            }))
            .unwrap_err();
        assert!(matches!(err, DomainError::EmptyOperation(_)));
    }

    #[test]
    fn complete_emits_one_transfer_per_line_from_the_hub() {
        let (p1, p2) = (ProductId::new(), ProductId::new());
        let mut request = created(vec![
            ReplenishmentLine::new(p1, dec!(3)),
            ReplenishmentLine::new(p2, dec!(1.5)).justified("evento especial"),
        ]);
        let hub = LocationId::new();

        let events = request
            .execute(&ReplenishmentCommand::Complete(CompleteRequest {
                request_id: request.id_typed(),
                central_hub: hub,
                occurred_at: test_time(),
            }))
            .unwrap();

        let ReplenishmentEvent::RequestCompleted(done) = &events[0] else {
            panic!("expected RequestCompleted");
        };
        let drafts = done.transfer_drafts().unwrap();
        assert_eq!(drafts.len(), 2);
        assert!(drafts.iter().all(|d| d.source == Some(hub)));
        assert!(drafts.iter().all(|d| d.destination == request.destination()));
        assert_eq!(request.status(), ReplenishmentStatus::Completed);
    }

    #[test]
    fn completion_skips_zero_lines_that_bypassed_creation() {
        let id = ReplenishmentRequestId::new();
        let destination = LocationId::new();
        let (p1, p2) = (ProductId::new(), ProductId::new());
        // Rehydrate directly from an event, as a legacy record would be.
        let mut request = ReplenishmentRequest::empty(id);
        request.apply(&ReplenishmentEvent::RequestCreated(RequestCreated {
            request_id: id,
            destination,
            lines: vec![
                ReplenishmentLine::new(p1, dec!(3)),
                ReplenishmentLine::new(p2, dec!(0)),
            ],
            occurred_at: test_time(),
        }));

        let events = request
            .handle(&ReplenishmentCommand::Complete(CompleteRequest {
                request_id: id,
                central_hub: LocationId::new(),
                occurred_at: test_time(),
            }))
            .unwrap();
        let ReplenishmentEvent::RequestCompleted(done) = &events[0] else {
            panic!("expected RequestCompleted");
        };
        assert_eq!(done.transfers.len(), 1);
        assert_eq!(done.transfers[0].product, p1);
    }

    #[test]
    fn terminal_requests_reject_further_transitions() {
        let mut request = created(vec![ReplenishmentLine::new(ProductId::new(), dec!(1))]);
        let id = request.id_typed();
        request
            .execute(&ReplenishmentCommand::Cancel(CancelRequest { request_id: id, occurred_at: test_time() }))
            .unwrap();
        assert_eq!(request.status(), ReplenishmentStatus::Cancelled);

        let err = request
            .handle(&ReplenishmentCommand::Complete(CompleteRequest {
                request_id: id,
                central_hub: LocationId::new(),
                occurred_at: test_time(),
            }))
            .unwrap_err();
        assert!(err.is_invalid_state());
    }

    #[test]
    fn hub_cannot_be_the_destination() {
        let request = created(vec![ReplenishmentLine::new(ProductId::new(), dec!(1))]);
        let err = request
            .handle(&ReplenishmentCommand::Complete(CompleteRequest {
                request_id: request.id_typed(),
                central_hub: request.destination().unwrap(),
                occurred_at: test_time(),
            }))
            .unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));
    }
}

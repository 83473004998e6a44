use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use boteco_core::{Aggregate, AggregateRoot, DomainError, LocationId, ProductId, Quantity, StockCountId};
use boteco_events::Event;
use boteco_inventory::MovementDraft;

/// One counted product. `system_quantity` is the ledger value when the line
/// was recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountLine {
    pub product: ProductId,
    pub system_quantity: Decimal,
    pub physical_quantity: Decimal,
}

impl CountLine {
    /// `physical - system`; positive means stock was found, negative lost.
    pub fn difference(&self) -> Decimal {
        self.physical_quantity - self.system_quantity
    }

    /// The corrective adjustment for this line, if any.
    pub fn adjustment(&self, location: LocationId) -> Option<MovementDraft> {
        let difference = self.difference();
        let quantity = Quantity::positive(difference.abs()).ok()?;
        if difference > Decimal::ZERO {
            Some(MovementDraft::adjustment_in(self.product, quantity, location))
        } else {
            Some(MovementDraft::adjustment_out(self.product, quantity, location))
        }
    }
}

/// Aggregate root: StockCount (header + owned lines).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockCount {
    id: StockCountId,
    location: Option<LocationId>,
    counted_at: Option<DateTime<Utc>>,
    operator: String,
    notes: Option<String>,
    finalized: bool,
    lines: Vec<CountLine>,
    version: u64,
    created: bool,
}

impl StockCount {
    pub fn empty(id: StockCountId) -> Self {
        Self {
            id,
            location: None,
            counted_at: None,
            operator: String::new(),
            notes: None,
            finalized: false,
            lines: Vec::new(),
            version: 0,
            created: false,
        }
    }

    pub fn id_typed(&self) -> StockCountId {
        self.id
    }

    pub fn location(&self) -> Option<LocationId> {
        self.location
    }

    pub fn counted_at(&self) -> Option<DateTime<Utc>> {
        self.counted_at
    }

    pub fn operator(&self) -> &str {
        &self.operator
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    pub fn lines(&self) -> &[CountLine] {
        &self.lines
    }

    pub fn line_for(&self, product: ProductId) -> Option<&CountLine> {
        self.lines.iter().find(|l| l.product == product)
    }
}

impl AggregateRoot for StockCount {
    type Id = StockCountId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: StartCount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartCount {
    pub count_id: StockCountId,
    pub location: LocationId,
    pub operator: String,
    pub notes: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

/// Command: RecordCountLine (insert or replace the line for `product`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordCountLine {
    pub count_id: StockCountId,
    pub product: ProductId,
    pub system_quantity: Decimal,
    pub physical_quantity: Decimal,
    pub occurred_at: DateTime<Utc>,
}

/// Command: FinalizeCount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalizeCount {
    pub count_id: StockCountId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StockCountCommand {
    Start(StartCount),
    RecordLine(RecordCountLine),
    Finalize(FinalizeCount),
}

/// Event: CountStarted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountStarted {
    pub count_id: StockCountId,
    pub location: LocationId,
    pub operator: String,
    pub notes: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

/// Event: CountLineRecorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountLineRecorded {
    pub count_id: StockCountId,
    pub line: CountLine,
    pub occurred_at: DateTime<Utc>,
}

/// Event: CountFinalized.
///
/// `discrepancies` holds only the lines whose difference is non-zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountFinalized {
    pub count_id: StockCountId,
    pub location: LocationId,
    pub discrepancies: Vec<CountLine>,
    pub occurred_at: DateTime<Utc>,
}

impl CountFinalized {
    pub fn adjustment_drafts(&self) -> Vec<MovementDraft> {
        self.discrepancies
            .iter()
            .filter_map(|line| line.adjustment(self.location))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StockCountEvent {
    CountStarted(CountStarted),
    CountLineRecorded(CountLineRecorded),
    CountFinalized(CountFinalized),
}

impl Event for StockCountEvent {
    fn event_type(&self) -> &'static str {
        match self {
            StockCountEvent::CountStarted(_) => "counting.count.started",
            StockCountEvent::CountLineRecorded(_) => "counting.count.line_recorded",
            StockCountEvent::CountFinalized(_) => "counting.count.finalized",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            StockCountEvent::CountStarted(e) => e.occurred_at,
            StockCountEvent::CountLineRecorded(e) => e.occurred_at,
            StockCountEvent::CountFinalized(e) => e.occurred_at,
        }
    }
}

impl Aggregate for StockCount {
    type Command = StockCountCommand;
    type Event = StockCountEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            StockCountEvent::CountStarted(e) => {
                self.id = e.count_id;
                self.location = Some(e.location);
                self.counted_at = Some(e.occurred_at);
                self.operator = e.operator.clone();
                self.notes = e.notes.clone();
                self.finalized = false;
                self.lines.clear();
                self.created = true;
            }
            StockCountEvent::CountLineRecorded(e) => {
                match self.lines.iter_mut().find(|l| l.product == e.line.product) {
                    Some(existing) => *existing = e.line.clone(),
                    None => self.lines.push(e.line.clone()),
                }
            }
            StockCountEvent::CountFinalized(_) => {
                self.finalized = true;
            }
        }

        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            StockCountCommand::Start(cmd) => self.handle_start(cmd),
            StockCountCommand::RecordLine(cmd) => self.handle_record_line(cmd),
            StockCountCommand::Finalize(cmd) => self.handle_finalize(cmd),
        }
    }
}

impl StockCount {
    fn ensure_open(&self, count_id: StockCountId) -> Result<(), DomainError> {
        if !self.created {
            return Err(DomainError::not_found(format!("stock count {count_id}")));
        }
        if self.id != count_id {
            return Err(DomainError::invariant("count_id mismatch"));
        }
        if self.finalized {
            return Err(DomainError::invalid_state(format!(
                "stock count {} is already finalized",
                self.id
            )));
        }
        Ok(())
    }

    fn handle_start(&self, cmd: &StartCount) -> Result<Vec<StockCountEvent>, DomainError> {
        if self.created {
            return Err(DomainError::conflict("stock count already exists"));
        }

        let operator = cmd.operator.trim();
        if operator.is_empty() {
            return Err(DomainError::validation("operator name is required"));
        }

        Ok(vec![StockCountEvent::CountStarted(CountStarted {
            count_id: cmd.count_id,
            location: cmd.location,
            operator: operator.to_string(),
            notes: cmd.notes.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_record_line(
        &self,
        cmd: &RecordCountLine,
    ) -> Result<Vec<StockCountEvent>, DomainError> {
        self.ensure_open(cmd.count_id)?;

        if cmd.physical_quantity < Decimal::ZERO {
            return Err(DomainError::validation(
                "physical quantity cannot be negative",
            ));
        }
        if cmd.physical_quantity.checked_sub(cmd.system_quantity).is_none() {
            return Err(DomainError::validation(format!(
                "difference between {} and {} is out of range",
                cmd.physical_quantity, cmd.system_quantity
            )));
        }

        Ok(vec![StockCountEvent::CountLineRecorded(CountLineRecorded {
            count_id: cmd.count_id,
            line: CountLine {
                product: cmd.product,
                system_quantity: cmd.system_quantity,
                physical_quantity: cmd.physical_quantity,
            },
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_finalize(&self, cmd: &FinalizeCount) -> Result<Vec<StockCountEvent>, DomainError> {
        self.ensure_open(cmd.count_id)?;

        let location = self
            .location
            .ok_or_else(|| DomainError::invariant("location must be set"))?;
        let discrepancies = self
            .lines
            .iter()
            .filter(|l| !l.difference().is_zero())
            .cloned()
            .collect();

        Ok(vec![StockCountEvent::CountFinalized(CountFinalized {
            count_id: cmd.count_id,
            location,
            discrepancies,
            occurred_at: cmd.occurred_at,
        })])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use boteco_inventory::MovementKind;
    use rust_decimal_macros::dec;

    fn test_time() -> DateTime<Utc> {
        Utc::now()
    }

    fn started(location: LocationId) -> StockCount {
        let id = StockCountId::new();
        let mut count = StockCount::empty(id);
        count
            .execute(&StockCountCommand::Start(StartCount {
                count_id: id,
                location,
                operator: " Marina ".into(),
                notes: None,
                occurred_at: test_time(),
            }))
            .unwrap();
        count
    }

    fn record(count: &mut StockCount, product: ProductId, system: Decimal, physical: Decimal) {
        count
            .execute(&StockCountCommand::RecordLine(RecordCountLine {
                count_id: count.id_typed(),
                product,
                system_quantity: system,
                physical_quantity: physical,
                occurred_at: test_time(),
            }))
            .unwrap();
    }

    fn finalize(count: &mut StockCount) -> Result<Vec<StockCountEvent>, DomainError> {
        count.execute(&StockCountCommand::Finalize(FinalizeCount {
            count_id: count.id_typed(),
            occurred_at: test_time(),
        }))
    }

    #[test]
    fn shortage_debits_and_surplus_credits_the_location() {
        let location = LocationId::new();
        let mut count = started(location);
        assert_eq!(count.operator(), "Marina");
        let (short, surplus, exact) = (ProductId::new(), ProductId::new(), ProductId::new());
        record(&mut count, short, dec!(10), dec!(7));
        record(&mut count, surplus, dec!(10), dec!(14));
        record(&mut count, exact, dec!(5), dec!(5));

        let events = finalize(&mut count).unwrap();
        let StockCountEvent::CountFinalized(done) = &events[0] else {
            panic!("expected CountFinalized");
        };
        let drafts = done.adjustment_drafts();
        assert_eq!(drafts.len(), 2);

        assert_eq!(drafts[0].product, short);
        assert_eq!(drafts[0].kind, MovementKind::Adjustment);
        assert_eq!(drafts[0].source, Some(location));
        assert_eq!(drafts[0].destination, None);
        assert_eq!(drafts[0].quantity.value(), dec!(3));

        assert_eq!(drafts[1].product, surplus);
        assert_eq!(drafts[1].source, None);
        assert_eq!(drafts[1].destination, Some(location));
        assert_eq!(drafts[1].quantity.value(), dec!(4));

        assert!(count.is_finalized());
    }

    #[test]
    fn recording_the_same_product_twice_replaces_the_line() {
        let mut count = started(LocationId::new());
        let beer = ProductId::new();
        record(&mut count, beer, dec!(10), dec!(8));
        record(&mut count, beer, dec!(10), dec!(9));
        assert_eq!(count.lines().len(), 1);
        assert_eq!(count.line_for(beer).unwrap().difference(), dec!(-1));
    }

    #[test]
    fn finalized_counts_reject_further_commands() {
        let mut count = started(LocationId::new());
        record(&mut count, ProductId::new(), dec!(1), dec!(2));
        finalize(&mut count).unwrap();
        let version = count.version();

        assert!(finalize(&mut count).unwrap_err().is_invalid_state());
        let err = count
            .handle(&StockCountCommand::RecordLine(RecordCountLine {
                count_id: count.id_typed(),
                product: ProductId::new(),
                system_quantity: dec!(0),
                physical_quantity: dec!(1),
                occurred_at: test_time(),
            }))
            .unwrap_err();
        assert!(err.is_invalid_state());
        assert_eq!(count.version(), version);
    }

    #[test]
    fn out_of_range_difference_is_rejected() {
        let count = started(LocationId::new());
        let err = count
            .handle(&StockCountCommand::RecordLine(RecordCountLine {
                count_id: count.id_typed(),
                product: ProductId::new(),
                system_quantity: Decimal::MIN,
                physical_quantity: dec!(1),
                occurred_at: test_time(),
            }))
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn operator_is_required() {
        let id = StockCountId::new();
        let err = StockCount::empty(id)
            .handle(&StockCountCommand::Start(StartCount {
                count_id: id,
                location: LocationId::new(),
                operator: "   ".into(),
                notes: None,
                occurred_at: test_time(),
            }))
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }
}

use chrono::{DateTime, Utc};

/// A fact emitted by the stock ledger or a workflow header.
///
/// Movements are events themselves; request, order and count transitions emit
/// events that the infrastructure layer turns into movements. None of them is
/// ever edited after it is recorded.
pub trait Event: Clone + core::fmt::Debug + Send + Sync + 'static {
    /// Dotted name used in logs, e.g. `"inventory.movement.transfer"`.
    fn event_type(&self) -> &'static str;

    /// Payload revision of this event type.
    fn version(&self) -> u32;

    /// Business time of the fact.
    fn occurred_at(&self) -> DateTime<Utc>;
}

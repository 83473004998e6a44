//! Domain events shared by the stock ledger and the workflow aggregates.

pub mod event;

pub use event::Event;

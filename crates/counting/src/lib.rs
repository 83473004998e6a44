//! Physical stock counts and their one-shot reconciliation against the ledger.

pub mod count;

pub use count::{
    CountFinalized, CountLine, CountLineRecorded, CountStarted, FinalizeCount, RecordCountLine,
    StartCount, StockCount, StockCountCommand, StockCountEvent,
};

//! Daily sales and the consumption they cause.
//!
//! A sale of a composite product is exploded through its recipe into one exit
//! movement per ingredient; a sale of an ingredient is a single exit. Deleting
//! a sale mirrors exactly the consumption that was recorded for it.

pub mod explosion;
pub mod import;
pub mod sale;

pub use explosion::explode;
pub use import::{
    ImportRowError, NormalizedSale, SalesReportRow, normalize_item_label, normalize_row,
    parse_report_quantity,
};
pub use sale::Sale;

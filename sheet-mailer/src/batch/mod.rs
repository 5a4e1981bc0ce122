//! Batch dispatch: one outcome per row, failures isolated per row

pub mod sender;
pub mod types;

pub use sender::{build_replacements, BatchSender, DEFAULT_NAME};
pub use types::{BatchSummary, DispatchOutcome, RowSelection};

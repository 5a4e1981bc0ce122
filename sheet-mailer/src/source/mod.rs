//! Tabular recipient sources
//!
//! A workbook or CSV file is read once into a [`Sheet`] of raw cells, then
//! shaped into a [`TabularSource`] according to the addressing mode.

pub mod loader;
pub mod types;

pub use loader::load_sheet;
pub use types::{Cell, KeyedRow, Sheet, TabularSource};

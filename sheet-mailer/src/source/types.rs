//! Source data structures

use std::collections::HashMap;

/// A single cell; blank cells are `None`
pub type Cell = Option<String>;

/// A row addressed by column header
pub type KeyedRow = HashMap<String, String>;

/// Raw cells of the first sheet, top to bottom
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sheet {
    pub rows: Vec<Vec<Cell>>,
}

impl Sheet {
    pub fn new(rows: Vec<Vec<Cell>>) -> Self {
        Self { rows }
    }

    /// Build a sheet from string literals, treating empty strings as blank
    pub fn from_strings<R, S>(rows: R) -> Self
    where
        R: IntoIterator,
        R::Item: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let rows = rows
            .into_iter()
            .map(|row| row.into_iter().map(|cell| normalize_cell(cell.as_ref())).collect())
            .collect();
        Self { rows }
    }
}

/// Rows of recipient data in dispatch order
///
/// The source is immutable once built: dispatch never inserts or removes rows.
#[derive(Debug, Clone, PartialEq)]
pub enum TabularSource {
    /// Every row of the sheet, cells addressed by position
    Positional(Vec<Vec<Cell>>),
    /// Data rows keyed by the sheet's first (header) row
    Keyed(Vec<KeyedRow>),
}

impl TabularSource {
    pub fn positional(sheet: Sheet) -> Self {
        TabularSource::Positional(sheet.rows)
    }

    /// Use the first row as headers for the remaining rows
    ///
    /// Blank header cells drop their column, blank data cells are absent keys
    /// and rows with no values at all are dropped.
    pub fn keyed(sheet: Sheet) -> Self {
        let mut rows = sheet.rows.into_iter();
        let headers = match rows.next() {
            Some(headers) => headers,
            None => return TabularSource::Keyed(Vec::new()),
        };

        let records = rows
            .map(|row| {
                headers
                    .iter()
                    .zip(row)
                    .filter_map(|(header, cell)| match (header, cell) {
                        (Some(header), Some(value)) => Some((header.clone(), value)),
                        _ => None,
                    })
                    .collect::<KeyedRow>()
            })
            .filter(|record| !record.is_empty())
            .collect();

        TabularSource::Keyed(records)
    }

    pub fn len(&self) -> usize {
        match self {
            TabularSource::Positional(rows) => rows.len(),
            TabularSource::Keyed(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Empty strings are blank cells; whitespace is kept as-is
pub(crate) fn normalize_cell(value: &str) -> Cell {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

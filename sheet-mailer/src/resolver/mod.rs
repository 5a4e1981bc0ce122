//! Row-to-recipient resolution
//!
//! Maps one row of a [`TabularSource`] to a [`RecipientRecord`] according to
//! an [`AddressingConfig`]. Resolution is pure: the source is already loaded
//! and nothing here touches the network or the filesystem.

use crate::error::{MailerError, Result};
use crate::source::TabularSource;
use serde::{Deserialize, Serialize};

/// Where the email and name of each recipient live in a row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum AddressingConfig {
    /// Email by position, no name column
    FixedEmailIndex { email_column: usize },
    /// Email and name by position
    IndexPair {
        email_column: usize,
        name_column: usize,
    },
    /// Email and name by header, applied to every row
    NamedColumns {
        email_column: String,
        name_column: String,
    },
}

impl AddressingConfig {
    /// Whether this mode reads header-keyed rows
    pub fn uses_headers(&self) -> bool {
        matches!(self, AddressingConfig::NamedColumns { .. })
    }

    /// Shape a raw sheet the way this mode reads it
    pub fn shape(&self, sheet: crate::source::Sheet) -> TabularSource {
        if self.uses_headers() {
            TabularSource::keyed(sheet)
        } else {
            TabularSource::positional(sheet)
        }
    }

    fn email_key(&self) -> ColumnKey {
        match self {
            AddressingConfig::FixedEmailIndex { email_column }
            | AddressingConfig::IndexPair { email_column, .. } => ColumnKey::Index(*email_column),
            AddressingConfig::NamedColumns { email_column, .. } => {
                ColumnKey::Header(email_column.clone())
            }
        }
    }

    fn name_key(&self) -> Option<ColumnKey> {
        match self {
            AddressingConfig::FixedEmailIndex { .. } => None,
            AddressingConfig::IndexPair { name_column, .. } => Some(ColumnKey::Index(*name_column)),
            AddressingConfig::NamedColumns { name_column, .. } => {
                Some(ColumnKey::Header(name_column.clone()))
            }
        }
    }
}

/// A column addressed by position or by header
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnKey {
    Index(usize),
    Header(String),
}

impl std::fmt::Display for ColumnKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ColumnKey::Index(index) => write!(f, "column #{}", index),
            ColumnKey::Header(header) => write!(f, "column '{}'", header),
        }
    }
}

/// A recipient extracted from one row
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RecipientRecord {
    pub email: Option<String>,
    pub name: Option<String>,
    /// Extra positional fields exposed to templates as `other1`, `other2`, ...
    ///
    /// No addressing mode fills this yet; it is always empty.
    pub other_data: Vec<String>,
}

/// Resolves rows into recipients for a fixed addressing mode
#[derive(Debug, Clone)]
pub struct RecipientResolver {
    config: AddressingConfig,
}

impl RecipientResolver {
    pub fn new(config: AddressingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AddressingConfig {
        &self.config
    }

    /// Resolve the recipient at `row_index`
    ///
    /// # Errors
    /// - [`MailerError::OutOfRange`] if `row_index >= source.len()`
    /// - [`MailerError::Resolution`] if the source shape does not match the mode
    pub fn resolve(&self, source: &TabularSource, row_index: usize) -> Result<RecipientRecord> {
        if row_index >= source.len() {
            return Err(MailerError::OutOfRange {
                index: row_index,
                len: source.len(),
            });
        }

        let email = Self::cell(source, row_index, &self.config.email_key())?;
        let name = match self.config.name_key() {
            Some(key) => Self::cell(source, row_index, &key)?,
            None => None,
        };

        Ok(RecipientRecord {
            email,
            name,
            other_data: Vec::new(),
        })
    }

    /// Resolve every row by zipping the email column with the name column
    ///
    /// Both columns keep only their present values, so the i-th email pairs
    /// with the i-th name. The email column bounds the result; when the name
    /// column runs short the remaining records have no name.
    pub fn resolve_all(&self, source: &TabularSource) -> Result<Vec<RecipientRecord>> {
        let emails = Self::column_data(source, &self.config.email_key())?;
        let names = match self.config.name_key() {
            Some(key) => Self::column_data(source, &key)?,
            None => Vec::new(),
        };

        let mut names = names.into_iter();
        Ok(emails
            .into_iter()
            .map(|email| RecipientRecord {
                email: Some(email),
                name: names.next(),
                other_data: Vec::new(),
            })
            .collect())
    }

    /// Present values of one column, in row order
    pub fn column_data(source: &TabularSource, column: &ColumnKey) -> Result<Vec<String>> {
        (0..source.len())
            .filter_map(|row| Self::cell(source, row, column).transpose())
            .collect()
    }

    fn cell(source: &TabularSource, row: usize, column: &ColumnKey) -> Result<Option<String>> {
        match (source, column) {
            (TabularSource::Positional(rows), ColumnKey::Index(index)) => {
                Ok(rows[row].get(*index).cloned().flatten())
            }
            (TabularSource::Keyed(rows), ColumnKey::Header(header)) => {
                Ok(rows[row].get(header).cloned())
            }
            (TabularSource::Positional(_), ColumnKey::Header(_)) => Err(MailerError::Resolution(
                format!("cannot look up {} in a source without headers", column),
            )),
            (TabularSource::Keyed(_), ColumnKey::Index(_)) => Err(MailerError::Resolution(
                format!("cannot look up {} in a header-keyed source", column),
            )),
        }
    }
}

//! Reads the first sheet of a workbook or a CSV file into raw cells

use crate::error::{MailerError, Result};
use crate::source::types::{normalize_cell, Cell, Sheet};
use calamine::{open_workbook_auto, Data, Reader};
use std::path::Path;
use tracing::{debug, info};

/// Extensions handled by calamine
const WORKBOOK_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xlsb", "xls", "ods"];

/// Load the first sheet of `path`, picking the parser from the file extension
pub fn load_sheet<P: AsRef<Path>>(path: P) -> Result<Sheet> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_default();

    let sheet = if extension == "csv" {
        read_csv(path)?
    } else if WORKBOOK_EXTENSIONS.contains(&extension.as_str()) {
        read_workbook(path)?
    } else {
        return Err(MailerError::Source(format!(
            "Unsupported source file type: {}",
            path.display()
        )));
    };

    info!("Loaded {} rows from {}", sheet.rows.len(), path.display());
    Ok(sheet)
}

fn read_csv(path: &Path) -> Result<Sheet> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(|e| MailerError::Source(format!("Failed to open {}: {}", path.display(), e)))?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| {
            MailerError::Source(format!("Failed to read {}: {}", path.display(), e))
        })?;
        rows.push(record.iter().map(normalize_cell).collect());
    }

    Ok(Sheet::new(rows))
}

fn read_workbook(path: &Path) -> Result<Sheet> {
    let mut workbook = open_workbook_auto(path).map_err(|e| {
        MailerError::Source(format!("Failed to open workbook {}: {}", path.display(), e))
    })?;

    if let Some(name) = workbook.sheet_names().first() {
        debug!("Reading sheet '{}' of {}", name, path.display());
    }

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| MailerError::Source(format!("No worksheet found in {}", path.display())))?
        .map_err(|e| {
            MailerError::Source(format!("Failed to read worksheet in {}: {}", path.display(), e))
        })?;

    let rows = range
        .rows()
        .map(|row| row.iter().map(cell_text).collect())
        .collect();

    Ok(Sheet::new(rows))
}

fn cell_text(cell: &Data) -> Cell {
    match cell {
        Data::Empty => None,
        Data::String(s) => normalize_cell(s),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn csv_file(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_read_csv_ragged_rows() {
        let file = csv_file("Email,Name\na@x.com,Alice\nb@x.com\n");
        let sheet = load_sheet(file.path()).unwrap();

        assert_eq!(sheet.rows.len(), 3);
        assert_eq!(sheet.rows[0], vec![Some("Email".to_string()), Some("Name".to_string())]);
        assert_eq!(sheet.rows[2], vec![Some("b@x.com".to_string())]);
    }

    #[test]
    fn test_read_csv_blank_cells() {
        let file = csv_file("a@x.com,,Alice\n");
        let sheet = load_sheet(file.path()).unwrap();

        assert_eq!(
            sheet.rows[0],
            vec![Some("a@x.com".to_string()), None, Some("Alice".to_string())]
        );
    }

    #[test]
    fn test_unsupported_extension() {
        let file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        let result = load_sheet(file.path());

        assert!(matches!(result, Err(MailerError::Source(_))));
    }

    #[test]
    fn test_missing_file() {
        let result = load_sheet("/nonexistent/recipients.csv");
        assert!(matches!(result, Err(MailerError::Source(_))));
    }

    #[test]
    fn test_cell_text() {
        assert_eq!(cell_text(&Data::Empty), None);
        assert_eq!(cell_text(&Data::String(String::new())), None);
        assert_eq!(cell_text(&Data::String("Bob".to_string())), Some("Bob".to_string()));
        assert_eq!(cell_text(&Data::Int(42)), Some("42".to_string()));
    }
}

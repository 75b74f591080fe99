//! Tab-separated table I/O.
//!
//! BIDS tables are read with every cell kept as text; interpretation of the
//! columns is left to the caller. `n/a`, `nan` and empty cells are missing
//! values.

use std::path::Path;

use crate::error::{EventsError, EventsResult};

/// Marker written for missing values
pub const MISSING: &str = "n/a";

/// `true` for cells holding no value.
pub fn is_missing(cell: &str) -> bool {
    let cell = cell.trim();
    cell.is_empty() || cell.eq_ignore_ascii_case(MISSING) || cell.eq_ignore_ascii_case("nan")
}

/// Format a number the way event files are usually written (`2.0`, `0.25`).
pub fn format_value(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{:.1}", value)
    } else {
        value.to_string()
    }
}

/// A header row plus text rows of equal width.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TsvTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl TsvTable {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    /// Read a table with a header row.
    pub fn read(path: &Path) -> EventsResult<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_path(path)
            .map_err(|e| EventsError::from_csv(path, e))?;

        let headers = reader
            .headers()
            .map_err(|e| EventsError::from_csv(path, e))?
            .iter()
            .map(str::to_string)
            .collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| EventsError::from_csv(path, e))?;
            rows.push(record.iter().map(str::to_string).collect());
        }

        Ok(Self { headers, rows })
    }

    /// Write the table, optionally without the header row.
    pub fn write(&self, path: &Path, header: bool) -> EventsResult<()> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(b'\t')
            .from_path(path)
            .map_err(|e| EventsError::from_csv(path, e))?;

        if header {
            writer
                .write_record(&self.headers)
                .map_err(|e| EventsError::from_csv(path, e))?;
        }
        for row in &self.rows {
            writer
                .write_record(row)
                .map_err(|e| EventsError::from_csv(path, e))?;
        }
        writer.flush().map_err(|e| EventsError::file_access(path, e))?;
        Ok(())
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Cell value, `None` when missing.
    pub fn cell(&self, row: usize, column: usize) -> Option<&str> {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .map(String::as_str)
            .filter(|c| !is_missing(c))
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Append the rows of `other` below this table.
    ///
    /// Columns are the union of both headers, this table's first; cells a
    /// row has no value for are written as `n/a`.
    pub fn append(&mut self, other: &TsvTable) {
        for header in &other.headers {
            if self.column_index(header).is_none() {
                self.headers.push(header.clone());
                for row in &mut self.rows {
                    row.push(MISSING.to_string());
                }
            }
        }

        for other_row in &other.rows {
            let row = self
                .headers
                .iter()
                .map(|h| {
                    other
                        .column_index(h)
                        .and_then(|i| other_row.get(i))
                        .cloned()
                        .unwrap_or_else(|| MISSING.to_string())
                })
                .collect();
            self.rows.push(row);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_markers() {
        assert!(is_missing("n/a"));
        assert!(is_missing(" N/A "));
        assert!(is_missing(""));
        assert!(is_missing("NaN"));
        assert!(!is_missing("0"));
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(2.0), "2.0");
        assert_eq!(format_value(0.25), "0.25");
        assert_eq!(format_value(-3.0), "-3.0");
    }

    #[test]
    fn test_append_unions_columns() {
        let mut events = TsvTable::new(vec!["onset".into(), "stim_file".into()]);
        events.rows.push(vec!["0.0".into(), "a.wav".into()]);

        let mut features = TsvTable::new(vec!["stim_file".into(), "extractor_value".into()]);
        features.rows.push(vec!["a.wav".into(), "0.7".into()]);

        events.append(&features);
        assert_eq!(events.headers, vec!["onset", "stim_file", "extractor_value"]);
        assert_eq!(events.rows[0], vec!["0.0", "a.wav", "n/a"]);
        assert_eq!(events.rows[1], vec!["n/a", "a.wav", "0.7"]);
    }

    #[test]
    fn test_round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.tsv");
        let mut table = TsvTable::new(vec!["onset".into(), "trial_type".into()]);
        table.rows.push(vec!["1.5".into(), "go".into()]);
        table.write(&path, true).unwrap();

        let back = TsvTable::read(&path).unwrap();
        assert_eq!(back, table);
        assert_eq!(back.cell(0, 1), Some("go"));
    }

    #[test]
    fn test_read_missing_file() {
        let err = TsvTable::read(Path::new("/nonexistent/events.tsv")).unwrap_err();
        assert!(matches!(err, EventsError::FileAccess { .. }));
    }
}

//! BIDS `events.tsv` tables
//!
//! Conditions come from `condition_column` (default `trial_type`) and
//! amplitudes from `amplitude_column` (default `amplitude`). A table without
//! a condition column contributes one binary channel per extra column.

use event_types::{Entities, Event, RunTable, DEFAULT_AMPLITUDE};
use std::path::Path;

use crate::error::{EventsError, EventsResult};
use crate::tsv::TsvTable;

pub const ONSET_COLUMN: &str = "onset";
pub const DURATION_COLUMN: &str = "duration";
pub const TRIAL_TYPE_COLUMN: &str = "trial_type";
pub const AMPLITUDE_COLUMN: &str = "amplitude";

/// Column choices and defaults for reading BIDS tables.
#[derive(Debug, Clone, PartialEq)]
pub struct BidsReadOptions {
    /// Explicit amplitude column; must exist when set
    pub amplitude_column: Option<String>,
    /// Explicit condition column; must exist when set
    pub condition_column: Option<String>,
    pub default_duration: f64,
    pub default_amplitude: f64,
}

impl Default for BidsReadOptions {
    fn default() -> Self {
        Self {
            amplitude_column: None,
            condition_column: None,
            default_duration: 0.0,
            default_amplitude: DEFAULT_AMPLITUDE,
        }
    }
}

struct Cells<'a> {
    table: &'a TsvTable,
    context: String,
}

impl Cells<'_> {
    fn number(&self, row: usize, column: usize) -> EventsResult<Option<f64>> {
        self.table
            .cell(row, column)
            .map(|cell| {
                cell.parse::<f64>().map_err(|_| {
                    EventsError::schema(
                        &self.context,
                        format!(
                            "row {}: column '{}' is not a number: '{}'",
                            row + 1,
                            self.table.headers[column],
                            cell
                        ),
                    )
                })
            })
            .transpose()
    }

    /// Resolve an optional explicit column, falling back to a conventional name.
    fn resolve(&self, explicit: &Option<String>, conventional: &str) -> EventsResult<Option<usize>> {
        match explicit {
            Some(name) => self.table.column_index(name).map(Some).ok_or_else(|| {
                EventsError::schema(&self.context, format!("column '{}' not found", name))
            }),
            None => Ok(self.table.column_index(conventional)),
        }
    }
}

/// Read one BIDS events table into a run table.
pub fn read_bids_events(path: &Path, options: &BidsReadOptions) -> EventsResult<RunTable> {
    let tsv = TsvTable::read(path)?;
    let (entities, _) = path
        .file_name()
        .and_then(|n| n.to_str())
        .map(Entities::parse_filename)
        .unwrap_or_default();

    let mut table = events_from_tsv(&tsv, path.display().to_string(), options)?;
    table.entities = entities;
    Ok(table.with_source(path))
}

/// Interpret an already-parsed table.
pub fn events_from_tsv(
    tsv: &TsvTable,
    context: String,
    options: &BidsReadOptions,
) -> EventsResult<RunTable> {
    let cells = Cells { table: tsv, context };

    let onset_col = tsv.column_index(ONSET_COLUMN).ok_or_else(|| {
        EventsError::schema(&cells.context, "required column 'onset' not found".to_string())
    })?;
    let duration_col = tsv.column_index(DURATION_COLUMN);
    let condition_col = cells.resolve(&options.condition_column, TRIAL_TYPE_COLUMN)?;
    let amplitude_col = cells.resolve(&options.amplitude_column, AMPLITUDE_COLUMN)?;

    let mut table = RunTable::default();

    for row in 0..tsv.len() {
        let onset = cells.number(row, onset_col)?.ok_or_else(|| {
            EventsError::schema(&cells.context, format!("row {}: onset is missing", row + 1))
        })?;
        let duration = match duration_col {
            Some(col) => cells.number(row, col)?.unwrap_or(options.default_duration),
            None => options.default_duration,
        };

        match condition_col {
            Some(col) => {
                // Rows without a condition label carry no event.
                let Some(condition) = tsv.cell(row, col) else {
                    continue;
                };
                let amplitude = match amplitude_col {
                    Some(col) => cells.number(row, col)?.unwrap_or(options.default_amplitude),
                    None => options.default_amplitude,
                };
                table.push(Event::new(onset, duration, condition).with_amplitude(amplitude));
            }
            None => {
                for (col, name) in tsv.headers.iter().enumerate() {
                    if col == onset_col
                        || Some(col) == duration_col
                        || Some(col) == amplitude_col
                    {
                        continue;
                    }
                    if channel_present(tsv.cell(row, col)) {
                        table.push(Event::new(onset, duration, name.clone()));
                    }
                }
            }
        }
    }

    Ok(table)
}

/// A binary channel is active when its cell holds a value that is not a
/// numeric zero.
fn channel_present(cell: Option<&str>) -> bool {
    match cell {
        None => false,
        Some(cell) => cell.parse::<f64>().map_or(true, |v| v != 0.0),
    }
}

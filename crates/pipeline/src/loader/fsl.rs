//! FSL-style event files
//!
//! Whitespace-delimited rows of `onset [duration [amplitude [condition]]]`.
//! Blank lines and `#` comments are skipped.

use event_types::{Entities, Event, RunTable, DEFAULT_AMPLITUDE};
use std::path::Path;

use crate::error::{EventsError, EventsResult};

/// Condition label used when a file has no condition column
pub const DEFAULT_CONDITION: &str = "event";

/// Read one FSL-style file into a run table.
pub fn read_fsl_events(path: &Path, default_duration: f64) -> EventsResult<RunTable> {
    let contents = std::fs::read_to_string(path).map_err(|e| EventsError::file_access(path, e))?;
    let context = path.display().to_string();

    let (entities, _) = path
        .file_name()
        .and_then(|n| n.to_str())
        .map(Entities::parse_filename)
        .unwrap_or_default();
    let mut table = RunTable::new(entities).with_source(path);

    for (line_no, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() > 4 {
            return Err(EventsError::schema(
                &context,
                format!("line {}: expected at most 4 columns, found {}", line_no + 1, fields.len()),
            ));
        }

        let number = |i: usize| -> EventsResult<Option<f64>> {
            fields
                .get(i)
                .map(|f| {
                    f.parse::<f64>().map_err(|_| {
                        EventsError::schema(
                            &context,
                            format!("line {}: column {} is not a number: '{}'", line_no + 1, i + 1, f),
                        )
                    })
                })
                .transpose()
        };

        let onset = number(0)?.ok_or_else(|| {
            EventsError::schema(&context, format!("line {}: missing onset", line_no + 1))
        })?;
        let duration = number(1)?.unwrap_or(default_duration);
        let amplitude = number(2)?.unwrap_or(DEFAULT_AMPLITUDE);
        let condition = fields.get(3).copied().unwrap_or(DEFAULT_CONDITION);

        table.push(Event::new(onset, duration, condition).with_amplitude(amplitude));
    }

    Ok(table)
}

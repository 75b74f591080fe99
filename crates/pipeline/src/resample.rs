//! Dense resampling of event tables onto a fixed `TR` grid.
//!
//! Algorithm:
//!   1. Bins have width `tr` and start at 0; `onset[k] = k * tr`.
//!   2. The grid covers the latest event offset: `n = floor(end / tr) + 1`.
//!   3. Each condition becomes one column, ordered by first appearance.
//!   4. Bin `k` of condition `c` takes the amplitude of an event of `c` with
//!      `onset <= k * tr < onset + duration`, else 0. Later rows overwrite
//!      earlier ones where events of one condition overlap.
//!   5. A zero-duration event occupies the single bin containing its onset.
use event_types::{Column, ResampledRun, RunTable};

use crate::error::{EventsError, EventsResult};

/// Tolerance on `time / tr` ratios so that onsets landing exactly on a bin
/// edge are not lost to floating-point error.
const BIN_EPS: f64 = 1e-9;

/// Check that `tr` can define a grid.
pub fn validate_tr(tr: f64) -> EventsResult<()> {
    if !tr.is_finite() || tr <= 0.0 {
        return Err(EventsError::config(format!(
            "repetition time must be a positive number of seconds, got {}",
            tr
        )));
    }
    Ok(())
}

/// Largest grid a single run may resample to
pub const MAX_BINS: usize = 10_000_000;

/// Reserved name of the time column in resampled output
pub const ONSET_COLUMN: &str = "onset";

/// Number of bins needed to cover an event stream ending at `end` seconds.
///
/// `None` when the grid would exceed [`MAX_BINS`].
pub fn bin_count(end: f64, tr: f64) -> Option<usize> {
    let last = (end / tr + BIN_EPS).floor();
    if !last.is_finite() || last < 0.0 || last >= MAX_BINS as f64 {
        return None;
    }
    (last as usize).checked_add(1)
}

/// Half-open bin range `[start, stop)` covered by an event.
fn bin_range(onset: f64, duration: f64, tr: f64) -> (usize, usize) {
    if duration <= 0.0 {
        let k = (onset / tr + BIN_EPS).floor() as usize;
        return (k, k + 1);
    }
    let start = (onset / tr - BIN_EPS).ceil().max(0.0) as usize;
    let stop = ((onset + duration) / tr - BIN_EPS).ceil().max(0.0) as usize;
    (start, stop)
}

/// Onsets and durations must be finite and non-negative.
pub fn check_times(table: &RunTable) -> EventsResult<()> {
    for (row, event) in table.events.iter().enumerate() {
        let valid = event.onset.is_finite()
            && event.onset >= 0.0
            && event.duration.is_finite()
            && event.duration >= 0.0
            && event.offset().is_finite();
        if !valid {
            return Err(EventsError::schema(
                table.label(),
                format!(
                    "row {}: invalid timing onset={} duration={}",
                    row, event.onset, event.duration
                ),
            ));
        }
    }
    Ok(())
}

/// Resample `table` onto a dense grid with bin width `tr`.
pub fn resample(table: &RunTable, tr: f64) -> EventsResult<ResampledRun> {
    validate_tr(tr)?;
    check_times(table)?;
    if table.events.iter().any(|e| e.condition == ONSET_COLUMN) {
        return Err(EventsError::schema(
            table.label(),
            format!("condition name '{}' is reserved for the time column", ONSET_COLUMN),
        ));
    }

    let Some(end) = table.end() else {
        return Ok(ResampledRun {
            entities: table.entities.clone(),
            tr,
            onset: Vec::new(),
            columns: Vec::new(),
        });
    };

    let n_bins = bin_count(end, tr).ok_or_else(|| {
        EventsError::schema(
            table.label(),
            format!(
                "events ending at {}s need more than {} bins at TR {}s",
                end, MAX_BINS, tr
            ),
        )
    })?;
    let mut columns: Vec<Column> = Vec::new();

    for event in &table.events {
        let idx = match columns.iter().position(|c| c.name == event.condition) {
            Some(idx) => idx,
            None => {
                columns.push(Column {
                    name: event.condition.clone(),
                    values: vec![0.0; n_bins],
                });
                columns.len() - 1
            }
        };
        let (start, stop) = bin_range(event.onset, event.duration, tr);
        for value in &mut columns[idx].values[start.min(n_bins)..stop.min(n_bins)] {
            *value = event.amplitude;
        }
    }

    Ok(ResampledRun {
        entities: table.entities.clone(),
        tr,
        onset: (0..n_bins).map(|k| k as f64 * tr).collect(),
        columns,
    })
}

//! Event source loading
//!
//! Normalizes the three mutually exclusive input modes into one
//! [`RunTable`] per run, in the order the inputs were supplied.

pub mod bids;
pub mod bunch;
pub mod fsl;

pub use bids::{read_bids_events, BidsReadOptions};
pub use bunch::from_record;
pub use fsl::{read_fsl_events, DEFAULT_CONDITION};

use event_types::{RunRecord, RunTable, DEFAULT_AMPLITUDE};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info};

use crate::error::EventsResult;

/// The selected input mode and its inputs.
#[derive(Debug, Clone, PartialEq)]
pub enum EventInput {
    /// In-memory condition records, one per run
    Bunches(Vec<RunRecord>),
    /// FSL-style files of 1 to 4 columns, one per run
    Files(Vec<PathBuf>),
    /// BIDS `events.tsv` tables, one per run
    Bids(Vec<PathBuf>),
}

impl EventInput {
    pub fn mode(&self) -> &'static str {
        match self {
            EventInput::Bunches(_) => "subject_info",
            EventInput::Files(_) => "event_files",
            EventInput::Bids(_) => "bids_events",
        }
    }

    /// Number of runs this input describes
    pub fn len(&self) -> usize {
        match self {
            EventInput::Bunches(records) => records.len(),
            EventInput::Files(paths) | EventInput::Bids(paths) => paths.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Units of onsets and durations in the source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputUnits {
    #[default]
    Secs,
    Scans,
}

/// Defaults and column choices applied while loading.
#[derive(Debug, Clone, PartialEq)]
pub struct LoaderOptions {
    pub default_duration: f64,
    pub default_amplitude: f64,
    pub amplitude_column: Option<String>,
    pub condition_column: Option<String>,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self {
            default_duration: 0.0,
            default_amplitude: DEFAULT_AMPLITUDE,
            amplitude_column: None,
            condition_column: None,
        }
    }
}

impl LoaderOptions {
    fn bids(&self) -> BidsReadOptions {
        BidsReadOptions {
            amplitude_column: self.amplitude_column.clone(),
            condition_column: self.condition_column.clone(),
            default_duration: self.default_duration,
            default_amplitude: self.default_amplitude,
        }
    }
}

/// Load every run of `input`, preserving input order.
pub fn load(input: &EventInput, options: &LoaderOptions) -> EventsResult<Vec<RunTable>> {
    info!("Loading {} run(s) from {}", input.len(), input.mode());

    let runs = match input {
        EventInput::Bunches(records) => records
            .iter()
            .enumerate()
            .map(|(i, record)| from_record(record, i))
            .collect::<EventsResult<Vec<_>>>()?,
        EventInput::Files(paths) => paths
            .iter()
            .map(|path| read_fsl_events(path, options.default_duration))
            .collect::<EventsResult<Vec<_>>>()?,
        EventInput::Bids(paths) => {
            let bids = options.bids();
            paths
                .iter()
                .map(|path| read_bids_events(path, &bids))
                .collect::<EventsResult<Vec<_>>>()?
        }
    };

    for run in &runs {
        debug!("Loaded {}: {} events", run.label(), run.len());
    }
    Ok(runs)
}

/// Convert onsets and durations given in scans into seconds.
pub fn to_seconds(table: RunTable, units: InputUnits, tr: f64) -> RunTable {
    match units {
        InputUnits::Secs => table,
        InputUnits::Scans => {
            let events = table
                .events
                .iter()
                .map(|e| {
                    let mut e = e.clone();
                    e.onset *= tr;
                    e.duration *= tr;
                    e
                })
                .collect();
            table.with_events(events)
        }
    }
}

//! Front-door configuration types and serialization
//!
//! Each configuration is a plain serde document that can be read from JSON
//! or YAML. Mutually exclusive options are checked by `validate()` before
//! any file is opened.

use event_types::{RunRecord, DEFAULT_AMPLITUDE};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{EventsError, EventsResult};
use crate::layout::Filters;
use crate::loader::{BidsReadOptions, EventInput, InputUnits, LoaderOptions};
use crate::resample::validate_tr;
use crate::transform::TransformSource;

/// Default output directory of the collection writer and augmenter
pub const DEFAULT_OUTPUT_DIR: &str = "new_events";

fn default_amplitude() -> f64 {
    DEFAULT_AMPLITUDE
}

fn default_header() -> bool {
    true
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT_DIR)
}

fn validate_duration(default_duration: f64) -> EventsResult<()> {
    if !default_duration.is_finite() || default_duration < 0.0 {
        return Err(EventsError::config(format!(
            "default_duration must be a non-negative number, got {}",
            default_duration
        )));
    }
    Ok(())
}

/// A configuration document loadable from JSON or YAML.
pub trait ConfigDocument: DeserializeOwned + Serialize {
    /// Check option combinations and values.
    fn validate(&self) -> EventsResult<()>;

    fn from_json(json: &str) -> EventsResult<Self> {
        serde_json::from_str(json).map_err(|e| EventsError::config(e.to_string()))
    }

    fn from_yaml(yaml: &str) -> EventsResult<Self> {
        serde_yaml::from_str(yaml).map_err(|e| EventsError::config(e.to_string()))
    }

    fn to_json(&self) -> EventsResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Read a `.json`, `.yaml` or `.yml` file.
    fn from_path(path: &Path) -> EventsResult<Self> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| EventsError::file_access(path, e))?;
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        let parsed = match extension.as_deref() {
            Some("json") => Self::from_json(&contents),
            Some("yaml") | Some("yml") => Self::from_yaml(&contents),
            _ => {
                return Err(EventsError::config(format!(
                    "unsupported configuration format: {}",
                    path.display()
                )))
            }
        };
        parsed.map_err(|e| match e {
            EventsError::Configuration { message } => {
                EventsError::config(format!("{}: {}", path.display(), message))
            }
            other => other,
        })
    }
}

/// Configuration of the SpecifyEvents front door.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SpecifyEventsConfig {
    /// In-memory condition records, one per run
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject_info: Option<Vec<RunRecord>>,
    /// FSL-style event files, one per run
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_files: Option<Vec<PathBuf>>,
    /// BIDS `events.tsv` tables, one per run
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bids_events: Option<Vec<PathBuf>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amplitude_column: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition_column: Option<String>,
    #[serde(default)]
    pub input_units: InputUnits,
    /// Bin width of the output grid, seconds
    pub time_repetition: f64,
    #[serde(default)]
    pub default_duration: f64,
    #[serde(default = "default_amplitude")]
    pub default_amplitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transformations: Option<TransformSource>,
}

impl SpecifyEventsConfig {
    pub fn new(input: EventInput, time_repetition: f64) -> Self {
        let mut config = Self {
            subject_info: None,
            event_files: None,
            bids_events: None,
            amplitude_column: None,
            condition_column: None,
            input_units: InputUnits::default(),
            time_repetition,
            default_duration: 0.0,
            default_amplitude: DEFAULT_AMPLITUDE,
            transformations: None,
        };
        match input {
            EventInput::Bunches(records) => config.subject_info = Some(records),
            EventInput::Files(paths) => config.event_files = Some(paths),
            EventInput::Bids(paths) => config.bids_events = Some(paths),
        }
        config
    }

    pub fn with_transformations(mut self, source: impl Into<TransformSource>) -> Self {
        self.transformations = Some(source.into());
        self
    }

    fn selected_modes(&self) -> Vec<&'static str> {
        let mut modes = Vec::new();
        if self.subject_info.is_some() {
            modes.push("subject_info");
        }
        if self.event_files.is_some() {
            modes.push("event_files");
        }
        if self.bids_events.is_some() {
            modes.push("bids_events");
        }
        modes
    }

    /// The selected input mode. Call after [`ConfigDocument::validate`].
    pub fn to_input(&self) -> EventsResult<EventInput> {
        match (&self.subject_info, &self.event_files, &self.bids_events) {
            (Some(records), None, None) => Ok(EventInput::Bunches(records.clone())),
            (None, Some(paths), None) => Ok(EventInput::Files(paths.clone())),
            (None, None, Some(paths)) => Ok(EventInput::Bids(paths.clone())),
            _ => Err(EventsError::config(
                "exactly one of subject_info, event_files or bids_events must be set",
            )),
        }
    }

    pub fn loader_options(&self) -> LoaderOptions {
        LoaderOptions {
            default_duration: self.default_duration,
            default_amplitude: self.default_amplitude,
            amplitude_column: self.amplitude_column.clone(),
            condition_column: self.condition_column.clone(),
        }
    }
}

impl ConfigDocument for SpecifyEventsConfig {
    fn validate(&self) -> EventsResult<()> {
        let modes = self.selected_modes();
        if modes.len() != 1 {
            return Err(EventsError::config(format!(
                "exactly one of subject_info, event_files or bids_events must be set, found {}",
                if modes.is_empty() {
                    "none".to_string()
                } else {
                    modes.join(", ")
                }
            )));
        }
        if self.bids_events.is_none() {
            for (option, value) in [
                ("amplitude_column", &self.amplitude_column),
                ("condition_column", &self.condition_column),
            ] {
                if value.is_some() {
                    return Err(EventsError::config(format!(
                        "{} requires bids_events",
                        option
                    )));
                }
            }
        }
        validate_tr(self.time_repetition)?;
        validate_duration(self.default_duration)
    }
}

/// Configuration of the TransformEvents front door.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TransformEventsConfig {
    /// BIDS project root
    pub base_dir: PathBuf,
    /// Alternative directory searched for event files instead of `base_dir`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files_directory: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filters: Option<Filters>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transformation_spec: Option<TransformSource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amplitude_column: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition_column: Option<String>,
    #[serde(default)]
    pub default_duration: f64,
    #[serde(default = "default_amplitude")]
    pub default_amplitude: f64,
    pub time_repetition: f64,
    /// Condition columns to write; all when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub columns: Option<Vec<String>>,
    #[serde(default = "default_header")]
    pub header: bool,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

impl TransformEventsConfig {
    pub fn new(base_dir: impl Into<PathBuf>, time_repetition: f64) -> Self {
        Self {
            base_dir: base_dir.into(),
            files_directory: None,
            filters: None,
            transformation_spec: None,
            amplitude_column: None,
            condition_column: None,
            default_duration: 0.0,
            default_amplitude: DEFAULT_AMPLITUDE,
            time_repetition,
            columns: None,
            header: true,
            output_dir: default_output_dir(),
        }
    }

    /// Directory searched for `*_events.tsv` files.
    pub fn search_root(&self) -> &Path {
        self.files_directory.as_deref().unwrap_or(&self.base_dir)
    }

    pub fn filters(&self) -> Filters {
        self.filters.clone().unwrap_or_default()
    }

    pub fn read_options(&self) -> BidsReadOptions {
        BidsReadOptions {
            amplitude_column: self.amplitude_column.clone(),
            condition_column: self.condition_column.clone(),
            default_duration: self.default_duration,
            default_amplitude: self.default_amplitude,
        }
    }
}

impl ConfigDocument for TransformEventsConfig {
    fn validate(&self) -> EventsResult<()> {
        if self.files_directory.is_some() && self.filters.is_some() {
            return Err(EventsError::config(
                "filters and files_directory are mutually exclusive",
            ));
        }
        validate_tr(self.time_repetition)?;
        validate_duration(self.default_duration)?;

        if !self.base_dir.is_dir() {
            return Err(EventsError::not_found(&self.base_dir));
        }
        if let Some(dir) = &self.files_directory {
            if !dir.is_dir() {
                return Err(EventsError::not_found(dir));
            }
        }
        Ok(())
    }
}

/// Configuration of the FeatureAugment front door.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AugmentConfig {
    /// Feature graph specification (JSON)
    pub graph_spec: PathBuf,
    /// BIDS events tables to augment
    pub events_files: Vec<PathBuf>,
    /// BIDS project root; stimuli live under `<bids_dir>/stimuli`
    pub bids_dir: PathBuf,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

impl AugmentConfig {
    pub fn stimuli_dir(&self) -> PathBuf {
        self.bids_dir.join("stimuli")
    }
}

impl ConfigDocument for AugmentConfig {
    fn validate(&self) -> EventsResult<()> {
        if !self.graph_spec.is_file() {
            return Err(EventsError::not_found(&self.graph_spec));
        }
        if !self.bids_dir.is_dir() {
            return Err(EventsError::not_found(&self.bids_dir));
        }
        if let Some(missing) = self.events_files.iter().find(|path| !path.is_file()) {
            return Err(EventsError::not_found(missing));
        }
        Ok(())
    }
}

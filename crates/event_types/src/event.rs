//! Event rows, run tables and run identity
//!
//! A [`RunTable`] holds every event of one scanning run in row form. Tables
//! are produced by the loaders and replaced wholesale by each transform step;
//! nothing downstream mutates a table it did not create.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Amplitude assigned to events whose source does not carry one.
pub const DEFAULT_AMPLITUDE: f64 = 1.0;

/// A single event of one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Start time in seconds
    pub onset: f64,
    /// Length in seconds
    pub duration: f64,
    /// Experimental category label
    pub condition: String,
    /// Event intensity
    pub amplitude: f64,
}

impl Event {
    /// Create an event with the default amplitude.
    pub fn new(onset: f64, duration: f64, condition: impl Into<String>) -> Self {
        Self {
            onset,
            duration,
            condition: condition.into(),
            amplitude: DEFAULT_AMPLITUDE,
        }
    }

    /// Set the event amplitude
    pub fn with_amplitude(mut self, amplitude: f64) -> Self {
        self.amplitude = amplitude;
        self
    }

    /// End of the event in seconds.
    pub fn offset(&self) -> f64 {
        self.onset + self.duration
    }
}

/// BIDS entities identifying a run, in file-name order.
///
/// `sub-01_task-rest_run-2_events.tsv` parses to
/// `[("sub", "01"), ("task", "rest"), ("run", "2")]` with suffix `events`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entities(Vec<(String, String)>);

impl Entities {
    /// Create an empty entity set
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the entities and the suffix out of a BIDS file name.
    ///
    /// Everything after the first `.` is treated as the extension. The last
    /// underscore-separated part without a `-` is the suffix.
    pub fn parse_filename(file_name: &str) -> (Self, Option<String>) {
        let stem = file_name.split('.').next().unwrap_or_default();
        let mut entities = Self::new();
        let mut suffix = None;

        for part in stem.split('_').filter(|p| !p.is_empty()) {
            match part.split_once('-') {
                Some((key, value)) if !key.is_empty() => entities.insert(key, value),
                _ => suffix = Some(part.to_string()),
            }
        }

        (entities, suffix)
    }

    /// Insert an entity, replacing the value of an existing key in place.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.0.push((key, value)),
        }
    }

    /// Look up an entity value by key
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Build a file name such as `sub-01_run-2_events.tsv`.
    pub fn file_name(&self, suffix: &str, extension: &str) -> String {
        if self.is_empty() {
            format!("{}.{}", suffix, extension)
        } else {
            format!("{}_{}.{}", self, suffix, extension)
        }
    }
}

impl fmt::Display for Entities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (key, value)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("_")?;
            }
            write!(f, "{}-{}", key, value)?;
        }
        Ok(())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Entities {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut entities = Self::new();
        for (key, value) in iter {
            entities.insert(key, value);
        }
        entities
    }
}

/// All events of one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunTable {
    /// Identity of the run; empty for in-memory sources
    pub entities: Entities,
    /// File the events were read from, if any
    pub source: Option<PathBuf>,
    /// Event rows in source order
    pub events: Vec<Event>,
}

impl RunTable {
    pub fn new(entities: Entities) -> Self {
        Self {
            entities,
            source: None,
            events: Vec::new(),
        }
    }

    /// Builder-style constructor from a list of events
    pub fn from_events(events: Vec<Event>) -> Self {
        Self {
            events,
            ..Self::default()
        }
    }

    pub fn with_source(mut self, source: impl AsRef<Path>) -> Self {
        self.source = Some(source.as_ref().to_path_buf());
        self
    }

    pub fn push(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Distinct condition labels in order of first appearance.
    pub fn conditions(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for event in &self.events {
            if !seen.contains(&event.condition.as_str()) {
                seen.push(&event.condition);
            }
        }
        seen
    }

    /// Latest event offset, or `None` for an empty table.
    pub fn end(&self) -> Option<f64> {
        self.events.iter().map(Event::offset).reduce(f64::max)
    }

    /// Replace the events, keeping the run identity.
    pub fn with_events(&self, events: Vec<Event>) -> Self {
        Self {
            entities: self.entities.clone(),
            source: self.source.clone(),
            events,
        }
    }

    /// Human-readable run label used in logs and error messages.
    pub fn label(&self) -> String {
        if !self.entities.is_empty() {
            return self.entities.to_string();
        }
        match &self.source {
            Some(path) => path.display().to_string(),
            None => "<in-memory run>".to_string(),
        }
    }
}

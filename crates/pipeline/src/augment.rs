//! Appending extracted stimulus features to BIDS events tables

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs::create_dir_all;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::capability::{Capabilities, Capability};
use crate::config::{AugmentConfig, ConfigDocument};
use crate::error::{EventsError, EventsResult};
use crate::loader::bids::{DURATION_COLUMN, ONSET_COLUMN};
use crate::tsv::{format_value, TsvTable, MISSING};

/// Column naming the stimulus file of an event
pub const STIM_FILE_COLUMN: &str = "stim_file";
pub const FEATURE_COLUMN: &str = "extractor_feature";
pub const VALUE_COLUMN: &str = "extractor_value";

/// A stimulus presented during a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stimulus {
    /// Absolute location under the stimuli directory
    pub path: PathBuf,
    /// The `stim_file` value as written in the events table
    pub name: String,
    pub onset: f64,
    pub duration: f64,
}

/// One extracted value in long form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRecord {
    pub stim: String,
    pub feature: String,
    pub value: Value,
    pub onset: f64,
    pub duration: f64,
}

impl FeatureRecord {
    fn value_cell(&self) -> String {
        match &self.value {
            Value::Null => MISSING.to_string(),
            Value::String(s) => s.clone(),
            Value::Number(n) => n.as_f64().map_or_else(|| n.to_string(), format_value),
            other => other.to_string(),
        }
    }
}

/// External feature-extraction graph.
pub trait FeatureGraph: Send + Sync {
    fn run(&self, spec: &Value, stimuli: &[Stimulus]) -> EventsResult<Vec<FeatureRecord>>;
}

/// Runs a feature graph over the stimuli of each events table and appends
/// the results as extra rows.
pub struct FeatureAugmenter {
    config: AugmentConfig,
    graph: Option<Box<dyn FeatureGraph>>,
}

impl FeatureAugmenter {
    pub fn new(config: AugmentConfig, graph: Option<Box<dyn FeatureGraph>>) -> EventsResult<Self> {
        let capabilities = Capabilities {
            event_reader: true,
            transform_engine: false,
            feature_graph: graph.is_some(),
        };
        capabilities.require(&[Capability::EventReader, Capability::FeatureGraph])?;
        config.validate()?;
        Ok(Self { config, graph })
    }

    /// Stimuli referenced by the rows of `table`.
    pub fn stimuli(&self, table: &TsvTable, context: &str) -> EventsResult<Vec<Stimulus>> {
        let Some(stim_col) = table.column_index(STIM_FILE_COLUMN) else {
            return Ok(Vec::new());
        };
        let onset_col = table.column_index(ONSET_COLUMN);
        let duration_col = table.column_index(DURATION_COLUMN);
        let stimuli_dir = self.config.stimuli_dir();

        let number = |row: usize, col: Option<usize>, name: &str| -> EventsResult<f64> {
            col.and_then(|c| table.cell(row, c))
                .map(|cell| {
                    cell.parse::<f64>().map_err(|_| {
                        EventsError::schema(
                            context,
                            format!("row {}: column '{}' is not a number: '{}'", row + 1, name, cell),
                        )
                    })
                })
                .unwrap_or(Ok(0.0))
        };

        let mut stimuli = Vec::new();
        for row in 0..table.len() {
            let Some(name) = table.cell(row, stim_col) else {
                continue;
            };
            let path = stimuli_dir.join(name);
            if !path.exists() {
                return Err(EventsError::not_found(&path));
            }
            stimuli.push(Stimulus {
                path,
                name: name.to_string(),
                onset: number(row, onset_col, ONSET_COLUMN)?,
                duration: number(row, duration_col, DURATION_COLUMN)?,
            });
        }
        Ok(stimuli)
    }

    fn feature_rows(records: &[FeatureRecord]) -> TsvTable {
        let mut table = TsvTable::new(
            [ONSET_COLUMN, DURATION_COLUMN, STIM_FILE_COLUMN, FEATURE_COLUMN, VALUE_COLUMN]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        );
        table.rows = records
            .iter()
            .map(|r| {
                vec![
                    format_value(r.onset),
                    format_value(r.duration),
                    r.stim.clone(),
                    r.feature.clone(),
                    r.value_cell(),
                ]
            })
            .collect();
        table
    }

    /// Augment one events file, returning the path written.
    pub fn augment_file(&self, spec: &Value, events_file: &Path) -> EventsResult<PathBuf> {
        let graph = self.graph.as_ref().ok_or_else(|| EventsError::DependencyMissing {
            name: Capability::FeatureGraph.name().to_string(),
        })?;

        let mut table = TsvTable::read(events_file)?;
        let stimuli = self.stimuli(&table, &events_file.display().to_string())?;
        let records = graph.run(spec, &stimuli)?;
        debug!(
            "{}: {} stimuli, {} feature values",
            events_file.display(),
            stimuli.len(),
            records.len()
        );
        table.append(&Self::feature_rows(&records));

        let file_name = events_file
            .file_name()
            .ok_or_else(|| EventsError::config(format!("not a file: {}", events_file.display())))?;
        let output = self.config.output_dir.join(file_name);
        table.write(&output, true)?;
        Ok(output)
    }

    pub fn run(&self) -> EventsResult<Vec<PathBuf>> {
        let graph_spec = &self.config.graph_spec;
        let contents = std::fs::read_to_string(graph_spec)
            .map_err(|e| EventsError::file_access(graph_spec, e))?;
        let spec: Value = serde_json::from_str(&contents)?;

        let output_dir = &self.config.output_dir;
        if !output_dir.exists() {
            create_dir_all(output_dir).map_err(|e| EventsError::file_access(output_dir, e))?;
        }

        let written = self
            .config
            .events_files
            .iter()
            .map(|file| self.augment_file(&spec, file))
            .collect::<EventsResult<Vec<_>>>()?;
        info!("Augmented {} events file(s)", written.len());
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Reports the duration of every stimulus as its only feature.
    struct DurationGraph;

    impl FeatureGraph for DurationGraph {
        fn run(&self, _spec: &Value, stimuli: &[Stimulus]) -> EventsResult<Vec<FeatureRecord>> {
            Ok(stimuli
                .iter()
                .map(|s| FeatureRecord {
                    stim: s.name.clone(),
                    feature: "length".into(),
                    value: Value::from(s.duration),
                    onset: s.onset,
                    duration: s.duration,
                })
                .collect())
        }
    }

    fn setup(dir: &Path) -> AugmentConfig {
        std::fs::create_dir_all(dir.join("stimuli")).unwrap();
        std::fs::write(dir.join("stimuli").join("face.png"), b"").unwrap();
        std::fs::write(dir.join("graph.json"), r#"{"extractors": ["length"]}"#).unwrap();
        std::fs::write(
            dir.join("sub-01_task-faces_events.tsv"),
            "onset\tduration\tstim_file\n0\t2\tface.png\n4\t1\tn/a\n",
        )
        .unwrap();
        AugmentConfig {
            graph_spec: dir.join("graph.json"),
            events_files: vec![dir.join("sub-01_task-faces_events.tsv")],
            bids_dir: dir.to_path_buf(),
            output_dir: dir.join("out"),
        }
    }

    #[test]
    fn test_appends_feature_rows() {
        let dir = tempfile::tempdir().unwrap();
        let augmenter = FeatureAugmenter::new(setup(dir.path()), Some(Box::new(DurationGraph))).unwrap();
        let written = augmenter.run().unwrap();
        assert_eq!(written, vec![dir.path().join("out").join("sub-01_task-faces_events.tsv")]);

        let text = std::fs::read_to_string(&written[0]).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "onset\tduration\tstim_file\textractor_feature\textractor_value");
        assert_eq!(lines[1], "0\t2\tface.png\tn/a\tn/a");
        assert_eq!(lines[2], "4\t1\tn/a\tn/a\tn/a");
        assert_eq!(lines[3], "0.0\t2.0\tface.png\tlength\t2.0");
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn test_missing_graph() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            FeatureAugmenter::new(setup(dir.path()), None),
            Err(EventsError::DependencyMissing { .. })
        ));
    }

    #[test]
    fn test_missing_stimulus_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = setup(dir.path());
        std::fs::remove_file(dir.path().join("stimuli").join("face.png")).unwrap();
        let augmenter = FeatureAugmenter::new(config, Some(Box::new(DurationGraph))).unwrap();
        assert!(matches!(augmenter.run(), Err(EventsError::FileAccess { .. })));
    }
}

//! TransformEvents: a BIDS collection in, dense event files out

use std::collections::HashSet;
use std::path::PathBuf;
use tracing::{info, warn};

use crate::capability::{Capabilities, Capability};
use crate::config::{ConfigDocument, TransformEventsConfig};
use crate::error::{EventsError, EventsResult};
use crate::layout::{BidsLayout, EventReader};
use crate::resample::resample;
use crate::sink::EventFileWriter;
use crate::transform::{TransformChain, TransformRegistry};

/// A run that could not be processed.
#[derive(Debug)]
pub struct RunFailure {
    pub run: String,
    pub error: EventsError,
}

/// Outcome of writing a collection.
#[derive(Debug, Default)]
pub struct WriteReport {
    /// Files written, in run order
    pub written: Vec<PathBuf>,
    pub failures: Vec<RunFailure>,
}

impl WriteReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Reads a BIDS collection, applies a specification and writes one dense
/// events file per run.
pub struct TransformEvents {
    config: TransformEventsConfig,
    reader: Option<Box<dyn EventReader>>,
    registry: Option<TransformRegistry>,
}

impl TransformEvents {
    /// Validated front door with the built-in reader and transforms.
    pub fn new(config: TransformEventsConfig) -> EventsResult<Self> {
        let reader: Box<dyn EventReader> = Box::new(BidsLayout::new(config.read_options()));
        Self::with_collaborators(config, Some(reader), Some(TransformRegistry::with_builtins()))
    }

    pub fn with_collaborators(
        config: TransformEventsConfig,
        reader: Option<Box<dyn EventReader>>,
        registry: Option<TransformRegistry>,
    ) -> EventsResult<Self> {
        config.validate()?;

        let capabilities = Capabilities {
            event_reader: reader.is_some(),
            transform_engine: registry.is_some(),
            feature_graph: false,
        };
        let mut needed = vec![Capability::EventReader];
        if config.transformation_spec.is_some() {
            needed.push(Capability::TransformEngine);
        }
        capabilities.require(&needed)?;

        Ok(Self {
            config,
            reader,
            registry,
        })
    }

    pub fn config(&self) -> &TransformEventsConfig {
        &self.config
    }

    fn chain(&self) -> EventsResult<TransformChain> {
        match (&self.config.transformation_spec, &self.registry) {
            (Some(source), Some(registry)) => registry.compile(&source.load()?),
            _ => Ok(TransformChain::identity()),
        }
    }

    /// Process every run; failures of single runs are reported, not raised.
    pub fn run(&self) -> EventsResult<WriteReport> {
        let chain = self.chain()?;
        let reader = self.reader.as_ref().ok_or_else(|| EventsError::DependencyMissing {
            name: Capability::EventReader.name().to_string(),
        })?;

        let runs = reader.read(self.config.search_root(), &self.config.filters())?;
        let writer = EventFileWriter::new(&self.config.output_dir)?
            .with_header(self.config.header)
            .with_columns(self.config.columns.clone());

        let mut report = WriteReport::default();
        let mut file_names = HashSet::new();
        for (index, run) in runs.iter().enumerate() {
            let result = chain
                .apply(run)
                .and_then(|table| resample(&table, self.config.time_repetition))
                .and_then(|resampled| {
                    let file_name = EventFileWriter::file_name(&resampled, index);
                    if !file_names.insert(file_name.clone()) {
                        return Err(EventsError::schema(
                            run.label(),
                            format!("{} was already written by an earlier run", file_name),
                        ));
                    }
                    writer.write(&resampled, index)
                });
            match result {
                Ok(path) => report.written.push(path),
                Err(error) => {
                    warn!("Skipping {}: {}", run.label(), error);
                    report.failures.push(RunFailure {
                        run: run.label(),
                        error,
                    });
                }
            }
        }

        info!(
            "Wrote {} event file(s) to {} ({} failed)",
            report.written.len(),
            writer.dir().display(),
            report.failures.len()
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Filters;
    use event_types::{Entities, Event, RunTable};
    use std::fs;
    use std::path::Path;

    struct FixedReader(Vec<RunTable>);

    impl EventReader for FixedReader {
        fn read(&self, _source: &Path, _filters: &Filters) -> EventsResult<Vec<RunTable>> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn test_failed_run_does_not_stop_others() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = TransformEventsConfig::new(dir.path(), 1.0);
        config.output_dir = dir.path().join("out");

        let good = RunTable::new(Entities::from_iter([("sub", "01")]))
            .with_events(vec![Event::new(0.0, 1.0, "a")]);
        let bad = RunTable::new(Entities::from_iter([("sub", "02")]))
            .with_events(vec![Event::new(-1.0, 1.0, "a")]);
        let also_good = RunTable::new(Entities::from_iter([("sub", "03")]))
            .with_events(vec![Event::new(1.0, 1.0, "b")]);
        let reader: Box<dyn EventReader> = Box::new(FixedReader(vec![good, bad, also_good]));

        let report = TransformEvents::with_collaborators(config, Some(reader), None)
            .unwrap()
            .run()
            .unwrap();
        assert_eq!(report.written.len(), 2);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].run, "sub-02");
        assert!(!report.is_complete());
        assert!(dir.path().join("out").join("sub-03_events.tsv").exists());
    }

    #[test]
    fn test_duplicate_output_name_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = TransformEventsConfig::new(dir.path(), 1.0);
        config.output_dir = dir.path().join("out");

        let entities = Entities::from_iter([("sub", "01"), ("task", "rest")]);
        let first = RunTable::new(entities.clone()).with_events(vec![Event::new(0.0, 1.0, "a")]);
        let second = RunTable::new(entities).with_events(vec![Event::new(0.0, 1.0, "b")]);
        let reader: Box<dyn EventReader> = Box::new(FixedReader(vec![first, second]));

        let report = TransformEvents::with_collaborators(config, Some(reader), None)
            .unwrap()
            .run()
            .unwrap();
        assert_eq!(report.written.len(), 1);
        assert_eq!(report.failures.len(), 1);
        assert!(matches!(report.failures[0].error, EventsError::Schema { .. }));

        let text = fs::read_to_string(&report.written[0]).unwrap();
        assert!(text.starts_with("onset\ta\n"));
    }

    #[test]
    fn test_condition_named_onset_fails_its_run() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = TransformEventsConfig::new(dir.path(), 1.0);
        config.output_dir = dir.path().join("out");

        let bad = RunTable::new(Entities::from_iter([("sub", "01")]))
            .with_events(vec![Event::new(0.0, 2.0, "onset"), Event::new(1.0, 1.0, "b")]);
        let reader: Box<dyn EventReader> = Box::new(FixedReader(vec![bad]));

        let report = TransformEvents::with_collaborators(config, Some(reader), None)
            .unwrap()
            .run()
            .unwrap();
        assert!(report.written.is_empty());
        assert_eq!(report.failures[0].run, "sub-01");
        assert!(!dir.path().join("out").join("sub-01_events.tsv").exists());
    }

    #[test]
    fn test_missing_reader() {
        let dir = tempfile::tempdir().unwrap();
        let config = TransformEventsConfig::new(dir.path(), 1.0);
        assert!(matches!(
            TransformEvents::with_collaborators(config, None, None),
            Err(EventsError::DependencyMissing { .. })
        ));
    }
}

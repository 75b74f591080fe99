//! SpecifyEvents: events in, condition bunches out

use event_types::{ConditionBunch, ResampledRun};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::capability::{Capabilities, Capability};
use crate::config::{ConfigDocument, SpecifyEventsConfig};
use crate::error::EventsResult;
use crate::loader::{load, to_seconds};
use crate::resample::resample;
use crate::reshape::{summarize, to_bunch};
use crate::transform::{TransformChain, TransformRegistry};

/// Result of one SpecifyEvents invocation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpecifyOutput {
    /// One bunch per run, in input order
    pub subject_info: Vec<ConditionBunch>,
    /// Diagnostic dump of the resampled runs
    pub str_info: String,
}

/// Loads, transforms, resamples and reshapes the configured runs.
pub struct SpecifyEvents {
    config: SpecifyEventsConfig,
    registry: Option<TransformRegistry>,
}

impl SpecifyEvents {
    /// Validated front door using the built-in transforms.
    pub fn new(config: SpecifyEventsConfig) -> EventsResult<Self> {
        Self::with_registry(config, Some(TransformRegistry::with_builtins()))
    }

    /// Validated front door with an explicit transform engine, or none.
    pub fn with_registry(
        config: SpecifyEventsConfig,
        registry: Option<TransformRegistry>,
    ) -> EventsResult<Self> {
        config.validate()?;

        let capabilities = Capabilities {
            event_reader: true,
            transform_engine: registry.is_some(),
            feature_graph: false,
        };
        let mut needed = vec![Capability::EventReader];
        if config.transformations.is_some() {
            needed.push(Capability::TransformEngine);
        }
        capabilities.require(&needed)?;

        Ok(Self { config, registry })
    }

    pub fn config(&self) -> &SpecifyEventsConfig {
        &self.config
    }

    fn chain(&self) -> EventsResult<TransformChain> {
        match (&self.config.transformations, &self.registry) {
            (Some(source), Some(registry)) => registry.compile(&source.load()?),
            _ => Ok(TransformChain::identity()),
        }
    }

    /// Resampled runs before reshaping.
    pub fn resampled(&self) -> EventsResult<Vec<ResampledRun>> {
        let tr = self.config.time_repetition;
        // Resolve every step before any table is read.
        let chain = self.chain()?;
        let input = self.config.to_input()?;
        let runs = load(&input, &self.config.loader_options())?;

        runs.into_iter()
            .map(|run| {
                let run = to_seconds(run, self.config.input_units, tr);
                let run = chain.apply(&run)?;
                let resampled = resample(&run, tr)?;
                debug!(
                    "Resampled {} into {} bins x {} conditions",
                    run.label(),
                    resampled.n_bins(),
                    resampled.columns.len()
                );
                Ok(resampled)
            })
            .collect()
    }

    pub fn run(&self) -> EventsResult<SpecifyOutput> {
        let resampled = self.resampled()?;
        let output = SpecifyOutput {
            subject_info: resampled.iter().map(to_bunch).collect(),
            str_info: summarize(&resampled),
        };
        info!("Specified {} run(s)", output.subject_info.len());
        Ok(output)
    }
}

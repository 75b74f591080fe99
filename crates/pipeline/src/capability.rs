//! Collaborator availability checks

use std::fmt;

use crate::error::{EventsError, EventsResult};

/// An external collaborator a front door may depend on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Parses event files and BIDS layouts
    EventReader,
    /// Resolves and applies transformation specifications
    TransformEngine,
    /// Runs stimulus feature extraction
    FeatureGraph,
}

impl Capability {
    pub fn name(&self) -> &'static str {
        match self {
            Capability::EventReader => "event reader",
            Capability::TransformEngine => "transform engine",
            Capability::FeatureGraph => "feature graph",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The set of collaborators available to a front door.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Capabilities {
    pub event_reader: bool,
    pub transform_engine: bool,
    pub feature_graph: bool,
}

impl Capabilities {
    pub fn has(&self, capability: Capability) -> bool {
        match capability {
            Capability::EventReader => self.event_reader,
            Capability::TransformEngine => self.transform_engine,
            Capability::FeatureGraph => self.feature_graph,
        }
    }

    /// Fail with the first capability in `needed` that is not available.
    pub fn require(&self, needed: &[Capability]) -> EventsResult<()> {
        match needed.iter().find(|c| !self.has(**c)) {
            Some(missing) => Err(EventsError::DependencyMissing {
                name: missing.name().to_string(),
            }),
            None => Ok(()),
        }
    }
}

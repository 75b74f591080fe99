//! Event-table reconciliation pipeline
//!
//! This crate turns experiment event descriptions (in-memory condition
//! records, FSL-style event files or BIDS `events.tsv` tables) into
//! per-run condition bunches resampled on the acquisition grid. Three front
//! doors share the same stages:
//!
//! * [`SpecifyEvents`]: loader → transforms → resampler → reshaper
//! * [`TransformEvents`]: BIDS layout → transforms → resampler → event files
//! * [`FeatureAugmenter`]: BIDS events tables → feature graph → appended rows

pub mod augment;
pub mod capability;
pub mod collection;
pub mod config;
pub mod error;
pub mod layout;
pub mod loader;
pub mod resample;
pub mod reshape;
pub mod sink;
pub mod specify;
pub mod transform;
pub mod tsv;


// Re-export commonly used types
pub use augment::{FeatureAugmenter, FeatureGraph, FeatureRecord, Stimulus};
pub use capability::{Capabilities, Capability};
pub use collection::{RunFailure, TransformEvents, WriteReport};
pub use config::*;
pub use error::*;
pub use layout::{BidsLayout, EventReader, Filters};
pub use loader::{load, EventInput, InputUnits, LoaderOptions};
pub use resample::resample;
pub use reshape::{summarize, to_bunch};
pub use sink::EventFileWriter;
pub use specify::{SpecifyEvents, SpecifyOutput};
pub use transform::{
    Transform, TransformChain, TransformFactory, TransformRegistry, TransformSource, TransformSpec,
    TransformStep,
};

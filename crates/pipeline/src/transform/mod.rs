//! Transformation specifications and the built-in transforms
//!
//! A [`TransformSpec`] is an ordered list of named steps. Each step name is
//! resolved against a [`TransformRegistry`] into a [`Transform`], and the
//! resulting [`TransformChain`] is applied to every run table in order.

pub mod registry;
pub mod rename;
pub mod scale;
pub mod select;
pub mod threshold;

pub use registry::*;
pub use rename::*;
pub use scale::*;
pub use select::*;
pub use threshold::*;

use event_types::RunTable;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{EventsError, EventsResult};

/// Named parameters of one transform step
pub type TransformParams = serde_json::Map<String, serde_json::Value>;

/// A table-to-table operation built from one specification step.
pub trait Transform: Send + Sync {
    /// Registered type name of this transform
    fn name(&self) -> &str;

    /// Produce a new table; the input is left untouched.
    fn apply(&self, table: &RunTable) -> EventsResult<RunTable>;
}

/// Creates [`Transform`] instances from step parameters.
pub trait TransformFactory: Send + Sync {
    /// Name steps use to refer to this transform
    fn transform_type(&self) -> &'static str;

    fn create(&self, params: &TransformParams) -> EventsResult<Box<dyn Transform>>;

    /// JSON schema of the accepted parameters
    fn parameter_schema(&self) -> serde_json::Value {
        serde_json::json!({})
    }
}

/// One step of a specification: `{"name": "Scale", "input": ["rt"], ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformStep {
    pub name: String,
    #[serde(flatten)]
    pub params: TransformParams,
}

impl TransformStep {
    pub fn new(name: impl Into<String>, params: serde_json::Value) -> Self {
        let params = match params {
            serde_json::Value::Object(map) => map,
            _ => TransformParams::new(),
        };
        Self {
            name: name.into(),
            params,
        }
    }
}

/// Ordered list of transform steps.
///
/// Accepts either `{"transformations": [...]}` or a bare array of steps.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "SpecRepr")]
pub struct TransformSpec {
    pub transformations: Vec<TransformStep>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SpecRepr {
    Document { transformations: Vec<TransformStep> },
    Steps(Vec<TransformStep>),
}

impl From<SpecRepr> for TransformSpec {
    fn from(repr: SpecRepr) -> Self {
        let transformations = match repr {
            SpecRepr::Document { transformations } => transformations,
            SpecRepr::Steps(steps) => steps,
        };
        Self { transformations }
    }
}

impl TransformSpec {
    pub fn new(transformations: Vec<TransformStep>) -> Self {
        Self { transformations }
    }

    pub fn is_empty(&self) -> bool {
        self.transformations.is_empty()
    }

    /// Parse a specification document
    pub fn from_json(json: &str) -> EventsResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| EventsError::transform("<specification>", e.to_string()))
    }

    /// Read and parse a specification file
    pub fn from_path(path: &Path) -> EventsResult<Self> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| EventsError::file_access(path, e))?;
        Self::from_json(&contents)
    }
}

/// Where a specification comes from: a JSON file or an inline list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TransformSource {
    Path(PathBuf),
    Inline(TransformSpec),
}

impl TransformSource {
    pub fn load(&self) -> EventsResult<TransformSpec> {
        match self {
            TransformSource::Path(path) => TransformSpec::from_path(path),
            TransformSource::Inline(spec) => Ok(spec.clone()),
        }
    }
}

impl From<TransformSpec> for TransformSource {
    fn from(spec: TransformSpec) -> Self {
        TransformSource::Inline(spec)
    }
}

/// Deserialize step parameters into a typed parameter struct.
pub(crate) fn parse_params<T: DeserializeOwned>(
    transform: &str,
    params: &TransformParams,
) -> EventsResult<T> {
    serde_json::from_value(serde_json::Value::Object(params.clone()))
        .map_err(|e| EventsError::transform(transform, format!("bad parameters: {}", e)))
}

/// `input` may be written as a single name or a list of names.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub(crate) enum Names {
    One(String),
    Many(Vec<String>),
}

impl Names {
    pub(crate) fn into_vec(self) -> Vec<String> {
        match self {
            Names::One(name) => vec![name],
            Names::Many(names) => names,
        }
    }
}

/// `true` when `condition` is targeted; `None` targets every condition.
pub(crate) fn targets(input: &Option<Vec<String>>, condition: &str) -> bool {
    input
        .as_ref()
        .map_or(true, |names| names.iter().any(|n| n == condition))
}

/// Register all built-in transforms with the registry
pub fn register_builtin_transforms(registry: &mut TransformRegistry) {
    registry.register(RenameFactory);
    registry.register(SelectFactory);
    registry.register(DeleteFactory);
    registry.register(ScaleFactory);
    registry.register(ThresholdFactory);
}

//! Keeping and dropping conditions

use event_types::RunTable;
use serde::Deserialize;
use serde_json::json;

use super::{parse_params, Names, Transform, TransformFactory, TransformParams};
use crate::error::EventsResult;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct NamesParams {
    input: Names,
}

fn names_schema(description: &str) -> serde_json::Value {
    json!({
        "type": "object",
        "required": ["input"],
        "properties": {
            "input": { "type": ["string", "array"], "description": description }
        }
    })
}

/// Keeps only events whose condition is listed (`keep = true`) or drops them
/// (`keep = false`).
pub struct ConditionFilter {
    names: Vec<String>,
    keep: bool,
}

impl ConditionFilter {
    pub fn select(names: Vec<String>) -> Self {
        Self { names, keep: true }
    }

    pub fn delete(names: Vec<String>) -> Self {
        Self { names, keep: false }
    }
}

impl Transform for ConditionFilter {
    fn name(&self) -> &str {
        if self.keep {
            "select"
        } else {
            "delete"
        }
    }

    fn apply(&self, table: &RunTable) -> EventsResult<RunTable> {
        let events = table
            .events
            .iter()
            .filter(|e| self.names.contains(&e.condition) == self.keep)
            .cloned()
            .collect();
        Ok(table.with_events(events))
    }
}

/// Factory for creating select transforms
pub struct SelectFactory;

impl TransformFactory for SelectFactory {
    fn transform_type(&self) -> &'static str {
        "select"
    }

    fn create(&self, params: &TransformParams) -> EventsResult<Box<dyn Transform>> {
        let params: NamesParams = parse_params("select", params)?;
        Ok(Box::new(ConditionFilter::select(params.input.into_vec())))
    }

    fn parameter_schema(&self) -> serde_json::Value {
        names_schema("Conditions to keep")
    }
}

/// Factory for creating delete transforms
pub struct DeleteFactory;

impl TransformFactory for DeleteFactory {
    fn transform_type(&self) -> &'static str {
        "delete"
    }

    fn create(&self, params: &TransformParams) -> EventsResult<Box<dyn Transform>> {
        let params: NamesParams = parse_params("delete", params)?;
        Ok(Box::new(ConditionFilter::delete(params.input.into_vec())))
    }

    fn parameter_schema(&self) -> serde_json::Value {
        names_schema("Conditions to drop")
    }
}

//! Condition renaming

use event_types::RunTable;
use serde::Deserialize;
use serde_json::json;

use super::{parse_params, Names, Transform, TransformFactory, TransformParams};
use crate::error::{EventsError, EventsResult};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RenameParams {
    input: Names,
    output: Names,
}

/// Renames condition labels pairwise: `input[i]` becomes `output[i]`.
pub struct Rename {
    pairs: Vec<(String, String)>,
}

impl Rename {
    pub fn new(pairs: Vec<(String, String)>) -> Self {
        Self { pairs }
    }
}

impl Transform for Rename {
    fn name(&self) -> &str {
        "rename"
    }

    fn apply(&self, table: &RunTable) -> EventsResult<RunTable> {
        let events = table
            .events
            .iter()
            .map(|event| {
                let mut event = event.clone();
                if let Some((_, to)) = self.pairs.iter().find(|(from, _)| *from == event.condition) {
                    event.condition = to.clone();
                }
                event
            })
            .collect();
        Ok(table.with_events(events))
    }
}

/// Factory for creating rename transforms
pub struct RenameFactory;

impl TransformFactory for RenameFactory {
    fn transform_type(&self) -> &'static str {
        "rename"
    }

    fn create(&self, params: &TransformParams) -> EventsResult<Box<dyn Transform>> {
        let params: RenameParams = parse_params("rename", params)?;
        let input = params.input.into_vec();
        let output = params.output.into_vec();
        if input.len() != output.len() {
            return Err(EventsError::transform(
                "rename",
                format!(
                    "{} input names but {} output names",
                    input.len(),
                    output.len()
                ),
            ));
        }
        Ok(Box::new(Rename::new(input.into_iter().zip(output).collect())))
    }

    fn parameter_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "required": ["input", "output"],
            "properties": {
                "input": { "type": ["string", "array"], "description": "Conditions to rename" },
                "output": { "type": ["string", "array"], "description": "New names, same length as input" }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use event_types::Event;

    #[test]
    fn test_rename_pairs() {
        let factory = RenameFactory;
        let params = json!({"input": ["a", "b"], "output": ["x", "y"]});
        let transform = factory.create(params.as_object().unwrap()).unwrap();

        let table = RunTable::from_events(vec![
            Event::new(0.0, 1.0, "a"),
            Event::new(1.0, 1.0, "b"),
            Event::new(2.0, 1.0, "c"),
        ]);
        let out = transform.apply(&table).unwrap();
        assert_eq!(out.conditions(), vec!["x", "y", "c"]);
        // The input table is not modified.
        assert_eq!(table.conditions(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_rename_length_mismatch() {
        let params = json!({"input": ["a", "b"], "output": "x"});
        let err = RenameFactory.create(params.as_object().unwrap()).err().unwrap();
        assert!(matches!(err, EventsError::TransformSpec { .. }));
    }

    #[test]
    fn test_rename_requires_output() {
        let params = json!({"input": "a"});
        assert!(RenameFactory.create(params.as_object().unwrap()).is_err());
    }
}

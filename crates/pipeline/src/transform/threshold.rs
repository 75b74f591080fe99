//! Amplitude thresholding

use event_types::RunTable;
use serde::Deserialize;
use serde_json::json;

use super::{parse_params, targets, Names, Transform, TransformFactory, TransformParams};
use crate::error::{EventsError, EventsResult};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ThresholdParams {
    #[serde(default)]
    input: Option<Names>,
    #[serde(default)]
    threshold: f64,
    #[serde(default)]
    binarize: bool,
    #[serde(default = "default_true")]
    above: bool,
    #[serde(default = "default_true")]
    signed: bool,
}

fn default_true() -> bool {
    true
}

/// Zeroes amplitudes on the wrong side of a cut-off.
///
/// With `above`, values `>= threshold` pass; otherwise values `<= threshold`
/// pass. `signed = false` compares absolute values. `binarize` sets passing
/// amplitudes to 1.
pub struct Threshold {
    input: Option<Vec<String>>,
    threshold: f64,
    binarize: bool,
    above: bool,
    signed: bool,
}

impl Threshold {
    fn passes(&self, amplitude: f64) -> bool {
        let value = if self.signed { amplitude } else { amplitude.abs() };
        if self.above {
            value >= self.threshold
        } else {
            value <= self.threshold
        }
    }
}

impl Transform for Threshold {
    fn name(&self) -> &str {
        "threshold"
    }

    fn apply(&self, table: &RunTable) -> EventsResult<RunTable> {
        let events = table
            .events
            .iter()
            .map(|event| {
                let mut event = event.clone();
                if targets(&self.input, &event.condition) {
                    event.amplitude = match (self.passes(event.amplitude), self.binarize) {
                        (true, true) => 1.0,
                        (true, false) => event.amplitude,
                        (false, _) => 0.0,
                    };
                }
                event
            })
            .collect();
        Ok(table.with_events(events))
    }
}

/// Factory for creating threshold transforms
pub struct ThresholdFactory;

impl TransformFactory for ThresholdFactory {
    fn transform_type(&self) -> &'static str {
        "threshold"
    }

    fn create(&self, params: &TransformParams) -> EventsResult<Box<dyn Transform>> {
        let params: ThresholdParams = parse_params("threshold", params)?;
        if !params.threshold.is_finite() {
            return Err(EventsError::transform("threshold", "threshold must be finite"));
        }
        Ok(Box::new(Threshold {
            input: params.input.map(Names::into_vec),
            threshold: params.threshold,
            binarize: params.binarize,
            above: params.above,
            signed: params.signed,
        }))
    }

    fn parameter_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "input": { "type": ["string", "array"], "description": "Conditions to threshold; all when omitted" },
                "threshold": { "type": "number", "default": 0.0 },
                "binarize": { "type": "boolean", "default": false },
                "above": { "type": "boolean", "default": true },
                "signed": { "type": "boolean", "default": true }
            }
        })
    }
}

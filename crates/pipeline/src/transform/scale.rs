//! Per-condition amplitude scaling

use event_types::RunTable;
use serde::Deserialize;
use serde_json::json;

use super::{parse_params, targets, Names, Transform, TransformFactory, TransformParams};
use crate::error::EventsResult;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ScaleParams {
    #[serde(default)]
    input: Option<Names>,
    #[serde(default = "default_true")]
    demean: bool,
    #[serde(default = "default_true")]
    rescale: bool,
}

fn default_true() -> bool {
    true
}

/// Demeans and/or rescales the amplitudes of each targeted condition.
///
/// Rescaling divides by the sample standard deviation (`ddof = 1`) and is
/// skipped for conditions with fewer than two events or zero spread.
pub struct Scale {
    input: Option<Vec<String>>,
    demean: bool,
    rescale: bool,
}

impl Scale {
    pub fn new(input: Option<Vec<String>>, demean: bool, rescale: bool) -> Self {
        Self {
            input,
            demean,
            rescale,
        }
    }
}

impl Transform for Scale {
    fn name(&self) -> &str {
        "scale"
    }

    fn apply(&self, table: &RunTable) -> EventsResult<RunTable> {
        let mut events = table.events.clone();

        for condition in table.conditions() {
            if !targets(&self.input, condition) {
                continue;
            }
            let values: Vec<f64> = table
                .events
                .iter()
                .filter(|e| e.condition == condition)
                .map(|e| e.amplitude)
                .collect();
            let n = values.len() as f64;
            let mean = values.iter().sum::<f64>() / n;
            let std = if values.len() > 1 {
                (values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0)).sqrt()
            } else {
                0.0
            };

            for event in events.iter_mut().filter(|e| e.condition == condition) {
                if self.demean {
                    event.amplitude -= mean;
                }
                if self.rescale && std > 0.0 {
                    event.amplitude /= std;
                }
            }
        }

        Ok(table.with_events(events))
    }
}

/// Factory for creating scale transforms
pub struct ScaleFactory;

impl TransformFactory for ScaleFactory {
    fn transform_type(&self) -> &'static str {
        "scale"
    }

    fn create(&self, params: &TransformParams) -> EventsResult<Box<dyn Transform>> {
        let params: ScaleParams = parse_params("scale", params)?;
        Ok(Box::new(Scale::new(
            params.input.map(Names::into_vec),
            params.demean,
            params.rescale,
        )))
    }

    fn parameter_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "input": { "type": ["string", "array"], "description": "Conditions to scale; all when omitted" },
                "demean": { "type": "boolean", "default": true },
                "rescale": { "type": "boolean", "default": true }
            }
        })
    }
}

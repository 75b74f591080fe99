//! Reshaping resampled runs into per-condition bunches.

use event_types::{ConditionBunch, ResampledRun};
use serde_json::{Map, Value};

/// Build the condition bunch of one resampled run.
///
/// Every condition shares the run's time grid as its onsets and carries a
/// single duration equal to the bin width. A run without condition columns
/// yields an empty bunch.
pub fn to_bunch(run: &ResampledRun) -> ConditionBunch {
    let mut bunch = ConditionBunch::default();
    for column in &run.columns {
        bunch.conditions.push(column.name.clone());
        bunch.onsets.push(run.onset.clone());
        bunch.durations.push(vec![run.tr]);
        bunch.amplitudes.push(column.values.clone());
    }
    bunch
}

/// Column → (row index → value) mapping of one run, `onset` first.
pub fn to_dict(run: &ResampledRun) -> Value {
    let indexed = |values: &[f64]| -> Value {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| (i.to_string(), Value::from(*v)))
            .collect::<Map<String, Value>>()
            .into()
    };

    let mut dict = Map::new();
    dict.insert("onset".to_string(), indexed(&run.onset));
    for column in &run.columns {
        dict.insert(column.name.clone(), indexed(&column.values));
    }
    Value::Object(dict)
}

/// Diagnostic summary of every run, in run order.
pub fn summarize(runs: &[ResampledRun]) -> String {
    Value::Array(runs.iter().map(to_dict).collect()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use event_types::{Column, Entities};

    fn run() -> ResampledRun {
        ResampledRun {
            entities: Entities::new(),
            tr: 2.0,
            onset: vec![0.0, 2.0, 4.0],
            columns: vec![
                Column { name: "b".into(), values: vec![0.0, 1.0, 0.0] },
                Column { name: "a".into(), values: vec![1.0, 0.0, 0.0] },
            ],
        }
    }

    #[test]
    fn test_bunch_shape() {
        let bunch = to_bunch(&run());
        assert_eq!(bunch.conditions, vec!["b", "a"]);
        assert_eq!(bunch.onsets, vec![vec![0.0, 2.0, 4.0]; 2]);
        assert_eq!(bunch.durations, vec![vec![2.0]; 2]);
        assert_eq!(bunch.amplitudes[1], vec![1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_no_columns_gives_empty_bunch() {
        let mut empty = run();
        empty.columns.clear();
        let bunch = to_bunch(&empty);
        assert!(bunch.is_empty());
        assert!(bunch.onsets.is_empty() && bunch.durations.is_empty() && bunch.amplitudes.is_empty());
    }

    #[test]
    fn test_summary_keeps_column_order() {
        let summary = summarize(&[run()]);
        let onset = summary.find("\"onset\"").unwrap();
        let b = summary.find("\"b\"").unwrap();
        let a = summary.find("\"a\"").unwrap();
        assert!(onset < b && b < a, "{}", summary);
        assert!(summary.starts_with("[{\"onset\":{\"0\":0.0"), "{}", summary);
    }
}

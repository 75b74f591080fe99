//! Per-condition bunches
//!
//! [`RunRecord`] is the structured input accepted in bunch mode and
//! [`ConditionBunch`] is the structure produced for downstream modelling.
//! Both keep four parallel sequences indexed by condition.

use serde::{Deserialize, Serialize};

/// Durations of one condition in a [`RunRecord`].
///
/// A single value, either bare or as a one-element list, applies to every
/// onset of the condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Durations {
    Shared(f64),
    PerOnset(Vec<f64>),
}

impl Durations {
    /// Resolve the duration of the `index`-th onset, `None` when out of range.
    pub fn get(&self, index: usize) -> Option<f64> {
        match self {
            Durations::Shared(d) => Some(*d),
            Durations::PerOnset(values) if values.len() == 1 => Some(values[0]),
            Durations::PerOnset(values) => values.get(index).copied(),
        }
    }

    /// Number of explicit values; a shared duration counts as one.
    pub fn len(&self) -> usize {
        match self {
            Durations::Shared(_) => 1,
            Durations::PerOnset(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Condition information of one run, supplied in memory.
///
/// Position `i` of every field describes `conditions[i]`. `amplitudes` may be
/// omitted, in which case every event gets the default amplitude.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunRecord {
    pub conditions: Vec<String>,
    pub onsets: Vec<Vec<f64>>,
    pub durations: Vec<Durations>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amplitudes: Option<Vec<Vec<f64>>>,
}

/// Reshaped output of one run, consumed by modelling code.
///
/// Invariant: all four sequences have the same length, and for every
/// condition `onsets[i].len() == amplitudes[i].len()`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConditionBunch {
    pub conditions: Vec<String>,
    pub onsets: Vec<Vec<f64>>,
    pub durations: Vec<Vec<f64>>,
    pub amplitudes: Vec<Vec<f64>>,
}

impl ConditionBunch {
    /// Number of conditions
    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Index of a condition by name
    pub fn position(&self, condition: &str) -> Option<usize> {
        self.conditions.iter().position(|c| c == condition)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shared_duration_forms() {
        let bare: Durations = serde_json::from_str("2.5").unwrap();
        let listed: Durations = serde_json::from_str("[2.5]").unwrap();
        for d in [bare, listed] {
            assert_eq!(d.get(0), Some(2.5));
            assert_eq!(d.get(7), Some(2.5));
        }

        let per_onset: Durations = serde_json::from_str("[1.0, 2.0]").unwrap();
        assert_eq!(per_onset.get(1), Some(2.0));
        assert_eq!(per_onset.get(2), None);
    }

    #[test]
    fn test_run_record_rejects_unknown_fields() {
        let json = r#"{
            "conditions": ["a"],
            "onsets": [[0.0]],
            "durations": [[1.0]],
            "regressors": [[1.0]]
        }"#;
        assert!(serde_json::from_str::<RunRecord>(json).is_err());
    }

    #[test]
    fn test_run_record_requires_durations() {
        let json = r#"{ "conditions": ["a"], "onsets": [[0.0]] }"#;
        assert!(serde_json::from_str::<RunRecord>(json).is_err());
    }
}

//! Pivoting in-memory condition records into event rows

use event_types::{Event, RunRecord, RunTable, DEFAULT_AMPLITUDE};

use crate::error::{EventsError, EventsResult};

/// Pivot one record into a run table.
///
/// Rows are grouped by condition in record order, onsets in record order.
/// A condition with a single duration has it applied to all of its onsets.
pub fn from_record(record: &RunRecord, index: usize) -> EventsResult<RunTable> {
    let context = format!("run record {}", index);
    let n = record.conditions.len();

    if record.onsets.len() != n || record.durations.len() != n {
        return Err(EventsError::schema(
            context,
            format!(
                "{} conditions but {} onset lists and {} duration lists",
                n,
                record.onsets.len(),
                record.durations.len()
            ),
        ));
    }
    if let Some(amplitudes) = &record.amplitudes {
        if amplitudes.len() != n {
            return Err(EventsError::schema(
                context,
                format!("{} conditions but {} amplitude lists", n, amplitudes.len()),
            ));
        }
    }

    let mut table = RunTable::default();
    for (i, condition) in record.conditions.iter().enumerate() {
        let onsets = &record.onsets[i];
        let durations = &record.durations[i];
        if durations.len() != 1 && durations.len() != onsets.len() {
            return Err(EventsError::schema(
                &context,
                format!(
                    "condition '{}' has {} onsets but {} durations",
                    condition,
                    onsets.len(),
                    durations.len()
                ),
            ));
        }
        let amplitudes = record.amplitudes.as_ref().map(|a| &a[i]);
        if let Some(amplitudes) = amplitudes {
            if amplitudes.len() != onsets.len() {
                return Err(EventsError::schema(
                    &context,
                    format!(
                        "condition '{}' has {} onsets but {} amplitudes",
                        condition,
                        onsets.len(),
                        amplitudes.len()
                    ),
                ));
            }
        }

        for (j, &onset) in onsets.iter().enumerate() {
            let duration = durations.get(j).ok_or_else(|| {
                EventsError::schema(&context, format!("condition '{}' has no durations", condition))
            })?;
            let amplitude = amplitudes.map_or(DEFAULT_AMPLITUDE, |a| a[j]);
            table.push(Event::new(onset, duration, condition.clone()).with_amplitude(amplitude));
        }
    }

    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use event_types::Durations;

    #[test]
    fn test_shared_duration_broadcast() {
        let record = RunRecord {
            conditions: vec!["task".into()],
            onsets: vec![vec![0.0, 10.0, 20.0]],
            durations: vec![Durations::PerOnset(vec![5.0])],
            amplitudes: None,
        };
        let table = from_record(&record, 0).unwrap();
        assert_eq!(table.len(), 3);
        assert!(table.events.iter().all(|e| e.duration == 5.0));
        assert!(table.events.iter().all(|e| e.amplitude == 1.0));
    }

    #[test]
    fn test_rows_grouped_by_condition() {
        let record = RunRecord {
            conditions: vec!["b".into(), "a".into()],
            onsets: vec![vec![4.0, 1.0], vec![0.0]],
            durations: vec![Durations::PerOnset(vec![1.0, 2.0]), Durations::Shared(3.0)],
            amplitudes: Some(vec![vec![0.5, 0.25], vec![2.0]]),
        };
        let table = from_record(&record, 0).unwrap();
        let rows: Vec<(f64, f64, &str, f64)> = table
            .events
            .iter()
            .map(|e| (e.onset, e.duration, e.condition.as_str(), e.amplitude))
            .collect();
        assert_eq!(
            rows,
            vec![(4.0, 1.0, "b", 0.5), (1.0, 2.0, "b", 0.25), (0.0, 3.0, "a", 2.0)]
        );
    }

    #[test]
    fn test_mismatched_lengths_are_schema_errors() {
        let record = RunRecord {
            conditions: vec!["a".into()],
            onsets: vec![vec![0.0, 1.0, 2.0]],
            durations: vec![Durations::PerOnset(vec![1.0, 2.0])],
            amplitudes: None,
        };
        assert!(matches!(from_record(&record, 3), Err(EventsError::Schema { .. })));

        let record = RunRecord {
            conditions: vec!["a".into(), "b".into()],
            onsets: vec![vec![0.0]],
            durations: vec![Durations::Shared(1.0)],
            amplitudes: None,
        };
        assert!(matches!(from_record(&record, 0), Err(EventsError::Schema { .. })));
    }
}

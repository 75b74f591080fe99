//! BIDS project layout: finding and filtering event files.

use event_types::{Entities, RunTable};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::{EventsError, EventsResult};
use crate::loader::{read_bids_events, BidsReadOptions};

/// Entity name → accepted value(s). Values may be strings, numbers or lists.
pub type Filters = BTreeMap<String, Value>;

/// File name suffix of BIDS event tables
pub const EVENTS_SUFFIX: &str = "_events.tsv";

/// Subdirectories that hold non-raw data and are not searched
pub const SKIPPED_DIRS: &[&str] = &["derivatives", "sourcedata"];

/// Reads all runs below a source directory that match `filters`.
pub trait EventReader: Send + Sync {
    fn read(&self, source: &Path, filters: &Filters) -> EventsResult<Vec<RunTable>>;
}

/// Map long entity names onto their file-name keys.
pub fn entity_key(name: &str) -> &str {
    match name {
        "subject" => "sub",
        "session" => "ses",
        "acquisition" => "acq",
        "reconstruction" => "rec",
        "direction" => "dir",
        other => other,
    }
}

fn value_matches(actual: &str, expected: &Value) -> bool {
    match expected {
        Value::String(s) => {
            s == actual
                || matches!(
                    (s.parse::<f64>(), actual.parse::<f64>()),
                    (Ok(a), Ok(b)) if a == b
                )
        }
        Value::Number(n) => match (n.as_f64(), actual.parse::<f64>()) {
            (Some(a), Ok(b)) => a == b,
            _ => false,
        },
        Value::Array(options) => options.iter().any(|v| value_matches(actual, v)),
        _ => false,
    }
}

/// `true` when every filter names an entity present with an accepted value.
pub fn matches_filters(entities: &Entities, filters: &Filters) -> bool {
    filters.iter().all(|(name, expected)| {
        entities
            .get(entity_key(name))
            .map_or(false, |actual| value_matches(actual, expected))
    })
}

fn walk(dir: &Path, found: &mut Vec<PathBuf>) -> EventsResult<()> {
    let entries = fs::read_dir(dir).map_err(|e| EventsError::file_access(dir, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| EventsError::file_access(dir, e))?;
        let path = entry.path();
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if name.starts_with('.') {
            continue;
        }
        if path.is_dir() {
            if SKIPPED_DIRS.contains(&name.as_ref()) {
                continue;
            }
            walk(&path, found)?;
        } else if name.ends_with(EVENTS_SUFFIX) {
            found.push(path);
        }
    }
    Ok(())
}

/// Event reader for BIDS-organized directories.
#[derive(Debug, Clone, Default)]
pub struct BidsLayout {
    options: BidsReadOptions,
}

impl BidsLayout {
    pub fn new(options: BidsReadOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &BidsReadOptions {
        &self.options
    }

    /// All `*_events.tsv` files below `root` matching `filters`, sorted by path.
    pub fn discover(&self, root: &Path, filters: &Filters) -> EventsResult<Vec<PathBuf>> {
        if !root.is_dir() {
            return Err(EventsError::not_found(root));
        }

        let mut found = Vec::new();
        walk(root, &mut found)?;
        found.sort();

        let selected: Vec<PathBuf> = found
            .into_iter()
            .filter(|path| {
                let name = path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
                let (entities, _) = Entities::parse_filename(&name);
                matches_filters(&entities, filters)
            })
            .collect();

        if selected.is_empty() {
            warn!("No event files under {} matched filters {:?}", root.display(), filters);
        } else {
            debug!("Found {} event file(s) under {}", selected.len(), root.display());
        }
        Ok(selected)
    }
}

impl EventReader for BidsLayout {
    fn read(&self, source: &Path, filters: &Filters) -> EventsResult<Vec<RunTable>> {
        self.discover(source, filters)?
            .iter()
            .map(|path| read_bids_events(path, &self.options))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entities(name: &str) -> Entities {
        Entities::parse_filename(name).0
    }

    #[test]
    fn test_filters_accept_long_names_and_numbers() {
        let e = entities("sub-01_task-nback_run-01_events.tsv");
        let mut filters = Filters::new();
        filters.insert("subject".into(), json!("01"));
        filters.insert("run".into(), json!(1));
        assert!(matches_filters(&e, &filters));

        filters.insert("task".into(), json!(["rest", "nback"]));
        assert!(matches_filters(&e, &filters));

        filters.insert("task".into(), json!("rest"));
        assert!(!matches_filters(&e, &filters));
    }

    #[test]
    fn test_filter_on_absent_entity_excludes() {
        let e = entities("sub-01_task-nback_events.tsv");
        let mut filters = Filters::new();
        filters.insert("ses".into(), json!("pre"));
        assert!(!matches_filters(&e, &filters));
        assert!(matches_filters(&e, &Filters::new()));
    }

    #[test]
    fn test_discover_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        let func = dir.path().join("sub-02").join("func");
        fs::create_dir_all(&func).unwrap();
        let func1 = dir.path().join("sub-01").join("func");
        fs::create_dir_all(&func1).unwrap();
        for path in [
            func.join("sub-02_task-rest_events.tsv"),
            func1.join("sub-01_task-rest_events.tsv"),
            func1.join("sub-01_task-rest_bold.json"),
        ] {
            fs::write(&path, "onset\tduration\n").unwrap();
        }

        let layout = BidsLayout::default();
        let all = layout.discover(dir.path(), &Filters::new()).unwrap();
        assert_eq!(all.len(), 2);
        assert!(all[0].ends_with("sub-01_task-rest_events.tsv"));

        let mut filters = Filters::new();
        filters.insert("sub".into(), json!("02"));
        let some = layout.discover(dir.path(), &filters).unwrap();
        assert_eq!(some.len(), 1);
        assert!(some[0].ends_with("sub-02_task-rest_events.tsv"));
    }

    #[test]
    fn test_discover_skips_derivatives() {
        let dir = tempfile::tempdir().unwrap();
        let func = dir.path().join("sub-01").join("func");
        let derived = dir.path().join("derivatives").join("fmriprep").join("sub-01");
        fs::create_dir_all(&func).unwrap();
        fs::create_dir_all(&derived).unwrap();
        fs::write(func.join("sub-01_task-rest_events.tsv"), "onset\n").unwrap();
        fs::write(derived.join("sub-01_task-rest_events.tsv"), "onset\n").unwrap();

        let found = BidsLayout::default().discover(dir.path(), &Filters::new()).unwrap();
        assert_eq!(found, vec![func.join("sub-01_task-rest_events.tsv")]);

        // An explicitly chosen derivatives directory is still searched.
        let found = BidsLayout::default()
            .discover(&dir.path().join("derivatives"), &Filters::new())
            .unwrap();
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn test_discover_missing_root() {
        let layout = BidsLayout::default();
        let err = layout.discover(Path::new("/nonexistent/bids"), &Filters::new()).unwrap_err();
        assert!(matches!(err, EventsError::FileAccess { .. }));
    }
}

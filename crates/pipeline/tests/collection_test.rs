use event_pipeline::{
    EventsError, Filters, TransformEvents, TransformEventsConfig, TransformSpec, TransformStep,
};
use serde_json::json;
use std::fs;
use std::path::Path;

fn bids_project(root: &Path) {
    for (sub, rows) in [
        ("01", "onset\tduration\ttrial_type\tamplitude\n0\t2\tgo\t0.25\n4\t2\tstop\t2\n"),
        ("02", "onset\tduration\ttrial_type\tamplitude\n2\t2\tgo\t1\n"),
    ] {
        let func = root.join(format!("sub-{}", sub)).join("func");
        fs::create_dir_all(&func).unwrap();
        fs::write(func.join(format!("sub-{}_task-stop_run-01_events.tsv", sub)), rows).unwrap();
    }
}

#[test]
fn test_writes_one_file_per_filtered_run() {
    let dir = tempfile::tempdir().unwrap();
    bids_project(dir.path());

    let mut config = TransformEventsConfig::new(dir.path(), 2.0);
    config.output_dir = dir.path().join("new_events");
    config.filters = Some(Filters::from([
        ("subject".to_string(), json!("01")),
        ("run".to_string(), json!(1)),
    ]));
    config.transformation_spec = Some(
        TransformSpec::new(vec![TransformStep::new(
            "Threshold",
            json!({"input": "go", "threshold": 0.5, "binarize": true}),
        )])
        .into(),
    );

    let report = TransformEvents::new(config).unwrap().run().unwrap();
    assert!(report.is_complete());
    assert_eq!(report.written.len(), 1);

    let written = &report.written[0];
    assert_eq!(
        written,
        &dir.path().join("new_events").join("sub-01_task-stop_run-01_events.tsv")
    );
    let text = fs::read_to_string(written).unwrap();
    assert_eq!(
        text,
        "onset\tgo\tstop\n0.0\t0.0\t0.0\n2.0\t0.0\t0.0\n4.0\t0.0\t2.0\n6.0\t0.0\t0.0\n"
    );
}

#[test]
fn test_columns_and_header_options() {
    let dir = tempfile::tempdir().unwrap();
    bids_project(dir.path());

    let mut config = TransformEventsConfig::new(dir.path(), 2.0);
    config.files_directory = Some(dir.path().join("sub-02"));
    config.output_dir = dir.path().join("out");
    config.header = false;
    config.columns = Some(vec!["go".to_string()]);

    let report = TransformEvents::new(config).unwrap().run().unwrap();
    assert_eq!(report.written.len(), 1);
    let text = fs::read_to_string(&report.written[0]).unwrap();
    assert_eq!(text, "0.0\t0.0\n2.0\t1.0\n4.0\t0.0\n");
}

#[test]
fn test_unknown_transform_aborts_before_writing() {
    let dir = tempfile::tempdir().unwrap();
    bids_project(dir.path());

    let mut config = TransformEventsConfig::new(dir.path(), 2.0);
    config.output_dir = dir.path().join("out");
    config.transformation_spec =
        Some(TransformSpec::new(vec![TransformStep::new("orthogonalize", json!({}))]).into());

    let err = TransformEvents::new(config).unwrap().run().unwrap_err();
    assert!(matches!(err, EventsError::TransformSpec { .. }));
    assert!(!dir.path().join("out").exists());
}

#[test]
fn test_missing_base_dir() {
    let config = TransformEventsConfig::new("/nonexistent/bids", 2.0);
    assert!(matches!(
        TransformEvents::new(config),
        Err(EventsError::FileAccess { .. })
    ));
}

use event_pipeline::{
    ConfigDocument, InputUnits, SpecifyEventsConfig, TransformEventsConfig, TransformRegistry,
    TransformSource, TransformSpec,
};
use std::path::{Path, PathBuf};

fn configs_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .join("configs")
}

#[test]
fn test_sample_specify_config() {
    let config = SpecifyEventsConfig::from_path(&configs_dir().join("specify.yaml"))
        .expect("Failed to parse specify.yaml");
    assert_eq!(config.time_repetition, 2.0);
    assert_eq!(config.input_units, InputUnits::Secs);
    assert_eq!(config.to_input().unwrap().mode(), "event_files");

    let spec = config.transformations.unwrap().load().unwrap();
    let chain = TransformRegistry::with_builtins().compile(&spec).unwrap();
    assert_eq!(chain.len(), 2);
}

#[test]
fn test_sample_transform_config() {
    let config = TransformEventsConfig::from_path(&configs_dir().join("transform.yaml"))
        .expect("Failed to parse transform.yaml");
    let filters = config.filters();
    assert_eq!(filters["subject"], serde_json::json!("01"));
    assert!(config.header);
    assert!(matches!(config.transformation_spec, Some(TransformSource::Path(_))));
}

#[test]
fn test_sample_model_spec() {
    let spec = TransformSpec::from_path(&configs_dir().join("model.json"))
        .expect("Failed to parse model.json");
    let names: Vec<&str> = spec.transformations.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["select", "threshold"]);
    assert!(TransformRegistry::with_builtins().compile(&spec).is_ok());
}

//! Transform registry for resolving specification steps.

use event_types::RunTable;
use std::collections::HashMap;
use tracing::debug;

use super::{register_builtin_transforms, Transform, TransformFactory, TransformSpec, TransformStep};
use crate::error::{EventsError, EventsResult};

/// Registry for transform factories.
///
/// Lookups are case-insensitive, so `Scale` and `scale` resolve to the same
/// factory.
#[derive(Default)]
pub struct TransformRegistry {
    factories: HashMap<String, Box<dyn TransformFactory>>,
}

impl TransformRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Create a registry holding every built-in transform
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        register_builtin_transforms(&mut registry);
        registry
    }

    /// Register a transform factory
    pub fn register<F>(&mut self, factory: F)
    where
        F: TransformFactory + 'static,
    {
        let transform_type = factory.transform_type().to_ascii_lowercase();
        self.factories.insert(transform_type, Box::new(factory));
    }

    /// Create a transform instance from one specification step
    pub fn create(&self, step: &TransformStep) -> EventsResult<Box<dyn Transform>> {
        let factory = self
            .factories
            .get(&step.name.to_ascii_lowercase())
            .ok_or_else(|| EventsError::transform(&step.name, "unknown transform"))?;

        factory.create(&step.params)
    }

    /// Resolve every step of a specification up front.
    ///
    /// Fails on the first unknown or malformed step, before any table is
    /// transformed.
    pub fn compile(&self, spec: &TransformSpec) -> EventsResult<TransformChain> {
        let steps = spec
            .transformations
            .iter()
            .map(|step| self.create(step))
            .collect::<EventsResult<Vec<_>>>()?;
        Ok(TransformChain { steps })
    }

    /// Get all registered transform types, sorted
    pub fn transform_types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = self.factories.keys().map(|s| s.as_str()).collect();
        types.sort_unstable();
        types
    }

    /// Get parameter schema for a transform type
    pub fn parameter_schema(&self, transform_type: &str) -> Option<serde_json::Value> {
        self.factories
            .get(&transform_type.to_ascii_lowercase())
            .map(|f| f.parameter_schema())
    }
}

/// Compiled, ordered transform steps.
#[derive(Default)]
pub struct TransformChain {
    steps: Vec<Box<dyn Transform>>,
}

impl TransformChain {
    /// A chain that returns its input unchanged
    pub fn identity() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Apply every step in declared order, each consuming the previous output.
    pub fn apply(&self, table: &RunTable) -> EventsResult<RunTable> {
        let mut current = table.clone();
        for step in &self.steps {
            current = step.apply(&current)?;
            debug!(
                "Applied transform '{}' to {}: {} events",
                step.name(),
                current.label(),
                current.len()
            );
        }
        Ok(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use event_types::Event;
    use serde_json::json;

    fn table() -> RunTable {
        RunTable::from_events(vec![
            Event::new(0.0, 1.0, "go"),
            Event::new(2.0, 1.0, "stop"),
            Event::new(4.0, 1.0, "junk"),
        ])
    }

    #[test]
    fn test_unknown_transform_is_named() {
        let registry = TransformRegistry::with_builtins();
        let spec = TransformSpec::new(vec![
            TransformStep::new("delete", json!({"input": ["junk"]})),
            TransformStep::new("Orthogonalize", json!({})),
        ]);
        match registry.compile(&spec) {
            Err(EventsError::TransformSpec { name, .. }) => assert_eq!(name, "Orthogonalize"),
            other => panic!("expected TransformSpec error, got {:?}", other.err()),
        }
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let registry = TransformRegistry::with_builtins();
        let step = TransformStep::new("DELETE", json!({"input": "junk"}));
        assert!(registry.create(&step).is_ok());
        assert!(registry.parameter_schema("Rename").is_some());
    }

    #[test]
    fn test_steps_run_in_declared_order() {
        let registry = TransformRegistry::with_builtins();
        // Renaming first means the select sees the new label.
        let spec = TransformSpec::new(vec![
            TransformStep::new("rename", json!({"input": ["go"], "output": ["respond"]})),
            TransformStep::new("select", json!({"input": ["respond", "stop"]})),
        ]);
        let chain = registry.compile(&spec).unwrap();
        let out = chain.apply(&table()).unwrap();
        assert_eq!(out.conditions(), vec!["respond", "stop"]);
    }

    #[test]
    fn test_identity_chain_leaves_table_untouched() {
        let input = table();
        let out = TransformChain::identity().apply(&input).unwrap();
        assert_eq!(out, input);
    }

    #[test]
    fn test_builtin_types_registered() {
        let registry = TransformRegistry::with_builtins();
        assert_eq!(
            registry.transform_types(),
            vec!["delete", "rename", "scale", "select", "threshold"]
        );
    }
}

//! Shared fixtures for the workspace integration tests.

use std::path::PathBuf;
use std::sync::Arc;

use alzrisk_model::{Artifacts, DecisionTree, RandomForest, StandardScaler};
use alzrisk_pipeline::{InputRecord, Pipeline};
use alzrisk_schema::FeatureSchema;

pub fn demos_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../demos")
}

pub fn feature_names(schema: &FeatureSchema) -> Vec<String> {
    schema
        .feature_names()
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// Scaler with distinct per-column statistics so every numeric column moves.
pub fn standard_scaler(schema: &FeatureSchema) -> StandardScaler {
    let names: Vec<String> = schema.numeric_names().iter().map(|s| s.to_string()).collect();
    let n = names.len();
    let mean = (0..n).map(|i| 10.0 + i as f64).collect();
    let scale = (0..n).map(|i| 1.5 + 0.25 * i as f64).collect();
    StandardScaler::new(mean, scale).with_feature_names(names)
}

/// Three stumps over scaled MMSE, FunctionalAssessment and MemoryComplaints.
pub fn forest(schema: &FeatureSchema, declared: Option<Vec<String>>) -> RandomForest {
    RandomForest {
        classes: vec![0, 1],
        n_features_in: schema.len(),
        feature_names_in: declared,
        estimators: vec![
            DecisionTree::stump(22, 0.0, vec![12.0, 30.0], vec![40.0, 6.0]),
            DecisionTree::stump(23, 0.0, vec![5.0, 20.0], vec![33.0, 9.0]),
            DecisionTree::stump(24, 0.5, vec![0.7, 0.3], vec![0.2, 0.8]),
        ],
    }
}

pub fn pipeline_with(forest: RandomForest) -> Pipeline {
    let schema = FeatureSchema::alzheimers();
    let scaler = standard_scaler(&schema);
    Pipeline::new(
        Arc::new(schema),
        Artifacts::new(Arc::new(forest), Arc::new(scaler)),
    )
}

pub fn pipeline() -> Pipeline {
    let schema = FeatureSchema::alzheimers();
    let declared = feature_names(&schema);
    pipeline_with(forest(&schema, Some(declared)))
}

/// Age 70, Male, every other categorical on its first label, every other
/// numeric field at zero.
pub fn baseline_record(schema: &FeatureSchema) -> InputRecord {
    let mut record = InputRecord::with_defaults(schema);
    record.insert("Age", 70.0).insert("Gender", "Male");
    record
}

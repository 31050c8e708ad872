use std::fs;
use std::sync::Arc;

use alzrisk_model::{load_classifier, load_scaler, ArtifactError, Artifacts, Classifier, Scaler};
use alzrisk_pipeline::{InputRecord, Pipeline};
use alzrisk_schema::FeatureSchema;
use pretty_assertions::assert_eq;
use tests::demos_dir;

fn demo_pipeline() -> Pipeline {
    let dir = demos_dir();
    let artifacts = Artifacts::load(
        dir.join("model_random_forest_alzheimer.json"),
        dir.join("scaler.json"),
    )
    .expect("demo artifacts load");
    Pipeline::new(Arc::new(FeatureSchema::alzheimers()), artifacts)
}

#[test]
fn demo_artifacts_agree_with_schema() {
    let schema = FeatureSchema::alzheimers();
    let dir = demos_dir();

    let scaler = load_scaler(dir.join("scaler.json")).unwrap();
    assert_eq!(scaler.n_features_in(), 15);
    let scaler_names: Vec<&str> = scaler
        .feature_names_in()
        .unwrap()
        .iter()
        .map(String::as_str)
        .collect();
    assert_eq!(scaler_names, schema.numeric_names());

    let model = load_classifier(dir.join("model_random_forest_alzheimer.json")).unwrap();
    assert_eq!(model.kind(), "random_forest");
    assert_eq!(model.classes(), &[0, 1]);
    let model_names: Vec<&str> = model
        .feature_names_in()
        .unwrap()
        .iter()
        .map(String::as_str)
        .collect();
    assert_eq!(model_names, schema.feature_names());
}

#[test]
fn demo_patient_gets_a_verdict() {
    let _ = env_logger::builder().is_test(true).try_init();
    let pipeline = demo_pipeline();
    let text = fs::read_to_string(demos_dir().join("patient.json")).unwrap();
    let partial: InputRecord = serde_json::from_str(&text).unwrap();

    let record = partial.completed(pipeline.schema());

    let report = pipeline.run(&record).unwrap();
    assert_eq!(report.before_scaling.get("Gender"), Some(0.0));
    assert_eq!(report.before_scaling.get("MemoryComplaints"), Some(1.0));
    assert!((report.prediction.probabilities.sum() - 1.0).abs() < 1e-6);
    assert!(report.prediction.label == 0 || report.prediction.label == 1);
    assert!(report.notices.is_empty(), "{:?}", report.notices);
}

#[test]
fn missing_artifact_is_an_io_error() {
    let tmp = tempfile::tempdir().unwrap();
    let err = Artifacts::load(
        tmp.path().join("model.json"),
        demos_dir().join("scaler.json"),
    )
    .unwrap_err();
    assert!(matches!(err, ArtifactError::Io { .. }));
}

#[test]
fn malformed_artifacts_are_rejected() {
    let tmp = tempfile::tempdir().unwrap();
    let garbage = tmp.path().join("garbage.json");
    fs::write(&garbage, "not json").unwrap();
    assert!(matches!(
        load_classifier(&garbage).unwrap_err(),
        ArtifactError::Parse { .. }
    ));

    let zero_scale = tmp.path().join("scaler.json");
    fs::write(
        &zero_scale,
        r#"{"kind":"standard_scaler","mean":[1.0,2.0],"scale":[1.0,0.0]}"#,
    )
    .unwrap();
    assert!(matches!(
        load_scaler(&zero_scale).unwrap_err(),
        ArtifactError::Invalid { .. }
    ));
}

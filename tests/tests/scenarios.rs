use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use alzrisk_model::{Artifacts, Classifier, ModelError, RandomForest};
use alzrisk_pipeline::{
    encode, error_banner, scale, BannerStyle, InputError, InputRecord, Pipeline, PipelineError,
    Stage,
};
use alzrisk_schema::FeatureSchema;
use pretty_assertions::assert_eq;
use tests::{baseline_record, feature_names, forest, pipeline, standard_scaler};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn baseline_patient_is_encoded_scaled_and_classified() {
    init_logger();
    let pipeline = pipeline();
    let schema = pipeline.schema();
    let record = baseline_record(schema);

    let report = pipeline.run(&record).expect("baseline prediction");

    let before = &report.before_scaling;
    assert_eq!(before.len(), 32);
    assert_eq!(
        before.columns().iter().map(String::as_str).collect::<Vec<_>>(),
        schema.feature_names()
    );
    assert_eq!(before.get("Gender"), Some(0.0));
    assert_eq!(before.get("Age"), Some(70.0));
    for name in schema.categorical_names() {
        assert_eq!(before.get(name), Some(0.0), "{name} should encode to 0");
    }

    // Age: (70 - 10) / 1.5
    let after = &report.after_scaling;
    assert!((after.get("Age").unwrap() - 40.0).abs() < 1e-12);
    assert!((after.get("BMI").unwrap() - (-11.0 / 1.75)).abs() < 1e-12);

    assert!(report.prediction.label == 0 || report.prediction.label == 1);
    assert!((report.prediction.probabilities.sum() - 1.0).abs() < 1e-6);
}

#[test]
fn baseline_patient_probability_matches_forest_vote() {
    let pipeline = pipeline();
    let report = pipeline
        .run(&baseline_record(pipeline.schema()))
        .unwrap();
    // MMSE and FunctionalAssessment scale negative, MemoryComplaints = No.
    let expected = (30.0 / 42.0 + 20.0 / 25.0 + 0.3) / 3.0;
    assert!((report.prediction.probabilities.alzheimers - expected).abs() < 1e-12);
    assert_eq!(report.prediction.label, 1);
    assert_eq!(report.verdict.style, BannerStyle::Error);
    assert!(report.probability_line.starts_with("Probability: No Alzheimer's = 0.3"));
}

struct SpyClassifier {
    inner: RandomForest,
    calls: AtomicUsize,
}

impl Classifier for SpyClassifier {
    fn feature_names_in(&self) -> Option<&[String]> {
        self.inner.feature_names_in()
    }
    fn n_features_in(&self) -> usize {
        self.inner.n_features_in()
    }
    fn classes(&self) -> &[i64] {
        self.inner.classes()
    }
    fn predict_proba(&self, rows: &[Vec<f64>]) -> Result<Vec<Vec<f64>>, ModelError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.predict_proba(rows)
    }
}

#[test]
fn declared_feature_absent_from_vector_aborts_before_classifier() {
    let schema = FeatureSchema::alzheimers();
    let mut declared = feature_names(&schema);
    declared.push("PlasmaAmyloid".into());
    let spy = Arc::new(SpyClassifier {
        inner: forest(&schema, Some(declared)),
        calls: AtomicUsize::new(0),
    });
    let pipeline = Pipeline::new(
        Arc::new(schema.clone()),
        Artifacts::new(spy.clone(), Arc::new(standard_scaler(&schema))),
    );

    let err = pipeline.run(&baseline_record(&schema)).unwrap_err();

    assert_eq!(err.stage(), Stage::Validating);
    match &err {
        PipelineError::SchemaMismatch { missing } => {
            assert_eq!(missing.iter().collect::<Vec<_>>(), vec!["PlasmaAmyloid"]);
        }
        other => panic!("expected schema mismatch, got {other:?}"),
    }
    assert_eq!(spy.calls.load(Ordering::SeqCst), 0);
    assert_eq!(
        error_banner(&err).message,
        "Missing columns in input: {PlasmaAmyloid}"
    );
}

#[test]
fn unknown_label_produces_generic_error_message() {
    let pipeline = pipeline();
    let mut record = baseline_record(pipeline.schema());
    record.insert("EducationLevel", "PhD");

    let err = pipeline.run(&record).unwrap_err();
    let banner = error_banner(&err);

    assert_eq!(banner.style, BannerStyle::Error);
    assert_eq!(
        banner.message,
        "An error occurred while processing the data: EducationLevel: label \"PhD\" is not in the codebook"
    );
}

#[test]
fn scaler_shape_mismatch_produces_generic_error_message() {
    let schema = FeatureSchema::alzheimers();
    let declared = feature_names(&schema);
    let narrow = alzrisk_model::StandardScaler::new(vec![0.0; 10], vec![1.0; 10]);
    let pipeline = Pipeline::new(
        Arc::new(schema.clone()),
        Artifacts::new(Arc::new(forest(&schema, Some(declared))), Arc::new(narrow)),
    );
    let err = pipeline.run(&baseline_record(&schema)).unwrap_err();
    assert_eq!(err.stage(), Stage::Scaling);
    assert!(error_banner(&err)
        .message
        .starts_with("An error occurred while processing the data:"));
}

#[test]
fn submissions_are_independent() {
    let pipeline = pipeline();
    let schema = pipeline.schema();
    let good = baseline_record(schema);
    let mut bad = baseline_record(schema);
    bad.insert("Gender", "Other");

    let first = pipeline.run(&good).unwrap();
    assert!(pipeline.run(&bad).is_err());
    assert_eq!(pipeline.run(&good).unwrap(), first);
}

#[test]
fn scaling_leaves_categorical_columns_bit_identical() {
    let schema = FeatureSchema::alzheimers();
    let mut record = InputRecord::with_defaults(&schema);
    record
        .insert("Ethnicity", "Other")
        .insert("EducationLevel", "Higher")
        .insert("Diabetes", "Yes");
    let before = encode(&schema, &record).unwrap();
    let after = scale(&schema, &before, &standard_scaler(&schema)).unwrap();

    for name in schema.categorical_names() {
        assert_eq!(
            before.get(name).unwrap().to_bits(),
            after.get(name).unwrap().to_bits()
        );
    }
    for name in schema.numeric_names() {
        assert_ne!(before.get(name), after.get(name), "{name} was not scaled");
    }
}

#[test]
fn hand_built_record_with_negative_values_is_refused() {
    let pipeline = pipeline();
    let partial: InputRecord = serde_json::from_str(r#"{"Age": -50, "MMSE": -3}"#).unwrap();
    let err = pipeline
        .run(&partial.completed(pipeline.schema()))
        .unwrap_err();
    assert_eq!(err.stage(), Stage::Submitted);
    assert!(matches!(
        err,
        PipelineError::Input(InputError::BelowMinimum { .. })
    ));
}

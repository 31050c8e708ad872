use alzrisk_pipeline::{encode, scale, InputRecord};
use alzrisk_schema::{FeatureKind, FeatureSchema};
use proptest::prelude::*;
use tests::{pipeline, standard_scaler};

/// Arbitrary form state: one label index per categorical field, one value
/// per numeric field.
fn record_strategy() -> impl Strategy<Value = (Vec<usize>, Vec<f64>)> {
    (
        proptest::collection::vec(0usize..8, 17),
        proptest::collection::vec(0.0f64..400.0, 15),
    )
}

fn build_record(schema: &FeatureSchema, picks: &[usize], numbers: &[f64]) -> InputRecord {
    let mut record = InputRecord::new();
    let (mut c, mut n) = (0, 0);
    for feature in schema.features() {
        match &feature.kind {
            FeatureKind::Categorical { codebook } => {
                let labels: Vec<&str> = codebook.labels().collect();
                record.insert(&feature.name, labels[picks[c] % labels.len()]);
                c += 1;
            }
            FeatureKind::Numeric { .. } => {
                record.insert(&feature.name, numbers[n]);
                n += 1;
            }
        }
    }
    record
}

proptest! {
    #[test]
    fn vector_order_matches_schema_order((picks, numbers) in record_strategy()) {
        let schema = FeatureSchema::alzheimers();
        let record = build_record(&schema, &picks, &numbers);
        let before = encode(&schema, &record).unwrap();
        let after = scale(&schema, &before, &standard_scaler(&schema)).unwrap();
        let expected: Vec<&str> = schema.feature_names();
        let before_cols: Vec<&str> = before.columns().iter().map(String::as_str).collect();
        let after_cols: Vec<&str> = after.columns().iter().map(String::as_str).collect();
        prop_assert_eq!(&before_cols, &expected);
        prop_assert_eq!(&after_cols, &expected);
    }

    #[test]
    fn probabilities_sum_to_one_and_label_is_binary((picks, numbers) in record_strategy()) {
        let pipeline = pipeline();
        let record = build_record(pipeline.schema(), &picks, &numbers);
        let report = pipeline.run(&record).unwrap();
        prop_assert!((report.prediction.probabilities.sum() - 1.0).abs() < 1e-6);
        prop_assert!(report.prediction.label == 0 || report.prediction.label == 1);
        prop_assert_eq!(
            report.prediction.is_positive(),
            report.prediction.probabilities.alzheimers > report.prediction.probabilities.no_alzheimers
        );
    }

    #[test]
    fn identical_inputs_give_identical_reports((picks, numbers) in record_strategy()) {
        let pipeline = pipeline();
        let record = build_record(pipeline.schema(), &picks, &numbers);
        prop_assert_eq!(pipeline.run(&record).unwrap(), pipeline.run(&record).unwrap());
    }
}

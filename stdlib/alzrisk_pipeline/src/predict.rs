use std::collections::BTreeSet;

use alzrisk_model::{Classifier, ModelError};
use serde::Serialize;

use crate::encode::EncodedVector;
use crate::error::PipelineError;

/// Probabilities of the two classes, in class-index order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProbabilityPair {
    pub no_alzheimers: f64,
    pub alzheimers: f64,
}

impl ProbabilityPair {
    pub fn sum(&self) -> f64 {
        self.no_alzheimers + self.alzheimers
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Prediction {
    /// 0 = no Alzheimer's, 1 = Alzheimer's.
    pub label: i64,
    pub probabilities: ProbabilityPair,
}

impl Prediction {
    pub fn is_positive(&self) -> bool {
        self.label == 1
    }
}

/// Declared model features absent from the vector's columns.
pub fn missing_columns(classifier: &dyn Classifier, vector: &EncodedVector) -> BTreeSet<String> {
    let Some(declared) = classifier.feature_names_in() else {
        return BTreeSet::new();
    };
    let present: BTreeSet<&str> = vector.columns().iter().map(String::as_str).collect();
    declared
        .iter()
        .filter(|name| !present.contains(name.as_str()))
        .cloned()
        .collect()
}

/// The verdict reads class index 1 as Alzheimer's, so the classifier must
/// expose exactly `[0, 1]` in that order.
pub fn check_classes(classifier: &dyn Classifier) -> Result<(), ModelError> {
    let classes = classifier.classes();
    if classes != [0, 1] {
        return Err(ModelError::UnexpectedClasses {
            found: classes.to_vec(),
        });
    }
    Ok(())
}

/// Validates the vector against the classifier's declared inputs, then
/// classifies it. The classifier is not invoked when columns are missing.
pub fn predict(
    classifier: &dyn Classifier,
    vector: &EncodedVector,
) -> Result<Prediction, PipelineError> {
    let missing = missing_columns(classifier, vector);
    if !missing.is_empty() {
        log::debug!("classifier inputs missing from encoded vector: {missing:?}");
        return Err(PipelineError::SchemaMismatch { missing });
    }

    check_classes(classifier).map_err(PipelineError::Prediction)?;

    let columns: Vec<&str> = vector.columns().iter().map(String::as_str).collect();
    classifier
        .check_feature_names(&columns)
        .map_err(PipelineError::Prediction)?;

    let rows = [vector.values().to_vec()];
    let label = first(classifier.predict(&rows).map_err(PipelineError::Prediction)?)?;
    let proba = first(
        classifier
            .predict_proba(&rows)
            .map_err(PipelineError::Prediction)?,
    )?;
    let &[no_alzheimers, alzheimers] = proba.as_slice() else {
        return Err(PipelineError::Prediction(ModelError::ClassCount {
            expected: 2,
            found: proba.len(),
        }));
    };

    log::debug!("predicted label {label} with p = [{no_alzheimers:.4}, {alzheimers:.4}]");
    Ok(Prediction {
        label,
        probabilities: ProbabilityPair {
            no_alzheimers,
            alzheimers,
        },
    })
}

fn first<T>(rows: Vec<T>) -> Result<T, PipelineError> {
    rows.into_iter()
        .next()
        .ok_or(PipelineError::Prediction(ModelError::ShapeMismatch {
            expected: 1,
            found: 0,
        }))
}

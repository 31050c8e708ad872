//! Scaler and classifier artifacts for the Alzheimer's risk pipeline.
//!
//! Both are opaque, pre-fit objects exported from the training side as JSON
//! and consumed only through two small capability traits:
//! [`Scaler::transform`] and [`Classifier::predict`] /
//! [`Classifier::predict_proba`].

pub mod artifact;
pub mod error;
pub mod forest;
pub mod linear;
pub mod scaler;

pub use artifact::{load_classifier, load_scaler, Artifacts, ClassifierArtifact, ScalerArtifact};
pub use error::{ArtifactError, ModelError};
pub use forest::{DecisionTree, RandomForest};
pub use linear::LogisticRegression;
pub use scaler::{MinMaxScaler, StandardScaler};

/// A pre-fit numeric transform applied column-wise to a matrix.
pub trait Scaler: Send + Sync {
    /// Column names the scaler was fit on, if it recorded them.
    fn feature_names_in(&self) -> Option<&[String]>;

    fn n_features_in(&self) -> usize;

    fn transform(&self, rows: &[Vec<f64>]) -> Result<Vec<Vec<f64>>, ModelError>;

    /// Checks column names the way a fit-with-names estimator does: when the
    /// scaler recorded names, the incoming columns must match them in order.
    fn check_feature_names(&self, columns: &[&str]) -> Result<(), ModelError> {
        check_names(self.feature_names_in(), columns)
    }
}

/// A pre-trained classifier over fixed-width rows.
pub trait Classifier: Send + Sync {
    fn feature_names_in(&self) -> Option<&[String]>;

    fn n_features_in(&self) -> usize;

    /// Class labels, in the index order used by `predict_proba`.
    fn classes(&self) -> &[i64];

    fn predict_proba(&self, rows: &[Vec<f64>]) -> Result<Vec<Vec<f64>>, ModelError>;

    fn predict(&self, rows: &[Vec<f64>]) -> Result<Vec<i64>, ModelError> {
        let classes = self.classes();
        self.predict_proba(rows)?
            .iter()
            .map(|p| {
                argmax(p)
                    .and_then(|idx| classes.get(idx).copied())
                    .ok_or(ModelError::ClassCount {
                        expected: classes.len(),
                        found: p.len(),
                    })
            })
            .collect()
    }

    fn check_feature_names(&self, columns: &[&str]) -> Result<(), ModelError> {
        check_names(self.feature_names_in(), columns)
    }
}

fn check_names(declared: Option<&[String]>, columns: &[&str]) -> Result<(), ModelError> {
    match declared {
        Some(names) if !names.iter().map(String::as_str).eq(columns.iter().copied()) => {
            Err(ModelError::FeatureNameMismatch {
                expected: names.to_vec(),
                found: columns.iter().map(|c| c.to_string()).collect(),
            })
        }
        _ => Ok(()),
    }
}

pub(crate) fn check_width(rows: &[Vec<f64>], expected: usize) -> Result<(), ModelError> {
    for row in rows {
        if row.len() != expected {
            return Err(ModelError::ShapeMismatch {
                expected,
                found: row.len(),
            });
        }
        if let Some(column) = row.iter().position(|x| !x.is_finite()) {
            return Err(ModelError::NonFinite { column });
        }
    }
    Ok(())
}

/// Index of the largest value; ties resolve to the lowest index.
pub(crate) fn argmax(values: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &v) in values.iter().enumerate() {
        match best {
            Some((_, b)) if v <= b => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}

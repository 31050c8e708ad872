//! Loading persisted artifacts from JSON files.

use std::fs::read_to_string;
use std::path::Path;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{ArtifactError, ModelError};
use crate::forest::RandomForest;
use crate::linear::LogisticRegression;
use crate::scaler::{MinMaxScaler, StandardScaler};
use crate::{Classifier, Scaler};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScalerArtifact {
    StandardScaler(StandardScaler),
    MinMaxScaler(MinMaxScaler),
}

impl ScalerArtifact {
    fn inner(&self) -> &dyn Scaler {
        match self {
            ScalerArtifact::StandardScaler(s) => s,
            ScalerArtifact::MinMaxScaler(s) => s,
        }
    }

    fn validate(&self) -> Result<(), String> {
        match self {
            ScalerArtifact::StandardScaler(s) => s.validate(),
            ScalerArtifact::MinMaxScaler(s) => s.validate(),
        }
    }
}

impl Scaler for ScalerArtifact {
    fn feature_names_in(&self) -> Option<&[String]> {
        self.inner().feature_names_in()
    }

    fn n_features_in(&self) -> usize {
        self.inner().n_features_in()
    }

    fn transform(&self, rows: &[Vec<f64>]) -> Result<Vec<Vec<f64>>, ModelError> {
        self.inner().transform(rows)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClassifierArtifact {
    RandomForest(RandomForest),
    LogisticRegression(LogisticRegression),
}

impl ClassifierArtifact {
    fn inner(&self) -> &dyn Classifier {
        match self {
            ClassifierArtifact::RandomForest(m) => m,
            ClassifierArtifact::LogisticRegression(m) => m,
        }
    }

    fn validate(&self) -> Result<(), String> {
        match self {
            ClassifierArtifact::RandomForest(m) => m.validate(),
            ClassifierArtifact::LogisticRegression(m) => m.validate(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ClassifierArtifact::RandomForest(_) => "random_forest",
            ClassifierArtifact::LogisticRegression(_) => "logistic_regression",
        }
    }
}

impl Classifier for ClassifierArtifact {
    fn feature_names_in(&self) -> Option<&[String]> {
        self.inner().feature_names_in()
    }

    fn n_features_in(&self) -> usize {
        self.inner().n_features_in()
    }

    fn classes(&self) -> &[i64] {
        self.inner().classes()
    }

    fn predict_proba(&self, rows: &[Vec<f64>]) -> Result<Vec<Vec<f64>>, ModelError> {
        self.inner().predict_proba(rows)
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ArtifactError> {
    let text = read_to_string(path).map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| ArtifactError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

pub fn load_scaler(path: impl AsRef<Path>) -> Result<ScalerArtifact, ArtifactError> {
    let path = path.as_ref();
    let scaler: ScalerArtifact = read_json(path)?;
    scaler.validate().map_err(|reason| ArtifactError::Invalid {
        path: path.to_path_buf(),
        reason,
    })?;
    log::info!(
        "loaded scaler from {} ({} columns)",
        path.display(),
        scaler.n_features_in()
    );
    Ok(scaler)
}

pub fn load_classifier(path: impl AsRef<Path>) -> Result<ClassifierArtifact, ArtifactError> {
    let path = path.as_ref();
    let model: ClassifierArtifact = read_json(path)?;
    model.validate().map_err(|reason| ArtifactError::Invalid {
        path: path.to_path_buf(),
        reason,
    })?;
    log::info!(
        "loaded {} classifier from {} ({} features, classes {:?})",
        model.kind(),
        path.display(),
        model.n_features_in(),
        model.classes()
    );
    Ok(model)
}

/// The process-wide classifier/scaler pair. Read-only after construction,
/// cheap to clone.
#[derive(Clone)]
pub struct Artifacts {
    pub classifier: Arc<dyn Classifier>,
    pub scaler: Arc<dyn Scaler>,
}

impl Artifacts {
    pub fn new(classifier: Arc<dyn Classifier>, scaler: Arc<dyn Scaler>) -> Self {
        Self { classifier, scaler }
    }

    /// Loads both artifacts. Any failure is a startup failure.
    pub fn load(
        model_path: impl AsRef<Path>,
        scaler_path: impl AsRef<Path>,
    ) -> Result<Self, ArtifactError> {
        let classifier = load_classifier(model_path)?;
        let scaler = load_scaler(scaler_path)?;
        Ok(Self::new(Arc::new(classifier), Arc::new(scaler)))
    }
}

impl std::fmt::Debug for Artifacts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Artifacts")
            .field("classifier_features", &self.classifier.n_features_in())
            .field("classes", &self.classifier.classes())
            .field("scaler_features", &self.scaler.n_features_in())
            .finish()
    }
}

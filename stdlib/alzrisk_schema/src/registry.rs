use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::feature::{Codebook, FeatureDescriptor, FeatureKind, NumericField};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("Duplicate feature name: {0}")]
    DuplicateFeature(String),
    #[error("Codebook for {0} has no labels")]
    EmptyCodebook(String),
    #[error("Codebook for {feature} repeats label {label:?}")]
    DuplicateLabel { feature: String, label: String },
    #[error("Codebook for {feature} repeats code {code}")]
    DuplicateCode { feature: String, code: i64 },
}

/// Ordered feature schema, in the exact column order the model was trained on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureSchema {
    features: Vec<FeatureDescriptor>,
}

impl FeatureSchema {
    pub fn new(features: Vec<FeatureDescriptor>) -> Self {
        Self { features }
    }

    /// The 32-feature schema of the Alzheimer's random forest.
    pub fn alzheimers() -> Self {
        let yes_no = |name: &str| FeatureDescriptor::categorical(name, Codebook::yes_no());
        let num = FeatureDescriptor::numeric;

        Self::new(vec![
            num(
                "Age",
                NumericField::new("Enter age in years").with_range(60.0, 90.0),
            ),
            FeatureDescriptor::categorical(
                "Gender",
                Codebook::new([("Male", 0), ("Female", 1)]),
            ),
            FeatureDescriptor::categorical(
                "Ethnicity",
                Codebook::new([
                    ("Caucasian", 0),
                    ("African American", 1),
                    ("Asian", 2),
                    ("Other", 3),
                ]),
            ),
            FeatureDescriptor::categorical(
                "EducationLevel",
                Codebook::new([
                    ("None", 0),
                    ("High School", 1),
                    ("Bachelor's", 2),
                    ("Higher", 3),
                ]),
            ),
            num(
                "BMI",
                NumericField::new("Enter BMI value (15–40)")
                    .with_caption("BMI = weight / height². Normal: 15–40")
                    .with_range(15.0, 40.0),
            ),
            yes_no("Smoking"),
            num(
                "AlcoholConsumption",
                NumericField::new("Enter alcohol consumption per week")
                    .with_caption("0 = does not drink, 1–20 = units per week")
                    .with_range(0.0, 20.0),
            ),
            num(
                "PhysicalActivity",
                NumericField::new("Enter hours of physical activity per week")
                    .with_range(0.0, 10.0),
            ),
            num(
                "DietQuality",
                NumericField::new("Enter diet quality score (1–10)")
                    .with_caption("Diet quality score from a standard dietary questionnaire")
                    .with_range(0.0, 10.0),
            ),
            num(
                "SleepQuality",
                NumericField::new("Enter sleep quality score (1–10)").with_range(0.0, 10.0),
            ),
            yes_no("FamilyHistoryAlzheimers"),
            yes_no("CardiovascularDisease"),
            yes_no("Diabetes"),
            yes_no("Depression"),
            yes_no("HeadInjury"),
            yes_no("Hypertension"),
            num(
                "SystolicBP",
                NumericField::new("Enter systolic blood pressure (mmHg)").with_range(90.0, 180.0),
            ),
            num(
                "DiastolicBP",
                NumericField::new("Enter diastolic blood pressure (mmHg)").with_range(60.0, 120.0),
            ),
            num(
                "CholesterolTotal",
                NumericField::new("Enter total cholesterol (mg/dL)").with_range(150.0, 300.0),
            ),
            num(
                "CholesterolLDL",
                NumericField::new("Enter LDL (mg/dL)").with_range(50.0, 200.0),
            ),
            num(
                "CholesterolHDL",
                NumericField::new("Enter HDL (mg/dL)").with_range(20.0, 100.0),
            ),
            num(
                "CholesterolTriglycerides",
                NumericField::new("Enter triglycerides (mg/dL)").with_range(50.0, 400.0),
            ),
            num(
                "MMSE",
                NumericField::new("Enter MMSE score (0–30)").with_range(0.0, 30.0),
            ),
            num(
                "FunctionalAssessment",
                NumericField::new("Enter functional assessment score").with_range(0.0, 10.0),
            ),
            yes_no("MemoryComplaints"),
            yes_no("BehavioralProblems"),
            num(
                "ADL",
                NumericField::new("Enter activities of daily living score").with_range(0.0, 10.0),
            ),
            yes_no("Confusion"),
            yes_no("Disorientation"),
            yes_no("PersonalityChanges"),
            yes_no("DifficultyCompletingTasks"),
            yes_no("Forgetfulness"),
        ])
    }

    /// Checks the structural invariants the encoder relies on.
    pub fn validate(&self) -> Result<(), SchemaError> {
        let mut seen = HashSet::new();
        for feature in &self.features {
            if !seen.insert(feature.name.as_str()) {
                return Err(SchemaError::DuplicateFeature(feature.name.clone()));
            }
            if let FeatureKind::Categorical { codebook } = &feature.kind {
                if codebook.is_empty() {
                    return Err(SchemaError::EmptyCodebook(feature.name.clone()));
                }
                let mut labels = HashSet::new();
                let mut codes = HashSet::new();
                for (label, code) in codebook.entries() {
                    if !labels.insert(label.as_str()) {
                        return Err(SchemaError::DuplicateLabel {
                            feature: feature.name.clone(),
                            label: label.clone(),
                        });
                    }
                    if !codes.insert(*code) {
                        return Err(SchemaError::DuplicateCode {
                            feature: feature.name.clone(),
                            code: *code,
                        });
                    }
                }
            }
        }
        Ok(())
    }

    pub fn features(&self) -> &[FeatureDescriptor] {
        &self.features
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&FeatureDescriptor> {
        self.features.iter().find(|f| f.name == name)
    }

    /// All feature names in schema order.
    pub fn feature_names(&self) -> Vec<&str> {
        self.features.iter().map(|f| f.name.as_str()).collect()
    }

    /// Names of the scaled subset, in schema order.
    pub fn numeric_names(&self) -> Vec<&str> {
        self.features
            .iter()
            .filter(|f| !f.is_categorical())
            .map(|f| f.name.as_str())
            .collect()
    }

    pub fn categorical_names(&self) -> Vec<&str> {
        self.features
            .iter()
            .filter(|f| f.is_categorical())
            .map(|f| f.name.as_str())
            .collect()
    }

    pub fn is_categorical(&self, name: &str) -> bool {
        self.get(name).is_some_and(FeatureDescriptor::is_categorical)
    }

    pub fn is_numeric(&self, name: &str) -> bool {
        self.get(name).is_some_and(|f| !f.is_categorical())
    }

    pub fn codebook(&self, name: &str) -> Option<&Codebook> {
        self.get(name).and_then(FeatureDescriptor::codebook)
    }

    pub fn numeric_field(&self, name: &str) -> Option<&NumericField> {
        self.get(name).and_then(FeatureDescriptor::numeric_field)
    }
}

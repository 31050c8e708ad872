//! Server side of the input collector.
//!
//! The form renders one control per feature; this module turns what comes
//! back into an [`InputRecord`], applying the same constraints the controls
//! apply in the browser.

use std::collections::{BTreeMap, HashMap};

use alzrisk_schema::{FeatureKind, FeatureSchema};
use serde::{Deserialize, Serialize};

use crate::error::InputError;

/// Raw value of one field as the user entered it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Number(f64),
    Label(String),
}

impl From<f64> for RawValue {
    fn from(v: f64) -> Self {
        RawValue::Number(v)
    }
}

impl From<&str> for RawValue {
    fn from(v: &str) -> Self {
        RawValue::Label(v.to_string())
    }
}

impl From<String> for RawValue {
    fn from(v: String) -> Self {
        RawValue::Label(v)
    }
}

/// Feature name to raw value, for a single submission.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InputRecord {
    values: BTreeMap<String, RawValue>,
}

impl InputRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// What an untouched form submits: the first label of every codebook and
    /// the minimum of every numeric field.
    pub fn with_defaults(schema: &FeatureSchema) -> Self {
        let mut record = Self::new();
        for feature in schema.features() {
            match &feature.kind {
                FeatureKind::Categorical { codebook } => {
                    if let Some(label) = codebook.default_label() {
                        record.insert(&feature.name, label);
                    }
                }
                FeatureKind::Numeric { field } => {
                    record.insert(&feature.name, field.min);
                }
            }
        }
        record
    }

    /// This record with every absent field filled as an untouched form would
    /// fill it. Values already present are kept as they are.
    pub fn completed(&self, schema: &FeatureSchema) -> Self {
        let mut record = Self::with_defaults(schema);
        for (name, value) in &self.values {
            record.values.insert(name.clone(), value.clone());
        }
        record
    }

    /// Applies the numeric control constraints to a record that did not come
    /// through the form: every numeric value must be finite and at least the
    /// control minimum.
    pub fn check_controls(&self, schema: &FeatureSchema) -> Result<(), InputError> {
        for feature in schema.features() {
            let FeatureKind::Numeric { field } = &feature.kind else {
                continue;
            };
            if let Some(RawValue::Number(value)) = self.get(&feature.name) {
                check_number(&feature.name, *value, field.min)?;
            }
        }
        Ok(())
    }

    /// Builds a record from submitted form fields.
    ///
    /// Numeric fields must be finite and at least the control minimum; an
    /// empty or absent numeric field takes the minimum. Categorical values
    /// are kept verbatim and only resolved against the codebook at encoding.
    pub fn from_form(
        schema: &FeatureSchema,
        fields: &HashMap<String, String>,
    ) -> Result<Self, InputError> {
        let mut record = Self::new();
        for feature in schema.features() {
            let submitted = fields.get(&feature.name).map(|s| s.trim());
            match &feature.kind {
                FeatureKind::Categorical { codebook } => {
                    let label = match submitted {
                        Some(s) => Some(s.to_string()),
                        None => codebook.default_label().map(str::to_string),
                    };
                    if let Some(label) = label {
                        record.insert(&feature.name, label);
                    }
                }
                FeatureKind::Numeric { field } => {
                    let value = match submitted {
                        None | Some("") => field.min,
                        Some(s) => parse_number(&feature.name, s)?,
                    };
                    check_number(&feature.name, value, field.min)?;
                    record.insert(&feature.name, value);
                }
            }
        }
        Ok(record)
    }

    pub fn insert(&mut self, feature: &str, value: impl Into<RawValue>) -> &mut Self {
        self.values.insert(feature.to_string(), value.into());
        self
    }

    pub fn get(&self, feature: &str) -> Option<&RawValue> {
        self.values.get(feature)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RawValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}

fn parse_number(feature: &str, s: &str) -> Result<f64, InputError> {
    s.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| InputError::NotANumber {
            feature: feature.to_string(),
            value: s.to_string(),
        })
}

fn check_number(feature: &str, value: f64, min: f64) -> Result<(), InputError> {
    if !value.is_finite() {
        return Err(InputError::NotANumber {
            feature: feature.to_string(),
            value: value.to_string(),
        });
    }
    if value < min {
        return Err(InputError::BelowMinimum {
            feature: feature.to_string(),
            value,
            min,
        });
    }
    Ok(())
}

/// A numeric value outside its documented clinical range. The value is
/// still passed to the model; the notice is advisory.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RangeNotice {
    pub feature: String,
    pub value: f64,
    pub min: f64,
    pub max: f64,
}

impl RangeNotice {
    pub fn message(&self) -> String {
        format!(
            "{} = {} is outside the documented range {}–{}",
            self.feature, self.value, self.min, self.max
        )
    }
}

pub fn range_notices(schema: &FeatureSchema, record: &InputRecord) -> Vec<RangeNotice> {
    let mut notices = Vec::new();
    for feature in schema.features() {
        let Some(range) = feature.numeric_field().and_then(|f| f.valid_range) else {
            continue;
        };
        if let Some(RawValue::Number(value)) = record.get(&feature.name) {
            if !range.contains(*value) {
                log::warn!(
                    "{} = {value} outside documented range {}–{}",
                    feature.name,
                    range.min,
                    range.max
                );
                notices.push(RangeNotice {
                    feature: feature.name.clone(),
                    value: *value,
                    min: range.min,
                    max: range.max,
                });
            }
        }
    }
    notices
}
